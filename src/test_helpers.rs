//! In-memory stand-ins for the wallet extension and the fullnode, and
//! contexts that wire them into a connected gateway or orchestrator.

use crate::{
    betting::BettingWindow,
    config::{
        ArenaConfig,
        DEFAULT_PACKAGE_ID,
    },
    contract::BettingContract,
    error::ProviderFailure,
    ledger::{
        CallArg,
        CoinObject,
        Command,
        DevInspectResults,
        DynamicField,
        ExecutionStatus,
        KIOSK_LISTING_PREFIX,
        Ledger,
        MoveCall,
        MoveObject,
        ObjectRef,
        SUI_COIN_TYPE,
        TransactionEffects,
        TransactionIntent,
        WalletProvider,
    },
    marketplace::AgentMarket,
    orchestrator::Orchestrator,
    types::{
        Address,
        ChainGameId,
        ODDS_SCALE,
        ObjectId,
        TxDigest,
    },
    wallet::WalletGateway,
};
use color_eyre::eyre::{
    Report,
    Result,
    eyre,
};
use serde_json::{
    Value,
    json,
};
use sha2::{
    Digest,
    Sha256,
};
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
    },
    time::Duration,
};
use tokio::sync::watch;

pub const GAME_ORIGIN: &str = "http://localhost:3000";
pub const WALLET_NAME: &str = "Sui Wallet";
/// Funds given to alice, split over two coins.
pub const ALICE_COINS: [u64; 2] = [600_000_000, 400_000_000];

#[derive(Clone, Debug)]
struct FakeCoin {
    id: ObjectId,
    owner: Address,
    balance: u64,
}

#[derive(Clone, Debug, Default)]
struct FakeGame {
    pool: u64,
    bets: Vec<(u64, u64)>,
    winner: Option<u64>,
}

#[derive(Clone, Debug)]
struct FakeListing {
    listing_id: ObjectId,
    price: u64,
}

#[derive(Clone, Debug, Default)]
struct FakeKiosk {
    cap: Option<ObjectId>,
    items: Vec<ObjectId>,
    listings: HashMap<ObjectId, FakeListing>,
}

#[derive(Clone, Debug, Default)]
struct ChainState {
    counter: u64,
    coins: Vec<FakeCoin>,
    games: HashMap<ChainGameId, FakeGame>,
    objects: HashMap<ObjectId, MoveObject>,
    owners: HashMap<ObjectId, Address>,
    kiosks: HashMap<ObjectId, FakeKiosk>,
    transactions: HashMap<TxDigest, TransactionEffects>,
    submitted: Vec<TransactionIntent>,
    reject_next: bool,
    network_down: bool,
    omit_created: bool,
}

impl ChainState {
    fn next_hash(&mut self) -> [u8; 32] {
        self.counter += 1;
        let hash = Sha256::digest(self.counter.to_le_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        out
    }

    fn next_id(&mut self) -> ObjectId {
        ObjectId::from_bytes(self.next_hash())
    }

    fn next_digest(&mut self) -> TxDigest {
        TxDigest(hex::encode(self.next_hash()))
    }

    fn add_coin(&mut self, owner: &Address, balance: u64) -> ObjectId {
        let id = self.next_id();
        self.coins.push(FakeCoin {
            id: id.clone(),
            owner: owner.clone(),
            balance,
        });
        id
    }

    fn odds(&self, game: &ChainGameId, participant: u64) -> Option<u64> {
        let game = self.games.get(game)?;
        let total: u64 = game.bets.iter().map(|(_, amount)| amount).sum();
        let on_participant: u64 = game
            .bets
            .iter()
            .filter(|(id, _)| *id == participant)
            .map(|(_, amount)| amount)
            .sum();
        if on_participant == 0 {
            return Some(ODDS_SCALE);
        }
        Some(total.saturating_mul(ODDS_SCALE) / on_participant)
    }
}

/// Result of one command: a split payment amount or nothing.
enum Produced {
    Payment(u64),
    Nothing,
}

fn object_arg(call: &MoveCall, index: usize) -> std::result::Result<ObjectId, String> {
    match call.arguments.get(index) {
        Some(CallArg::Object(id)) => Ok(id.clone()),
        other => Err(format!("{}: argument {index} is not an object: {other:?}", call.function)),
    }
}

fn u64_arg(call: &MoveCall, index: usize) -> std::result::Result<u64, String> {
    match call.arguments.get(index) {
        Some(CallArg::U64(value)) => Ok(*value),
        Some(CallArg::U8(value)) => Ok(u64::from(*value)),
        other => Err(format!("{}: argument {index} is not a u64: {other:?}", call.function)),
    }
}

fn string_arg(call: &MoveCall, index: usize) -> std::result::Result<String, String> {
    match call.arguments.get(index) {
        Some(CallArg::String(value)) => Ok(value.clone()),
        other => Err(format!("{}: argument {index} is not a string: {other:?}", call.function)),
    }
}

fn spend_coin(
    state: &mut ChainState,
    sender: &Address,
    coin: &ObjectId,
    amount: Option<u64>,
) -> std::result::Result<u64, String> {
    let position = state
        .coins
        .iter()
        .position(|c| &c.id == coin && &c.owner == sender)
        .ok_or_else(|| format!("coin {coin} is not owned by the sender or was consumed"))?;
    let available = state.coins[position].balance;
    let taken = amount.unwrap_or(available);
    if taken > available {
        return Err("InsufficientCoinBalance".to_string());
    }
    if taken == available {
        state.coins.remove(position);
    } else {
        state.coins[position].balance -= taken;
    }
    Ok(taken)
}

fn apply_call(
    state: &mut ChainState,
    sender: &Address,
    call: &MoveCall,
    produced: &[Produced],
    created: &mut Vec<ObjectRef>,
) -> std::result::Result<(), String> {
    let agent_type = format!("{}::agar::Agar", call.package);
    match call.function.as_str() {
        "create_game" => {
            let coin = object_arg(call, 0)?;
            let pool = spend_coin(state, sender, &coin, None)?;
            let game = state.next_id();
            state.games.insert(
                game.clone(),
                FakeGame {
                    pool,
                    ..FakeGame::default()
                },
            );
            created.push(ObjectRef {
                object_id: game,
                version: 1,
            });
        }
        "place_bet" => {
            let game = object_arg(call, 0)?;
            let participant = u64_arg(call, 1)?;
            let amount = u64_arg(call, 2)?;
            let coin = object_arg(call, 3)?;
            match state.games.get(&game) {
                Some(FakeGame { winner: None, .. }) => {}
                Some(_) => return Err("MoveAbort(betting, 2): game already ended".into()),
                None => return Err(format!("object {game} not found")),
            }
            if !(1..=8).contains(&participant) {
                return Err("MoveAbort(betting, 1): invalid player".into());
            }
            spend_coin(state, sender, &coin, Some(amount))?;
            if let Some(entry) = state.games.get_mut(&game) {
                entry.pool += amount;
                entry.bets.push((participant, amount));
            }
        }
        "end_game" => {
            let game = object_arg(call, 0)?;
            let winner = u64_arg(call, 1)?;
            let entry = state
                .games
                .get_mut(&game)
                .ok_or_else(|| format!("object {game} not found"))?;
            if entry.winner.is_some() {
                return Err("MoveAbort(betting, 2): game already ended".into());
            }
            entry.winner = Some(winner);
        }
        "mint_agar" => {
            let fields = json!({
                "owner": sender.as_str(),
                "author": string_arg(call, 0)?,
                "title": string_arg(call, 1)?,
                "category": string_arg(call, 2)?,
                "story": string_arg(call, 3)?,
            });
            let id = state.next_id();
            state.objects.insert(
                id.clone(),
                MoveObject {
                    object_id: id.clone(),
                    type_: agent_type,
                    fields,
                },
            );
            state.owners.insert(id.clone(), sender.clone());
            created.push(ObjectRef {
                object_id: id,
                version: 1,
            });
        }
        "place_agar" => {
            let kiosk = object_arg(call, 0)?;
            let cap = object_arg(call, 1)?;
            let item = object_arg(call, 2)?;
            if state.owners.get(&item) != Some(sender) {
                return Err(format!("item {item} is not owned by the sender"));
            }
            let entry = state
                .kiosks
                .get_mut(&kiosk)
                .ok_or_else(|| format!("kiosk {kiosk} not found"))?;
            if entry.cap.as_ref() != Some(&cap) {
                return Err("MoveAbort(kiosk, 0): not the owner".into());
            }
            entry.items.push(item.clone());
            state.owners.remove(&item);
        }
        "list_agar" => {
            let kiosk = object_arg(call, 0)?;
            let cap = object_arg(call, 1)?;
            let item = object_arg(call, 2)?;
            let price = u64_arg(call, 3)?;
            let listing_id = state.next_id();
            let entry = state
                .kiosks
                .get_mut(&kiosk)
                .ok_or_else(|| format!("kiosk {kiosk} not found"))?;
            if entry.cap.as_ref() != Some(&cap) || !entry.items.contains(&item) {
                return Err("MoveAbort(kiosk, 1): item not in kiosk".into());
            }
            entry.listings.insert(
                item.clone(),
                FakeListing {
                    listing_id: listing_id.clone(),
                    price,
                },
            );
            state.objects.insert(
                listing_id.clone(),
                MoveObject {
                    object_id: listing_id,
                    type_: "0x2::dynamic_field::Field<0x2::kiosk::Listing, u64>".into(),
                    fields: json!({ "name": { "id": item.as_str() }, "value": price.to_string() }),
                },
            );
        }
        "purchase_agar" => {
            let kiosk = object_arg(call, 0)?;
            let item = object_arg(call, 1)?;
            let payment = match call.arguments.get(2) {
                Some(CallArg::Result(index)) => match produced.get(usize::from(*index)) {
                    Some(Produced::Payment(amount)) => *amount,
                    _ => return Err("payment is not a split coin".into()),
                },
                other => return Err(format!("payment argument {other:?}")),
            };
            let entry = state
                .kiosks
                .get_mut(&kiosk)
                .ok_or_else(|| format!("kiosk {kiosk} not found"))?;
            let listing = entry
                .listings
                .get(&item)
                .cloned()
                .ok_or_else(|| "MoveAbort(kiosk, 2): item not listed".to_string())?;
            if payment != listing.price {
                return Err("MoveAbort(kiosk, 3): incorrect amount".into());
            }
            entry.listings.remove(&item);
            entry.items.retain(|held| held != &item);
            state.objects.remove(&listing.listing_id);
            state.owners.insert(item, sender.clone());
        }
        other => return Err(format!("function {other} not found in module {}", call.module)),
    }
    Ok(())
}

fn execute(
    state: &mut ChainState,
    sender: &Address,
    intent: &TransactionIntent,
) -> std::result::Result<Vec<ObjectRef>, String> {
    let mut produced = Vec::new();
    let mut created = Vec::new();
    for command in &intent.commands {
        match command {
            Command::SplitGas { amounts } => {
                let total: u64 = amounts.iter().sum();
                let gas = state
                    .coins
                    .iter()
                    .filter(|c| &c.owner == sender)
                    .max_by_key(|c| c.balance)
                    .map(|c| c.id.clone())
                    .ok_or_else(|| "InsufficientGas".to_string())?;
                spend_coin(state, sender, &gas, Some(total))
                    .map_err(|_| "InsufficientGas".to_string())?;
                produced.push(Produced::Payment(amounts.first().copied().unwrap_or(0)));
            }
            Command::MoveCall(call) => {
                apply_call(state, sender, call, &produced, &mut created)?;
                produced.push(Produced::Nothing);
            }
        }
    }
    Ok(created)
}

/// In-memory ledger that interprets the arena module calls.
#[derive(Clone, Default)]
pub struct FakeLedger {
    state: Arc<Mutex<ChainState>>,
}

impl FakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// New account holding one SUI coin per entry in `coins`.
    pub fn fund_new_account(&self, coins: &[u64]) -> Address {
        let mut state = self.state.lock().unwrap();
        let account = state.next_id();
        for balance in coins {
            state.add_coin(&account, *balance);
        }
        account
    }

    pub fn credit(&self, account: &Address, amount: u64) -> ObjectId {
        self.state.lock().unwrap().add_coin(account, amount)
    }

    /// Removes every coin `account` holds.
    pub fn drain(&self, account: &Address) {
        self.state
            .lock()
            .unwrap()
            .coins
            .retain(|coin| &coin.owner != account);
    }

    /// Kiosk owned through the returned cap.
    pub fn create_kiosk(&self) -> (ObjectId, ObjectId) {
        let mut state = self.state.lock().unwrap();
        let kiosk = state.next_id();
        let cap = state.next_id();
        state.kiosks.insert(
            kiosk.clone(),
            FakeKiosk {
                cap: Some(cap.clone()),
                ..FakeKiosk::default()
            },
        );
        (kiosk, cap)
    }

    pub fn insert_object(&self, owner: &Address, object: MoveObject) {
        let mut state = self.state.lock().unwrap();
        state.owners.insert(object.object_id.clone(), owner.clone());
        state.objects.insert(object.object_id.clone(), object);
    }

    pub fn owner_of(&self, object: &ObjectId) -> Option<Address> {
        self.state.lock().unwrap().owners.get(object).cloned()
    }

    pub fn submitted(&self) -> Vec<TransactionIntent> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Number of submitted move calls to `function`.
    pub fn submitted_calls(&self, function: &str) -> usize {
        self.submitted()
            .iter()
            .flat_map(|intent| intent.move_calls().cloned().collect::<Vec<_>>())
            .filter(|call| call.function == function)
            .count()
    }

    pub fn games(&self) -> Vec<ChainGameId> {
        self.state.lock().unwrap().games.keys().cloned().collect()
    }

    pub fn winner_of(&self, game: &ChainGameId) -> Option<u64> {
        self.state.lock().unwrap().games.get(game)?.winner
    }

    pub fn bets_on(&self, game: &ChainGameId) -> Vec<(u64, u64)> {
        self.state
            .lock()
            .unwrap()
            .games
            .get(game)
            .map(|g| g.bets.clone())
            .unwrap_or_default()
    }

    pub fn pool_of(&self, game: &ChainGameId) -> Option<u64> {
        Some(self.state.lock().unwrap().games.get(game)?.pool)
    }

    /// Next create reports success without created objects.
    pub fn omit_created_objects(&self) {
        self.state.lock().unwrap().omit_created = true;
    }

    pub fn fail_network(&self, down: bool) {
        self.state.lock().unwrap().network_down = down;
    }

    fn check_network(&self) -> Result<()> {
        if self.state.lock().unwrap().network_down {
            return Err(eyre!("fullnode request failed: connection refused"));
        }
        Ok(())
    }

    fn submit(&self, sender: &Address, intent: &TransactionIntent) -> Result<TxDigest> {
        let mut state = self.state.lock().unwrap();
        if std::mem::take(&mut state.reject_next) {
            return Err(Report::new(ProviderFailure::UserRejected));
        }
        if state.network_down {
            return Err(eyre!("wallet could not reach the fullnode"));
        }
        state.submitted.push(intent.clone());
        let digest = state.next_digest();
        let mut next = state.clone();
        let effects = match execute(&mut next, sender, intent) {
            Ok(mut created) => {
                if std::mem::take(&mut next.omit_created) {
                    created.clear();
                }
                *state = next;
                TransactionEffects {
                    digest: digest.clone(),
                    status: ExecutionStatus::Success,
                    created,
                }
            }
            Err(reason) => TransactionEffects {
                digest: digest.clone(),
                status: ExecutionStatus::Failure(reason),
                created: Vec::new(),
            },
        };
        state.transactions.insert(digest.clone(), effects);
        Ok(digest)
    }
}

impl Ledger for FakeLedger {
    async fn coins(
        &self,
        owner: &Address,
        coin_type: &str,
        limit: usize,
    ) -> Result<Vec<CoinObject>> {
        self.check_network()?;
        if coin_type != SUI_COIN_TYPE {
            return Ok(Vec::new());
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .coins
            .iter()
            .filter(|coin| &coin.owner == owner)
            .take(limit)
            .map(|coin| CoinObject {
                coin_object_id: coin.id.clone(),
                balance: coin.balance,
            })
            .collect())
    }

    async fn balance(&self, owner: &Address, coin_type: &str) -> Result<u64> {
        self.check_network()?;
        if coin_type != SUI_COIN_TYPE {
            return Ok(0);
        }
        let state = self.state.lock().unwrap();
        Ok(state
            .coins
            .iter()
            .filter(|coin| &coin.owner == owner)
            .map(|coin| coin.balance)
            .sum())
    }

    async fn wait_for_transaction(&self, digest: &TxDigest) -> Result<TransactionEffects> {
        self.check_network()?;
        self.state
            .lock()
            .unwrap()
            .transactions
            .get(digest)
            .cloned()
            .ok_or_else(|| eyre!("transaction {digest} not found"))
    }

    async fn dev_inspect(
        &self,
        _sender: &Address,
        intent: &TransactionIntent,
    ) -> Result<DevInspectResults> {
        self.check_network()?;
        let state = self.state.lock().unwrap();
        let failure = |reason: String| DevInspectResults {
            status: ExecutionStatus::Failure(reason),
            return_values: Vec::new(),
        };
        let Some(call) = intent.move_calls().next() else {
            return Ok(failure("empty transaction".into()));
        };
        if call.function != "get_odds" {
            return Ok(failure(format!("{} is not a view function", call.function)));
        }
        let (Ok(game), Ok(participant)) = (object_arg(call, 0), u64_arg(call, 1)) else {
            return Ok(failure("get_odds arguments malformed".into()));
        };
        Ok(match state.odds(&game, participant) {
            Some(odds) => DevInspectResults {
                status: ExecutionStatus::Success,
                return_values: vec![odds.to_le_bytes().to_vec()],
            },
            None => failure(format!("object {game} not found")),
        })
    }

    async fn owned_objects(&self, owner: &Address, struct_type: &str) -> Result<Vec<MoveObject>> {
        self.check_network()?;
        let state = self.state.lock().unwrap();
        let mut objects: Vec<MoveObject> = state
            .objects
            .values()
            .filter(|object| object.type_ == struct_type)
            .filter(|object| state.owners.get(&object.object_id) == Some(owner))
            .cloned()
            .collect();
        objects.sort_by(|a, b| a.object_id.cmp(&b.object_id));
        Ok(objects)
    }

    async fn dynamic_fields(&self, parent: &ObjectId) -> Result<Vec<DynamicField>> {
        self.check_network()?;
        let state = self.state.lock().unwrap();
        let Some(kiosk) = state.kiosks.get(parent) else {
            return Ok(Vec::new());
        };
        let mut fields = Vec::new();
        for item in &kiosk.items {
            let object_type = state
                .objects
                .get(item)
                .map(|object| object.type_.clone())
                .unwrap_or_default();
            fields.push(DynamicField {
                object_id: item.clone(),
                object_type,
                name: json!({ "type": "0x2::kiosk::Item", "value": item.as_str() }),
            });
            if let Some(listing) = kiosk.listings.get(item) {
                fields.push(DynamicField {
                    object_id: listing.listing_id.clone(),
                    object_type: format!("{KIOSK_LISTING_PREFIX}u64>"),
                    name: json!({ "type": "0x2::kiosk::Listing", "value": item.as_str() }),
                });
            }
        }
        Ok(fields)
    }

    async fn object(&self, id: &ObjectId) -> Result<Option<MoveObject>> {
        self.check_network()?;
        Ok(self.state.lock().unwrap().objects.get(id).cloned())
    }
}

/// Browser wallet bound to a single account of a [`FakeLedger`].
#[derive(Clone)]
pub struct FakeWallet {
    ledger: FakeLedger,
    account: Address,
    registered: bool,
    approvals_open: Arc<watch::Sender<bool>>,
}

impl FakeWallet {
    pub fn new(ledger: FakeLedger, account: Address) -> Self {
        Self {
            ledger,
            account,
            registered: true,
            approvals_open: Arc::new(watch::channel(true).0),
        }
    }

    /// A page without any wallet extension installed.
    pub fn unregistered(ledger: FakeLedger) -> Self {
        Self {
            ledger,
            account: ObjectId::from_bytes([0xaa; 32]),
            registered: false,
            approvals_open: Arc::new(watch::channel(true).0),
        }
    }

    pub fn account(&self) -> &Address {
        &self.account
    }

    /// The next approval dialog is dismissed.
    pub fn reject_next_request(&self) {
        self.ledger.state.lock().unwrap().reject_next = true;
    }

    /// Transaction approvals wait until [`FakeWallet::release_approvals`].
    pub fn hold_approvals(&self) {
        self.approvals_open.send_replace(false);
    }

    pub fn release_approvals(&self) {
        self.approvals_open.send_replace(true);
    }
}

impl WalletProvider for FakeWallet {
    fn wallets(&self) -> Vec<String> {
        if self.registered {
            vec![WALLET_NAME.to_string()]
        } else {
            Vec::new()
        }
    }

    async fn connect(&self, wallet: &str) -> Result<Address> {
        if !self.registered || wallet != WALLET_NAME {
            return Err(Report::new(ProviderFailure::NoWallet));
        }
        let mut state = self.ledger.state.lock().unwrap();
        if std::mem::take(&mut state.reject_next) {
            return Err(Report::new(ProviderFailure::UserRejected));
        }
        Ok(self.account.clone())
    }

    async fn disconnect(&self) -> Result<()> {
        Ok(())
    }

    async fn sign_and_execute(&self, intent: &TransactionIntent) -> Result<TxDigest> {
        let mut open = self.approvals_open.subscribe();
        if open.wait_for(|open| *open).await.is_err() {
            return Err(eyre!("approval dialog closed"));
        }
        self.ledger.submit(&self.account, intent)
    }
}

pub fn test_config() -> ArenaConfig {
    ArenaConfig::from_values("local", None, DEFAULT_PACKAGE_ID, None, GAME_ORIGIN)
        .unwrap()
        .with_balance_poll_interval(Duration::from_secs(10))
}

/// Gateway connected as alice.
pub struct TestContext {
    ledger: FakeLedger,
    wallet: FakeWallet,
    gateway: WalletGateway<FakeWallet, FakeLedger>,
    alice: Address,
}

impl TestContext {
    pub async fn connected() -> Self {
        let ctx = Self::disconnected();
        ctx.connect().await
    }

    pub fn disconnected() -> Self {
        let ledger = FakeLedger::new();
        let alice = ledger.fund_new_account(&ALICE_COINS);
        let wallet = FakeWallet::new(ledger.clone(), alice.clone());
        let gateway = WalletGateway::new(
            wallet.clone(),
            ledger.clone(),
            test_config().balance_poll_interval,
        );
        Self {
            ledger,
            wallet,
            gateway,
            alice,
        }
    }

    pub async fn connect(mut self) -> Self {
        self.gateway.connect().await.unwrap();
        self
    }

    pub fn ledger(&self) -> &FakeLedger {
        &self.ledger
    }

    pub fn wallet(&self) -> &FakeWallet {
        &self.wallet
    }

    pub fn gateway(&self) -> &WalletGateway<FakeWallet, FakeLedger> {
        &self.gateway
    }

    pub fn gateway_mut(&mut self) -> &mut WalletGateway<FakeWallet, FakeLedger> {
        &mut self.gateway
    }

    pub fn alice(&self) -> Address {
        self.alice.clone()
    }

    pub fn betting_contract(&self) -> BettingContract {
        BettingContract::new(test_config().package_id)
    }

    pub fn agent_market(&self) -> AgentMarket {
        AgentMarket::new(test_config().market_package_id)
    }

    /// Creates a pool seeded with alice's first coin.
    pub async fn create_game(&self) -> ChainGameId {
        let coin = self.gateway.select_spendable_coin().await.unwrap();
        self.betting_contract()
            .create_game(&self.gateway, coin)
            .await
            .unwrap()
    }

    /// Orchestrator with a connected wallet and betting open from the start.
    pub async fn connected_orchestrator() -> ArenaContext {
        let mut ctx = Self::disconnected_orchestrator();
        ctx.orchestrator.connect_wallet().await.unwrap();
        ctx
    }

    pub fn disconnected_orchestrator() -> ArenaContext {
        let ledger = FakeLedger::new();
        let alice = ledger.fund_new_account(&ALICE_COINS);
        let wallet = FakeWallet::new(ledger.clone(), alice.clone());
        let orchestrator = Orchestrator::new(&test_config(), wallet.clone(), ledger.clone())
            .with_betting_window(BettingWindow::new(
                Duration::ZERO,
                Duration::from_secs(180),
                Duration::from_secs(30),
            ));
        ArenaContext {
            orchestrator,
            ledger,
            wallet,
            alice,
        }
    }
}

pub struct ArenaContext {
    pub orchestrator: Orchestrator<FakeWallet, FakeLedger>,
    pub ledger: FakeLedger,
    pub wallet: FakeWallet,
    pub alice: Address,
}

impl ArenaContext {
    pub async fn select_room(&mut self, room: &str) -> Vec<crate::orchestrator::Effect> {
        let raw = json!({ "action": "select_spectate_room", "gameId": room }).to_string();
        self.orchestrator.handle(GAME_ORIGIN, &raw).await
    }

    pub async fn send(&mut self, message: Value) -> Vec<crate::orchestrator::Effect> {
        self.orchestrator
            .handle(GAME_ORIGIN, &message.to_string())
            .await
    }
}
