use crate::{
    error::{
        ChainError,
        Result,
    },
    ledger::{
        CallArg,
        Command,
        KIOSK_LISTING_PREFIX,
        Ledger,
        MoveCall,
        MoveObject,
        TransactionIntent,
        WalletProvider,
    },
    types::{
        Address,
        ObjectId,
        TxDigest,
    },
    wallet::WalletGateway,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{
    info,
    warn,
};

const AGENT_MODULE: &str = "agar";
const MARKET_MODULE: &str = "agarsmarket";
/// Balance the mint form asks for before it lets a mint through.
pub const MINT_MIN_BALANCE_MIST: u64 = 100_000_000;

/// Form input for a new agent NFT.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgentDraft {
    pub author: String,
    pub title: String,
    pub category: String,
    pub story: String,
}

impl AgentDraft {
    fn validate(&self) -> Result<()> {
        let fields = [
            ("author", &self.author),
            ("title", &self.title),
            ("category", &self.category),
            ("story", &self.story),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((name, _)) => Err(ChainError::InvalidInput(format!(
                "agent {name} must not be empty"
            ))),
            None => Ok(()),
        }
    }
}

/// Agent NFT as shown in the marketplace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Agent {
    pub id: ObjectId,
    /// Owning account, or the kiosk id for listed agents.
    pub owner: String,
    pub author: String,
    pub title: String,
    pub category: String,
    pub story: String,
    /// Listing price in MIST, set only for kiosk listings.
    pub price: Option<u64>,
}

#[derive(Deserialize)]
struct AgentFields {
    #[serde(default)]
    owner: String,
    author: String,
    title: String,
    category: String,
    story: String,
}

impl Agent {
    fn from_object(object: MoveObject, price: Option<u64>) -> Result<Self> {
        let fields: AgentFields = serde_json::from_value(object.fields)
            .map_err(|e| ChainError::DecodeError(format!("agent {}: {e}", object.object_id)))?;
        Ok(Self {
            id: object.object_id,
            owner: fields.owner,
            author: fields.author,
            title: fields.title,
            category: fields.category,
            story: fields.story,
            price,
        })
    }
}

/// Mint, kiosk listing and purchase of agent NFTs.
#[derive(Clone, Debug)]
pub struct AgentMarket {
    package: ObjectId,
}

impl AgentMarket {
    pub fn new(package: ObjectId) -> Self {
        Self { package }
    }

    pub fn agent_type(&self) -> String {
        format!("{}::{AGENT_MODULE}::Agar", self.package)
    }

    pub fn mint_intent(&self, draft: &AgentDraft) -> Result<TransactionIntent> {
        draft.validate()?;
        Ok(TransactionIntent::single(
            MoveCall::new(&self.package, AGENT_MODULE, "mint_agar")
                .arg(CallArg::String(draft.author.clone()))
                .arg(CallArg::String(draft.title.clone()))
                .arg(CallArg::String(draft.category.clone()))
                .arg(CallArg::String(draft.story.clone())),
        ))
    }

    /// Places the agent into the kiosk and lists it, in one transaction.
    pub fn list_intent(
        &self,
        kiosk: &ObjectId,
        kiosk_cap: &ObjectId,
        agent: &ObjectId,
        price_mist: u64,
    ) -> Result<TransactionIntent> {
        if price_mist == 0 {
            return Err(ChainError::InvalidInput(
                "listing price must be greater than zero".into(),
            ));
        }
        let mut intent = TransactionIntent::new();
        intent.push(Command::MoveCall(
            MoveCall::new(&self.package, MARKET_MODULE, "place_agar")
                .type_arg(self.agent_type())
                .arg(CallArg::Object(kiosk.clone()))
                .arg(CallArg::Object(kiosk_cap.clone()))
                .arg(CallArg::Object(agent.clone())),
        ));
        intent.push(Command::MoveCall(
            MoveCall::new(&self.package, MARKET_MODULE, "list_agar")
                .type_arg(self.agent_type())
                .arg(CallArg::Object(kiosk.clone()))
                .arg(CallArg::Object(kiosk_cap.clone()))
                .arg(CallArg::Object(agent.clone()))
                .arg(CallArg::U64(price_mist)),
        ));
        Ok(intent)
    }

    /// Pays from a coin split off gas.
    pub fn purchase_intent(
        &self,
        kiosk: &ObjectId,
        agent: &ObjectId,
        price_mist: u64,
    ) -> Result<TransactionIntent> {
        if price_mist == 0 {
            return Err(ChainError::InvalidInput("agent is not for sale".into()));
        }
        let mut intent = TransactionIntent::new();
        let payment = intent.push(Command::SplitGas {
            amounts: vec![price_mist],
        });
        intent.push(Command::MoveCall(
            MoveCall::new(&self.package, MARKET_MODULE, "purchase_agar")
                .type_arg(self.agent_type())
                .arg(CallArg::Object(kiosk.clone()))
                .arg(CallArg::Object(agent.clone()))
                .arg(payment),
        ));
        Ok(intent)
    }

    pub async fn mint_agent<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        draft: &AgentDraft,
    ) -> Result<ObjectId>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        if !gateway.is_connected() {
            return Err(ChainError::WalletNotConnected);
        }
        let intent = self.mint_intent(draft)?;
        if gateway.balance_mist() < MINT_MIN_BALANCE_MIST {
            return Err(ChainError::InsufficientFunds);
        }
        let effects = gateway.sign_and_submit(&intent).await?;
        let minted = effects
            .created
            .first()
            .map(|created| created.object_id.clone())
            .ok_or(ChainError::ObjectIdNotFound)?;
        info!(agent = %minted, title = %draft.title, "agent minted");
        Ok(minted)
    }

    pub async fn list_agent<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        kiosk: &ObjectId,
        kiosk_cap: &ObjectId,
        agent: &ObjectId,
        price_mist: u64,
    ) -> Result<TxDigest>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let intent = self.list_intent(kiosk, kiosk_cap, agent, price_mist)?;
        let effects = gateway.sign_and_submit(&intent).await?;
        info!(%agent, %kiosk, price_mist, "agent listed");
        Ok(effects.digest)
    }

    pub async fn purchase_agent<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        kiosk: &ObjectId,
        agent: &ObjectId,
        price_mist: u64,
    ) -> Result<TxDigest>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        if !gateway.is_connected() {
            return Err(ChainError::WalletNotConnected);
        }
        let intent = self.purchase_intent(kiosk, agent, price_mist)?;
        if gateway.balance_mist() < price_mist {
            warn!(%agent, price_mist, balance = gateway.balance_mist(), "balance below price");
            return Err(ChainError::InsufficientFunds);
        }
        let effects = gateway.sign_and_submit(&intent).await?;
        info!(%agent, %kiosk, price_mist, "agent purchased");
        Ok(effects.digest)
    }

    /// Agents held directly by the connected account.
    pub async fn owned_agents<W, L>(&self, gateway: &WalletGateway<W, L>) -> Result<Vec<Agent>>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let owner: &Address = gateway.address().ok_or(ChainError::WalletNotConnected)?;
        let agent_type = self.agent_type();
        let objects = gateway
            .ledger()
            .owned_objects(owner, &agent_type)
            .await
            .map_err(|report| ChainError::classify(&report))?;
        let agents = objects
            .into_iter()
            .filter(|object| object.type_ == agent_type)
            .filter_map(|object| match Agent::from_object(object, None) {
                Ok(agent) => Some(agent),
                Err(err) => {
                    warn!(?err, "skipping malformed owned agent");
                    None
                }
            })
            .collect();
        Ok(agents)
    }

    /// Agents currently listed in `kiosk`, with their prices.
    pub async fn listed_agents<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        kiosk: &ObjectId,
    ) -> Result<Vec<Agent>>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let ledger = gateway.ledger();
        let fields = ledger
            .dynamic_fields(kiosk)
            .await
            .map_err(|report| ChainError::classify(&report))?;
        let agent_type = self.agent_type();
        let mut agents = Vec::new();
        for field in fields
            .into_iter()
            .filter(|field| field.object_type.starts_with(KIOSK_LISTING_PREFIX))
        {
            let Some(item_id) = field
                .name
                .get("value")
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<ObjectId>().ok())
            else {
                warn!(listing = %field.object_id, "listing without an item id");
                continue;
            };
            let listing = ledger
                .object(&field.object_id)
                .await
                .map_err(|report| ChainError::classify(&report))?;
            let Some(price) = listing.as_ref().and_then(|l| listing_price(&l.fields)) else {
                warn!(listing = %field.object_id, "listing without a price");
                continue;
            };
            let item = ledger
                .object(&item_id)
                .await
                .map_err(|report| ChainError::classify(&report))?;
            match item {
                Some(object) if object.type_ == agent_type => {
                    match Agent::from_object(object, Some(price)) {
                        Ok(agent) => agents.push(Agent {
                            owner: kiosk.to_string(),
                            ..agent
                        }),
                        Err(err) => warn!(?err, "skipping malformed listed agent"),
                    }
                }
                _ => warn!(item = %item_id, "listed item is not an agent"),
            }
        }
        Ok(agents)
    }
}

/// Listing price lives in the `value` field, as a decimal string or a number.
fn listing_price(fields: &Value) -> Option<u64> {
    match fields.get("value")? {
        Value::String(raw) => raw.parse().ok(),
        Value::Number(number) => number.as_u64(),
        _ => None,
    }
}
