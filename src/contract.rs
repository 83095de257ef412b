use crate::{
    error::{
        ChainError,
        Result,
    },
    ledger::{
        CallArg,
        ExecutionStatus,
        Ledger,
        MoveCall,
        TransactionIntent,
        WalletProvider,
    },
    types::{
        ChainGameId,
        CoinHandle,
        ODDS_SCALE,
        ObjectId,
        ParticipantId,
        TxDigest,
    },
    wallet::WalletGateway,
};
use tracing::{
    debug,
    info,
    warn,
};

const BETTING_MODULE: &str = "betting";

/// Calls into the on-chain `betting` module.
#[derive(Clone, Debug)]
pub struct BettingContract {
    package: ObjectId,
}

impl BettingContract {
    pub fn new(package: ObjectId) -> Self {
        Self { package }
    }

    pub fn package(&self) -> &ObjectId {
        &self.package
    }

    fn call(&self, function: &str) -> MoveCall {
        MoveCall::new(&self.package, BETTING_MODULE, function)
    }

    pub fn create_game_intent(&self, pool_coin: CoinHandle) -> TransactionIntent {
        TransactionIntent::single(
            self.call("create_game")
                .arg(CallArg::Object(pool_coin.object_id)),
        )
    }

    pub fn place_bet_intent(
        &self,
        game: &ChainGameId,
        participant: ParticipantId,
        amount: u64,
        coin: CoinHandle,
    ) -> TransactionIntent {
        TransactionIntent::single(
            self.call("place_bet")
                .arg(CallArg::Object(game.clone()))
                .arg(CallArg::U64(participant.into()))
                .arg(CallArg::U64(amount))
                .arg(CallArg::Object(coin.object_id)),
        )
    }

    pub fn end_game_intent(
        &self,
        game: &ChainGameId,
        winner: ParticipantId,
    ) -> TransactionIntent {
        TransactionIntent::single(
            self.call("end_game")
                .arg(CallArg::Object(game.clone()))
                .arg(CallArg::U64(winner.into())),
        )
    }

    pub fn odds_intent(&self, game: &ChainGameId, participant: ParticipantId) -> TransactionIntent {
        TransactionIntent::single(
            self.call("get_odds")
                .arg(CallArg::Object(game.clone()))
                .arg(CallArg::U8(participant.get())),
        )
    }

    /// Creates a betting pool seeded with `pool_coin` and returns its object id.
    pub async fn create_game<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        pool_coin: CoinHandle,
    ) -> Result<ChainGameId>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let coin = pool_coin.object_id.clone();
        let effects = gateway
            .sign_and_submit(&self.create_game_intent(pool_coin))
            .await?;
        let Some(created) = effects.created.first() else {
            warn!(digest = %effects.digest, %coin, "create_game effects list no created object");
            return Err(ChainError::ObjectIdNotFound);
        };
        info!(game = %created.object_id, digest = %effects.digest, "betting pool created");
        Ok(created.object_id.clone())
    }

    /// Submits a bet. Business rules are validated by the caller.
    pub async fn place_bet<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        game: &ChainGameId,
        participant: ParticipantId,
        amount: u64,
        coin: CoinHandle,
    ) -> Result<TxDigest>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let intent = self.place_bet_intent(game, participant, amount, coin);
        let effects = gateway.sign_and_submit(&intent).await?;
        info!(%game, %participant, amount, digest = %effects.digest, "bet placed");
        Ok(effects.digest)
    }

    /// Settles the pool. Must be invoked at most once per game.
    pub async fn end_game<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        game: &ChainGameId,
        winner: ParticipantId,
    ) -> Result<TxDigest>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let effects = gateway
            .sign_and_submit(&self.end_game_intent(game, winner))
            .await?;
        info!(%game, %winner, digest = %effects.digest, "game settled");
        Ok(effects.digest)
    }

    /// Current odds multiplier for `participant`, or `None` when the query
    /// fails for any reason.
    pub async fn fetch_odds<W, L>(
        &self,
        gateway: &WalletGateway<W, L>,
        game: &ChainGameId,
        participant: ParticipantId,
    ) -> Option<f64>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let results = match gateway.inspect(&self.odds_intent(game, participant)).await {
            Ok(results) => results,
            Err(err) => {
                warn!(%game, %participant, ?err, "odds inspection failed");
                return None;
            }
        };
        if let ExecutionStatus::Failure(reason) = &results.status {
            warn!(%game, %participant, %reason, "odds inspection aborted");
            return None;
        }
        match results.return_values.first().map(|raw| decode_u64(raw)) {
            Some(Ok(scaled)) => {
                debug!(%game, %participant, scaled, "odds fetched");
                Some(scaled as f64 / ODDS_SCALE as f64)
            }
            Some(Err(err)) => {
                warn!(%game, %participant, ?err, "odds return value malformed");
                None
            }
            None => {
                warn!(%game, %participant, "odds inspection returned nothing");
                None
            }
        }
    }
}

/// Decodes a BCS `u64`: exactly eight little-endian bytes.
pub fn decode_u64(raw: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = raw.try_into().map_err(|_| {
        ChainError::DecodeError(format!("expected 8 bytes for u64, got {}", raw.len()))
    })?;
    Ok(u64::from_le_bytes(bytes))
}
