use crate::{
    betting::{
        BetDesk,
        BetSubmission,
        BettingWindow,
        RankedEntity,
        WindowPhase,
        rank_entities,
    },
    bus::{
        Decoded,
        GameState,
        InboundMessage,
        MessageBus,
        OutboundMessage,
    },
    config::ArenaConfig,
    contract::BettingContract,
    error::{
        ChainError,
        Result,
    },
    ledger::{
        Ledger,
        WalletProvider,
    },
    routes::Route,
    session::{
        CreateTicket,
        Selection,
        SessionState,
    },
    types::{
        Address,
        BackendRoomId,
        ChainGameId,
        ParticipantId,
        PendingBet,
        TxDigest,
    },
    wallet::WalletGateway,
};
use tracing::{
    debug,
    error,
    info,
    warn,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Alert shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(err: &ChainError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: err.user_message(),
        }
    }
}

/// What the page has to do after a message was handled.
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Post(OutboundMessage),
    Notify(Notice),
    Navigate(Route),
}

fn failure(err: &ChainError) -> Vec<Effect> {
    if err.is_silent() {
        return Vec::new();
    }
    vec![Effect::Notify(Notice::error(err))]
}

/// Pool creation for a selected room, detached from the orchestrator so other
/// messages can be handled while the wallet waits for approval. Hand the
/// output of [`CreateGame::run`] to [`Orchestrator::finish_create`].
pub struct CreateGame<W, L> {
    ticket: CreateTicket,
    gateway: WalletGateway<W, L>,
    contract: BettingContract,
}

impl<W, L> CreateGame<W, L>
where
    W: WalletProvider,
    L: Ledger + Clone + Send + Sync + 'static,
{
    pub fn ticket(&self) -> &CreateTicket {
        &self.ticket
    }

    pub async fn run(self) -> (CreateTicket, Result<ChainGameId>) {
        let Some(coin) = self.gateway.select_spendable_coin().await else {
            warn!(room = %self.ticket.room(), "no spendable coin to seed the pool");
            return (self.ticket, Err(ChainError::InsufficientFunds));
        };
        let result = self.contract.create_game(&self.gateway, coin).await;
        (self.ticket, result)
    }
}

/// Result of accepting a message.
pub enum Handled<W, L> {
    Done(Vec<Effect>),
    /// A pool has to be created before the selection takes effect.
    Creating(CreateGame<W, L>),
}

/// Sequences iframe messages, wallet approval and contract calls for the
/// spectate and betting pages.
pub struct Orchestrator<W, L> {
    bus: MessageBus,
    gateway: WalletGateway<W, L>,
    contract: BettingContract,
    session: SessionState,
    desk: BetDesk,
    scoreboard: Option<GameState>,
}

impl<W, L> Orchestrator<W, L>
where
    W: WalletProvider,
    L: Ledger + Clone + Send + Sync + 'static,
{
    pub fn new(config: &ArenaConfig, wallet: W, ledger: L) -> Self {
        Self {
            bus: MessageBus::new(config.game_origin()),
            gateway: WalletGateway::new(wallet, ledger, config.balance_poll_interval),
            contract: BettingContract::new(config.package_id.clone()),
            session: SessionState::new(),
            desk: BetDesk::new(BettingWindow::default()),
            scoreboard: None,
        }
    }

    pub fn with_betting_window(mut self, window: BettingWindow) -> Self {
        self.desk = BetDesk::new(window);
        self
    }

    pub fn gateway(&self) -> &WalletGateway<W, L> {
        &self.gateway
    }

    pub fn contract(&self) -> &BettingContract {
        &self.contract
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn bet_desk(&self) -> &BetDesk {
        &self.desk
    }

    pub fn scoreboard(&self) -> Option<&GameState> {
        self.scoreboard.as_ref()
    }

    pub fn betting_phase(&self) -> WindowPhase {
        self.desk.window_phase()
    }

    /// Sent once the iframe has loaded.
    pub fn request_room_list(&self) -> Effect {
        Effect::Post(OutboundMessage::Spectate)
    }

    pub async fn connect_wallet(&mut self) -> Result<Address> {
        self.gateway.connect().await
    }

    /// Disconnecting ends the session.
    pub async fn disconnect_wallet(&mut self) {
        self.gateway.disconnect().await;
        self.session.reset();
    }

    /// Handles one `postMessage` event, including any pool creation it starts.
    pub async fn handle(&mut self, origin: &str, raw: &str) -> Vec<Effect> {
        match self.accept(origin, raw).await {
            Handled::Done(effects) => effects,
            Handled::Creating(create) => {
                let (ticket, result) = create.run().await;
                self.finish_create(&ticket, result)
            }
        }
    }

    /// Handles one `postMessage` event but leaves a pool creation to the
    /// caller, so newer selections can be accepted while it is pending.
    pub async fn accept(&mut self, origin: &str, raw: &str) -> Handled<W, L> {
        match self.bus.decode(origin, raw) {
            Decoded::Message(message) => self.dispatch(message).await,
            Decoded::Ignored(reason) => {
                debug!(?reason, "message ignored");
                Handled::Done(Vec::new())
            }
        }
    }

    async fn dispatch(&mut self, message: InboundMessage) -> Handled<W, L> {
        let effects = match message {
            InboundMessage::SelectSpectateRoom { game_id } => {
                return self.select_spectate_room(game_id);
            }
            InboundMessage::SpectateJoined { game_id } => {
                if self.session.room() == Some(&game_id) {
                    info!(room = %game_id, "spectating");
                } else {
                    warn!(room = %game_id, current = ?self.session.room(), "joined a room that is not selected");
                }
                Vec::new()
            }
            InboundMessage::GameStateUpdate { game_state } => {
                self.scoreboard = Some(game_state);
                Vec::new()
            }
            InboundMessage::GameEnded { winner_id, game_id } => {
                self.game_ended(winner_id, game_id).await
            }
            InboundMessage::BackToHome => {
                info!("back to home");
                self.session.reset();
                vec![Effect::Navigate(Route::Home)]
            }
        };
        Handled::Done(effects)
    }

    /// Selects `room`. Starts a pool creation only when the room has none yet
    /// this session.
    pub fn select_spectate_room(&mut self, room: BackendRoomId) -> Handled<W, L> {
        let selection = self.session.select_room(room.clone());
        match selection {
            Selection::New => {}
            Selection::Creating => return Handled::Done(Vec::new()),
            Selection::Active(_) => {
                return Handled::Done(vec![Effect::Post(
                    OutboundMessage::StartSpectating { game_id: room },
                )]);
            }
            Selection::Settled(game) => {
                info!(%room, %game, "room already settled this session");
                return Handled::Done(vec![Effect::Notify(Notice::info(
                    "This game has already been settled.",
                ))]);
            }
        }
        if !self.gateway.is_connected() {
            self.session.abandon_selection();
            return Handled::Done(failure(&ChainError::WalletNotConnected));
        }
        let Some(ticket) = self.session.begin_create() else {
            return Handled::Done(Vec::new());
        };
        Handled::Creating(CreateGame {
            ticket,
            gateway: self.gateway.clone(),
            contract: self.contract.clone(),
        })
    }

    /// Writes back the outcome of a creation started with `ticket`. Results of
    /// superseded selections are dropped without touching the session.
    pub fn finish_create(
        &mut self,
        ticket: &CreateTicket,
        result: Result<ChainGameId>,
    ) -> Vec<Effect> {
        match result {
            Ok(game) => match self.session.commit_created(ticket, game) {
                Ok(()) => {
                    self.desk.restart_window();
                    vec![Effect::Post(OutboundMessage::StartSpectating {
                        game_id: ticket.room().clone(),
                    })]
                }
                Err(err) => failure(&err),
            },
            Err(err) => {
                if self.session.fail_create(ticket).is_err() {
                    debug!(room = %ticket.room(), ?err, "stale create failure dropped");
                    return Vec::new();
                }
                error!(room = %ticket.room(), ?err, "creating the betting pool failed");
                failure(&err)
            }
        }
    }

    async fn game_ended(
        &mut self,
        winner: ParticipantId,
        room: Option<BackendRoomId>,
    ) -> Vec<Effect> {
        if let Some(room) = &room
            && self.session.room() != Some(room)
        {
            warn!(%room, current = ?self.session.room(), "game_ended for another room ignored");
            return Vec::new();
        }
        let Some(game) = self.session.begin_settle() else {
            debug!(%winner, "game_ended without an active chain game");
            return Vec::new();
        };
        let result = self.contract.end_game(&self.gateway, &game, winner).await;
        self.session.finish_settle();
        match result {
            Ok(digest) => {
                info!(%game, %winner, %digest, "settlement confirmed");
                vec![Effect::Notify(Notice::info(format!(
                    "Game settled, participant {winner} won."
                )))]
            }
            Err(err) => {
                error!(%game, %winner, ?err, "settlement failed");
                failure(&err)
            }
        }
    }

    /// Reserves a bet on the active game; see [`BetDesk::begin_bet`].
    pub async fn begin_bet(
        &mut self,
        participant: ParticipantId,
        amount: u64,
    ) -> Result<BetSubmission<W, L>> {
        let game = self.session.chain_game().cloned();
        self.desk
            .begin_bet(&self.gateway, &self.contract, game.as_ref(), participant, amount)
            .await
    }

    pub fn finish_bet(&mut self, bet: PendingBet, result: Result<TxDigest>) -> Result<TxDigest> {
        self.desk.finish_bet(bet, result)
    }

    /// Places a bet on the active game.
    pub async fn place_bet(&mut self, participant: ParticipantId, amount: u64) -> Result<TxDigest> {
        let game = self.session.chain_game().cloned();
        self.desk
            .place_bet(&self.gateway, &self.contract, game.as_ref(), participant, amount)
            .await
    }

    /// Betting panel: top entities, priced with on-chain odds when a pool is
    /// active and the query succeeds.
    pub async fn betting_panel(&self) -> Vec<RankedEntity> {
        let Some(state) = &self.scoreboard else {
            return Vec::new();
        };
        let mut ranked = rank_entities(state);
        let Some(game) = self.session.chain_game() else {
            return ranked;
        };
        for entry in ranked.iter_mut() {
            let Ok(participant) = ParticipantId::try_from(entry.entity.id) else {
                continue;
            };
            if let Some(odds) = self
                .contract
                .fetch_odds(&self.gateway, game, participant)
                .await
            {
                entry.odds = odds;
            }
        }
        ranked
    }
}
