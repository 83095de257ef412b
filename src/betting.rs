use crate::{
    bus::{
        Entity,
        GameState,
    },
    contract::BettingContract,
    error::{
        ChainError,
        Result,
    },
    ledger::{
        Ledger,
        WalletProvider,
    },
    types::{
        ChainGameId,
        CoinHandle,
        ParticipantId,
        PendingBet,
        TxDigest,
    },
    wallet::WalletGateway,
};
use chrono::{
    DateTime,
    Utc,
};
use std::{
    cmp::Ordering,
    time::Duration,
};
use tokio::time::Instant;
use tracing::{
    info,
    warn,
};

/// Number of entities the betting panel offers.
pub const PANEL_SIZE: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindowPhase {
    Countdown { remaining: Duration },
    Open,
    /// Last stretch of the window; bets are still taken.
    Closing,
    Closed,
}

impl WindowPhase {
    pub fn accepts_bets(self) -> bool {
        matches!(self, WindowPhase::Open | WindowPhase::Closing)
    }
}

/// Betting schedule relative to when the betting page opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BettingWindow {
    pub countdown: Duration,
    pub open: Duration,
    pub closing: Duration,
}

impl Default for BettingWindow {
    fn default() -> Self {
        Self {
            countdown: Duration::from_secs(60),
            open: Duration::from_secs(180),
            closing: Duration::from_secs(30),
        }
    }
}

impl BettingWindow {
    pub fn new(countdown: Duration, open: Duration, closing: Duration) -> Self {
        Self {
            countdown,
            open,
            closing,
        }
    }

    pub fn phase_at(&self, elapsed: Duration) -> WindowPhase {
        let open_at = self.countdown;
        let closing_at = open_at + self.open;
        let closed_at = closing_at + self.closing;
        if elapsed < open_at {
            WindowPhase::Countdown {
                remaining: open_at - elapsed,
            }
        } else if elapsed < closing_at {
            WindowPhase::Open
        } else if elapsed < closed_at {
            WindowPhase::Closing
        } else {
            WindowPhase::Closed
        }
    }
}

/// Panel odds used when the chain has none: higher score pays less.
pub fn fallback_odds(score: f64) -> f64 {
    1.0 + 10.0 / (score.max(0.0) + 1.0)
}

pub fn potential_winnings(amount_mist: u64, odds: f64) -> u64 {
    (amount_mist as f64 * odds).floor() as u64
}

#[derive(Clone, Debug, PartialEq)]
pub struct RankedEntity {
    pub entity: Entity,
    pub odds: f64,
}

/// Top entities by score, highest first, with fallback odds.
pub fn rank_entities(state: &GameState) -> Vec<RankedEntity> {
    let mut ranked: Vec<RankedEntity> = state
        .entities()
        .map(|entity| RankedEntity {
            odds: fallback_odds(entity.score),
            entity: entity.clone(),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.entity
            .score
            .partial_cmp(&a.entity.score)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(PANEL_SIZE);
    ranked
}

#[derive(Clone, Debug, PartialEq)]
pub struct BetRecord {
    pub game: ChainGameId,
    pub participant: ParticipantId,
    pub amount: u64,
    pub digest: TxDigest,
    pub placed_at: DateTime<Utc>,
}

/// Validates and submits bets for the active pool, one at a time.
#[derive(Debug)]
pub struct BetDesk {
    window: BettingWindow,
    opened_at: Instant,
    pending: Option<PendingBet>,
    placed: Vec<BetRecord>,
}

impl BetDesk {
    pub fn new(window: BettingWindow) -> Self {
        Self {
            window,
            opened_at: Instant::now(),
            pending: None,
            placed: Vec::new(),
        }
    }

    /// Restarts the schedule, as when the betting page is opened again.
    pub fn restart_window(&mut self) {
        self.opened_at = Instant::now();
    }

    pub fn window_phase(&self) -> WindowPhase {
        self.window.phase_at(self.opened_at.elapsed())
    }

    pub fn pending(&self) -> Option<&PendingBet> {
        self.pending.as_ref()
    }

    pub fn placed(&self) -> &[BetRecord] {
        &self.placed
    }

    /// Validates a bet and reserves it as pending. The returned submission
    /// runs without borrowing the desk; its output goes to
    /// [`BetDesk::finish_bet`]. Only one bet can be pending at a time.
    pub async fn begin_bet<W, L>(
        &mut self,
        gateway: &WalletGateway<W, L>,
        contract: &BettingContract,
        game: Option<&ChainGameId>,
        participant: ParticipantId,
        amount: u64,
    ) -> Result<BetSubmission<W, L>>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        if !gateway.is_connected() {
            return Err(ChainError::WalletNotConnected);
        }
        if amount == 0 {
            return Err(ChainError::InvalidInput(
                "bet amount must be greater than zero".into(),
            ));
        }
        let phase = self.window_phase();
        if !phase.accepts_bets() {
            return Err(ChainError::InvalidInput(format!(
                "betting is not open ({phase:?})"
            )));
        }
        let Some(game) = game else {
            return Err(ChainError::InvalidInput("no active game to bet on".into()));
        };
        if amount > gateway.balance_mist() {
            return Err(ChainError::InsufficientFunds);
        }
        if let Some(pending) = &self.pending {
            warn!(game = %pending.game, participant = %pending.participant, "bet refused while another awaits confirmation");
            return Err(ChainError::InvalidInput(
                "a bet is already awaiting confirmation".into(),
            ));
        }
        let Some(coin) = gateway.select_spendable_coin().await else {
            return Err(ChainError::InsufficientFunds);
        };
        if coin.balance < amount {
            warn!(coin = %coin.object_id, coin_balance = coin.balance, amount, "selected coin cannot cover the bet");
            return Err(ChainError::InsufficientFunds);
        }

        let bet = PendingBet {
            game: game.clone(),
            participant,
            amount,
            coin: coin.object_id.clone(),
            submitted_at: Utc::now(),
        };
        self.pending = Some(bet.clone());
        Ok(BetSubmission {
            bet,
            coin,
            gateway: gateway.clone(),
            contract: contract.clone(),
        })
    }

    /// Releases the pending bet and records it when confirmed.
    pub fn finish_bet(&mut self, bet: PendingBet, result: Result<TxDigest>) -> Result<TxDigest> {
        if self.pending.as_ref() == Some(&bet) {
            self.pending = None;
        }
        let digest = result?;
        info!(game = %bet.game, participant = %bet.participant, amount = bet.amount, %digest, "bet confirmed");
        self.placed.push(BetRecord {
            game: bet.game,
            participant: bet.participant,
            amount: bet.amount,
            digest: digest.clone(),
            placed_at: bet.submitted_at,
        });
        Ok(digest)
    }

    /// Validates, submits and records a bet in one go.
    pub async fn place_bet<W, L>(
        &mut self,
        gateway: &WalletGateway<W, L>,
        contract: &BettingContract,
        game: Option<&ChainGameId>,
        participant: ParticipantId,
        amount: u64,
    ) -> Result<TxDigest>
    where
        W: WalletProvider,
        L: Ledger + Clone + Send + Sync + 'static,
    {
        let submission = self
            .begin_bet(gateway, contract, game, participant, amount)
            .await?;
        let (bet, result) = submission.run().await;
        self.finish_bet(bet, result)
    }
}

/// A validated bet on its way through wallet approval.
pub struct BetSubmission<W, L> {
    bet: PendingBet,
    coin: CoinHandle,
    gateway: WalletGateway<W, L>,
    contract: BettingContract,
}

impl<W, L> BetSubmission<W, L>
where
    W: WalletProvider,
    L: Ledger + Clone + Send + Sync + 'static,
{
    pub fn bet(&self) -> &PendingBet {
        &self.bet
    }

    pub async fn run(self) -> (PendingBet, Result<TxDigest>) {
        let result = self
            .contract
            .place_bet(
                &self.gateway,
                &self.bet.game,
                self.bet.participant,
                self.bet.amount,
                self.coin,
            )
            .await;
        (self.bet, result)
    }
}
