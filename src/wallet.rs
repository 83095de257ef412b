use crate::{
    error::{
        ChainError,
        Result,
    },
    ledger::{
        DevInspectResults,
        ExecutionStatus,
        Ledger,
        SUI_COIN_TYPE,
        TransactionEffects,
        TransactionIntent,
        WalletProvider,
    },
    types::{
        Address,
        CoinHandle,
        mist_to_sui,
        zero_address,
    },
};
use std::{
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time,
};
use tracing::{
    error,
    info,
    warn,
};

struct Connection {
    address: Address,
    balance_rx: watch::Receiver<u64>,
    poller: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.poller.abort();
    }
}

/// Connection status, balance and signing for the page, backed by the
/// browser wallet and a fullnode client.
///
/// Clones share the wallet and keep the connection that was current when they
/// were taken, so a clone can finish a transaction after the original moved on.
pub struct WalletGateway<W, L> {
    wallet: Arc<W>,
    ledger: L,
    poll_interval: Duration,
    connection: Option<Arc<Connection>>,
}

impl<W, L: Clone> Clone for WalletGateway<W, L> {
    fn clone(&self) -> Self {
        Self {
            wallet: Arc::clone(&self.wallet),
            ledger: self.ledger.clone(),
            poll_interval: self.poll_interval,
            connection: self.connection.clone(),
        }
    }
}

impl<W, L> WalletGateway<W, L>
where
    W: WalletProvider,
    L: Ledger + Clone + Send + Sync + 'static,
{
    pub fn new(wallet: W, ledger: L, poll_interval: Duration) -> Self {
        Self {
            wallet: Arc::new(wallet),
            ledger,
            poll_interval,
            connection: None,
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn address(&self) -> Option<&Address> {
        self.connection.as_ref().map(|c| &c.address)
    }

    /// Latest polled balance in MIST, zero when disconnected.
    pub fn balance_mist(&self) -> u64 {
        self.connection
            .as_ref()
            .map(|c| *c.balance_rx.borrow())
            .unwrap_or_default()
    }

    pub fn balance_sui(&self) -> f64 {
        mist_to_sui(self.balance_mist())
    }

    /// Subscribes to balance updates of the current connection.
    pub fn watch_balance(&self) -> Option<watch::Receiver<u64>> {
        self.connection.as_ref().map(|c| c.balance_rx.clone())
    }

    pub async fn connect(&mut self) -> Result<Address> {
        if let Some(connection) = &self.connection {
            return Ok(connection.address.clone());
        }
        let wallets = self.wallet.wallets();
        let Some(wallet_name) = wallets.first() else {
            warn!("connect requested but no wallet extension is registered");
            return Err(ChainError::NoWalletFound);
        };
        info!(wallet = %wallet_name, "connecting wallet");
        let address = self.wallet.connect(wallet_name).await.map_err(|report| {
            let classified = ChainError::classify(&report);
            error!(error = %report, "wallet connection failed");
            classified
        })?;

        let initial = fetch_balance(&self.ledger, &address).await;
        let (balance_tx, balance_rx) = watch::channel(initial);
        let poller = tokio::spawn(balance_worker(
            self.poll_interval,
            self.ledger.clone(),
            address.clone(),
            balance_tx,
        ));
        info!(%address, balance = initial, "wallet connected");
        self.connection = Some(Arc::new(Connection {
            address: address.clone(),
            balance_rx,
            poller,
        }));
        Ok(address)
    }

    pub async fn disconnect(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        drop(connection);
        if let Err(err) = self.wallet.disconnect().await {
            error!(?err, "failed to disconnect wallet");
        }
        info!("wallet disconnected");
    }

    /// First SUI coin owned by the connected account. The handle may only be
    /// spent by a single transaction.
    pub async fn select_spendable_coin(&self) -> Option<CoinHandle> {
        let Some(address) = self.address() else {
            warn!("cannot select a coin while the wallet is disconnected");
            return None;
        };
        match self.ledger.coins(address, SUI_COIN_TYPE, 1).await {
            Ok(coins) => {
                let coin = coins.into_iter().next();
                if coin.is_none() {
                    warn!(%address, "no SUI coin objects owned by the connected wallet");
                }
                coin.map(|c| CoinHandle {
                    object_id: c.coin_object_id,
                    balance: c.balance,
                })
            }
            Err(err) => {
                error!(?err, "fetching spendable coin failed");
                None
            }
        }
    }

    /// Sends the intent through wallet approval and waits for finality.
    pub async fn sign_and_submit(
        &self,
        intent: &TransactionIntent,
    ) -> Result<TransactionEffects> {
        if !self.is_connected() {
            return Err(ChainError::WalletNotConnected);
        }
        let digest = self
            .wallet
            .sign_and_execute(intent)
            .await
            .map_err(|report| {
                let classified = ChainError::classify(&report);
                warn!(error = %report, ?classified, "transaction was not submitted");
                classified
            })?;
        info!(%digest, "transaction submitted");
        let effects = self
            .ledger
            .wait_for_transaction(&digest)
            .await
            .map_err(|report| {
                error!(%digest, error = %report, "waiting for finality failed");
                ChainError::classify(&report)
            })?;
        match &effects.status {
            ExecutionStatus::Success => {
                info!(%digest, "transaction final");
                Ok(effects)
            }
            ExecutionStatus::Failure(reason) => {
                error!(%digest, %reason, "transaction failed on chain");
                Err(ChainError::from_execution_failure(reason))
            }
        }
    }

    /// Read-only call executed from the zero address.
    pub async fn inspect(&self, intent: &TransactionIntent) -> Result<DevInspectResults> {
        self.ledger
            .dev_inspect(&zero_address(), intent)
            .await
            .map_err(|report| ChainError::classify(&report))
    }
}

async fn fetch_balance<L: Ledger>(ledger: &L, owner: &Address) -> u64 {
    match ledger.balance(owner, SUI_COIN_TYPE).await {
        Ok(balance) => balance,
        Err(err) => {
            warn!(?err, "balance fetch failed");
            0
        }
    }
}

async fn balance_worker<L: Ledger>(
    poll_interval: Duration,
    ledger: L,
    owner: Address,
    balance_tx: watch::Sender<u64>,
) {
    let mut ticker = time::interval_at(time::Instant::now() + poll_interval, poll_interval);
    loop {
        ticker.tick().await;
        let balance = fetch_balance(&ledger, &owner).await;
        if balance_tx.send(balance).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::test_helpers::{
        FakeLedger,
        FakeWallet,
    };

    fn gateway(wallet: FakeWallet, ledger: FakeLedger) -> WalletGateway<FakeWallet, FakeLedger> {
        WalletGateway::new(wallet, ledger, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn connect__fails_without_registered_wallet() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::unregistered(ledger.clone());
        let mut gateway = gateway(wallet, ledger);

        // when
        let result = gateway.connect().await;

        // then
        assert_eq!(result, Err(ChainError::NoWalletFound));
        assert!(!gateway.is_connected());
    }

    #[tokio::test]
    async fn connect__reports_dismissed_approval() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::new(ledger.clone(), ledger.fund_new_account(&[100]));
        wallet.reject_next_request();
        let mut gateway = gateway(wallet, ledger);

        // when
        let result = gateway.connect().await;

        // then
        assert_eq!(result, Err(ChainError::UserRejected));
        assert_eq!(gateway.balance_mist(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn connect__loads_balance_and_keeps_polling() {
        // given
        let ledger = FakeLedger::new();
        let account = ledger.fund_new_account(&[700, 300]);
        let wallet = FakeWallet::new(ledger.clone(), account.clone());
        let mut gateway = gateway(wallet, ledger.clone());

        // when
        gateway.connect().await.unwrap();
        let initial = gateway.balance_mist();
        ledger.credit(&account, 2_000);
        time::sleep(Duration::from_secs(11)).await;

        // then
        assert_eq!(initial, 1_000);
        assert_eq!(gateway.balance_mist(), 3_000);
    }

    #[tokio::test(start_paused = true)]
    async fn balance_worker__publishes_zero_when_poll_fails() {
        // given
        let ledger = FakeLedger::new();
        let account = ledger.fund_new_account(&[700, 300]);
        let wallet = FakeWallet::new(ledger.clone(), account);
        let mut gateway = gateway(wallet, ledger.clone());
        gateway.connect().await.unwrap();
        let initial = gateway.balance_mist();

        // when
        ledger.fail_network(true);
        time::sleep(Duration::from_secs(11)).await;

        // then
        assert_eq!(initial, 1_000);
        assert_eq!(gateway.balance_mist(), 0);
        assert!(gateway.is_connected());
    }

    #[tokio::test]
    async fn clone__keeps_connection_after_original_disconnects() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::new(ledger.clone(), ledger.fund_new_account(&[100]));
        let mut gateway = gateway(wallet, ledger);
        let address = gateway.connect().await.unwrap();
        let detached = gateway.clone();

        // when
        gateway.disconnect().await;

        // then
        assert!(!gateway.is_connected());
        assert_eq!(detached.address(), Some(&address));
    }

    #[tokio::test]
    async fn disconnect__is_idempotent_and_clears_state() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::new(ledger.clone(), ledger.fund_new_account(&[100]));
        let mut gateway = gateway(wallet, ledger);
        gateway.connect().await.unwrap();

        // when
        gateway.disconnect().await;
        gateway.disconnect().await;

        // then
        assert!(gateway.address().is_none());
        assert_eq!(gateway.balance_mist(), 0);
        assert!(gateway.select_spendable_coin().await.is_none());
    }

    #[tokio::test]
    async fn select_spendable_coin__returns_none_for_empty_account() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::new(ledger.clone(), ledger.fund_new_account(&[]));
        let mut gateway = gateway(wallet, ledger);
        gateway.connect().await.unwrap();

        // when
        let coin = gateway.select_spendable_coin().await;

        // then
        assert!(coin.is_none());
    }

    #[tokio::test]
    async fn sign_and_submit__refuses_when_disconnected() {
        // given
        let ledger = FakeLedger::new();
        let wallet = FakeWallet::new(ledger.clone(), ledger.fund_new_account(&[100]));
        let gateway = gateway(wallet, ledger.clone());

        // when
        let result = gateway.sign_and_submit(&TransactionIntent::new()).await;

        // then
        assert_eq!(result, Err(ChainError::WalletNotConnected));
        assert!(ledger.submitted().is_empty());
    }
}
