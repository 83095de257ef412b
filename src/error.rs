use color_eyre::eyre::Report;
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = ChainError> = std::result::Result<T, E>;

/// Every failure a chain facing operation can surface to the page.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("no wallet extension is registered")]
    NoWalletFound,
    #[error("wallet is not connected")]
    WalletNotConnected,
    #[error("request was rejected in the wallet")]
    UserRejected,
    #[error("network error: {0}")]
    NetworkError(String),
    #[error("unexpected response shape: {0}")]
    DecodeError(String),
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("transaction succeeded but no created object id was reported")]
    ObjectIdNotFound,
    #[error("result belongs to a room selection that is no longer current")]
    StaleRoomSelection,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Failure kinds a wallet or ledger implementation can attach to its report so
/// the adapter boundary does not have to guess from the message text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    #[error("no wallet registered")]
    NoWallet,
    #[error("user rejected the request")]
    UserRejected,
    #[error("insufficient funds for transaction")]
    InsufficientFunds,
}

impl ChainError {
    pub fn classify(report: &Report) -> Self {
        for cause in report.chain() {
            if let Some(failure) = cause.downcast_ref::<ProviderFailure>() {
                return match failure {
                    ProviderFailure::NoWallet => ChainError::NoWalletFound,
                    ProviderFailure::UserRejected => ChainError::UserRejected,
                    ProviderFailure::InsufficientFunds => ChainError::InsufficientFunds,
                };
            }
        }
        let message = format!("{report:#}");
        let lowered = message.to_lowercase();
        let refused = lowered.contains("rejected") || lowered.contains("denied");
        let classified = if lowered.contains("insufficient") {
            ChainError::InsufficientFunds
        } else if refused && lowered.contains("user") {
            ChainError::UserRejected
        } else {
            ChainError::NetworkError(message)
        };
        debug!(?classified, "classified untyped provider report");
        classified
    }

    /// Maps the error string of a transaction that executed but failed.
    pub fn from_execution_failure(error: &str) -> Self {
        let lowered = error.to_lowercase();
        if lowered.contains("insufficient") {
            ChainError::InsufficientFunds
        } else {
            ChainError::NetworkError(format!("transaction failed on chain: {error}"))
        }
    }

    /// Text for the alert shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            ChainError::NoWalletFound => {
                "No Sui wallet found. Install a wallet extension and try again.".into()
            }
            ChainError::WalletNotConnected => "Connect your wallet first.".into(),
            ChainError::UserRejected => "The request was rejected in your wallet.".into(),
            ChainError::NetworkError(detail) => {
                format!("Network error, please try again later ({detail}).")
            }
            ChainError::DecodeError(detail) => {
                format!("Received an unexpected response from the chain ({detail}).")
            }
            ChainError::InsufficientFunds => {
                "Insufficient balance for this transaction.".into()
            }
            ChainError::ObjectIdNotFound => {
                "The game was created but its id could not be read. Please retry.".into()
            }
            ChainError::StaleRoomSelection => String::new(),
            ChainError::InvalidInput(detail) => detail.clone(),
        }
    }

    /// Stale results are an expected race outcome and are never surfaced.
    pub fn is_silent(&self) -> bool {
        matches!(self, ChainError::StaleRoomSelection)
    }
}
