//! Protocol core of the arena front end: the `postMessage` contract with the
//! embedded game, the wallet gateway, the betting and marketplace contract
//! calls, and the page-level state machine that sequences them.

pub mod betting;
pub mod bus;
pub mod config;
pub mod contract;
pub mod error;
pub mod ledger;
pub mod marketplace;
pub mod orchestrator;
pub mod routes;
pub mod session;
pub mod types;
pub mod wallet;

pub mod test_helpers;

pub use error::{
    ChainError,
    Result,
};
pub use orchestrator::{
    Effect,
    Notice,
    Orchestrator,
};

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber honoring `RUST_LOG`, `info` otherwise.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
