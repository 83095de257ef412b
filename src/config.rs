use crate::{
    error::{
        ChainError,
        Result,
    },
    types::ObjectId,
};
use std::{
    fmt,
    time::Duration,
};
use url::Url;

pub const DEFAULT_TESTNET_RPC_URL: &str = "https://fullnode.testnet.sui.io:443";
pub const DEFAULT_DEVNET_RPC_URL: &str = "https://fullnode.devnet.sui.io:443";
pub const DEFAULT_LOCAL_RPC_URL: &str = "http://127.0.0.1:9000";
pub const DEFAULT_DEV_GAME_SERVER_URL: &str = "http://localhost:3000";
pub const DEFAULT_PROD_GAME_SERVER_URL: &str = "https://sui-game-production.up.railway.app";
pub const DEFAULT_PACKAGE_ID: &str =
    "0x6994f20653f263d5bc01180e460e0e18ae2b6ecd7777dd86c205c62abea71b09";
pub const DEFAULT_BASE_PATH: &str = "/sui-battle-arena/";
const DEFAULT_BALANCE_POLL_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetworkTarget {
    Testnet { url: String },
    Devnet { url: String },
    LocalNode { url: String },
}

impl NetworkTarget {
    /// Resolves a network name, with an optional RPC override.
    pub fn from_name(name: &str, custom_url: Option<&str>) -> Result<Self> {
        let url = |default: &'static str| custom_url.unwrap_or(default).to_string();
        match name.trim().to_lowercase().as_str() {
            "testnet" => Ok(NetworkTarget::Testnet {
                url: url(DEFAULT_TESTNET_RPC_URL),
            }),
            "devnet" => Ok(NetworkTarget::Devnet {
                url: url(DEFAULT_DEVNET_RPC_URL),
            }),
            "local" | "localnet" => Ok(NetworkTarget::LocalNode {
                url: url(DEFAULT_LOCAL_RPC_URL),
            }),
            other => Err(ChainError::InvalidInput(format!(
                "unknown network '{other}', expected testnet, devnet or local"
            ))),
        }
    }

    pub fn rpc_url(&self) -> &str {
        match self {
            NetworkTarget::Testnet { url }
            | NetworkTarget::Devnet { url }
            | NetworkTarget::LocalNode { url } => url,
        }
    }
}

impl fmt::Display for NetworkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkTarget::Testnet { .. } => "Testnet",
            NetworkTarget::Devnet { .. } => "Devnet",
            NetworkTarget::LocalNode { .. } => "Local",
        };
        write!(f, "{name}")
    }
}

/// Which experience the embedded game server renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    Play,
    Betting,
}

impl GameMode {
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Play => "play",
            GameMode::Betting => "betting",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ArenaConfig {
    pub network: NetworkTarget,
    pub package_id: ObjectId,
    pub market_package_id: ObjectId,
    pub game_server_url: Url,
    pub base_path: String,
    pub balance_poll_interval: Duration,
}

impl ArenaConfig {
    /// Builds the configuration from values baked in at compile time.
    pub fn from_build_env() -> Result<Self> {
        let default_server = if cfg!(debug_assertions) {
            DEFAULT_DEV_GAME_SERVER_URL
        } else {
            DEFAULT_PROD_GAME_SERVER_URL
        };
        Self::from_values(
            option_env!("ARENA_NETWORK").unwrap_or("testnet"),
            option_env!("ARENA_RPC_URL"),
            option_env!("ARENA_PACKAGE_ID").unwrap_or(DEFAULT_PACKAGE_ID),
            option_env!("ARENA_MARKET_PACKAGE_ID"),
            option_env!("ARENA_GAME_SERVER_URL").unwrap_or(default_server),
        )
    }

    pub fn from_values(
        network: &str,
        rpc_url: Option<&str>,
        package_id: &str,
        market_package_id: Option<&str>,
        game_server_url: &str,
    ) -> Result<Self> {
        let network = NetworkTarget::from_name(network, rpc_url)?;
        let package_id: ObjectId = package_id.parse()?;
        let market_package_id = match market_package_id {
            Some(raw) => raw.parse()?,
            None => package_id.clone(),
        };
        let game_server_url = Url::parse(game_server_url).map_err(|e| {
            ChainError::InvalidInput(format!("game server url '{game_server_url}': {e}"))
        })?;
        tracing::info!(
            %network,
            rpc = network.rpc_url(),
            %package_id,
            server = %game_server_url,
            "arena configuration loaded"
        );
        Ok(Self {
            network,
            package_id,
            market_package_id,
            game_server_url,
            base_path: DEFAULT_BASE_PATH.to_string(),
            balance_poll_interval: DEFAULT_BALANCE_POLL_INTERVAL,
        })
    }

    pub fn with_balance_poll_interval(mut self, interval: Duration) -> Self {
        self.balance_poll_interval = interval;
        self
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Origin the game iframe posts from; inbound messages are checked against it.
    pub fn game_origin(&self) -> url::Origin {
        self.game_server_url.origin()
    }

    pub fn game_url(&self, mode: GameMode) -> String {
        format!(
            "{}/?mode={}",
            self.game_server_url.as_str().trim_end_matches('/'),
            mode.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    #[test]
    fn from_values__defaults_market_package_to_betting_package() {
        // when
        let config = ArenaConfig::from_values(
            "devnet",
            None,
            DEFAULT_PACKAGE_ID,
            None,
            "http://localhost:3000",
        )
        .unwrap();

        // then
        assert_eq!(config.market_package_id, config.package_id);
        assert_eq!(config.network.rpc_url(), DEFAULT_DEVNET_RPC_URL);
        assert_eq!(config.balance_poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn from_values__rejects_unknown_network_and_bad_package() {
        assert!(
            ArenaConfig::from_values("mainnet", None, DEFAULT_PACKAGE_ID, None, "http://a")
                .is_err()
        );
        assert!(
            ArenaConfig::from_values("testnet", None, "6994", None, "http://a").is_err()
        );
        assert!(
            ArenaConfig::from_values("testnet", None, DEFAULT_PACKAGE_ID, None, "nope")
                .is_err()
        );
    }

    #[test]
    fn game_url__appends_mode_query() {
        let config = ArenaConfig::from_values(
            "local",
            Some("http://127.0.0.1:9123"),
            DEFAULT_PACKAGE_ID,
            None,
            "http://localhost:3000",
        )
        .unwrap();
        assert_eq!(config.game_url(GameMode::Play), "http://localhost:3000/?mode=play");
        assert_eq!(
            config.game_url(GameMode::Betting),
            "http://localhost:3000/?mode=betting"
        );
        assert_eq!(config.network.rpc_url(), "http://127.0.0.1:9123");
    }

    #[test]
    fn from_build_env__falls_back_to_defaults() {
        let config = ArenaConfig::from_build_env().unwrap();
        assert_eq!(config.base_path, DEFAULT_BASE_PATH);
    }
}
