use std::fmt;

/// Client-side pages of the arena front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Game,
    Betting,
    Marketplace,
    NotFound,
}

impl Route {
    /// Resolves a location path, with or without the deployment base path.
    pub fn parse(path: &str, base_path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let base = base_path.trim_end_matches('/');
        let relative = if base.is_empty() {
            path
        } else {
            match path.strip_prefix(base) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => path,
            }
        };
        match relative.trim_end_matches('/') {
            "" => Route::Home,
            "/game" => Route::Game,
            "/betting" => Route::Betting,
            "/marketplace" => Route::Marketplace,
            _ => Route::NotFound,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Game => "/game",
            Route::Betting => "/betting",
            Route::Marketplace => "/marketplace",
            Route::NotFound => "/404",
        }
    }

    /// Absolute location under the deployment base path.
    pub fn href(self, base_path: &str) -> String {
        let base = base_path.trim_end_matches('/');
        match self {
            Route::Home => format!("{base}/"),
            other => format!("{base}{}", other.path()),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::config::DEFAULT_BASE_PATH;

    #[test]
    fn parse__strips_base_path_and_query() {
        assert_eq!(Route::parse("/sui-battle-arena/", DEFAULT_BASE_PATH), Route::Home);
        assert_eq!(Route::parse("/sui-battle-arena", DEFAULT_BASE_PATH), Route::Home);
        assert_eq!(
            Route::parse("/sui-battle-arena/betting?x=1", DEFAULT_BASE_PATH),
            Route::Betting
        );
        assert_eq!(Route::parse("/marketplace/", DEFAULT_BASE_PATH), Route::Marketplace);
        assert_eq!(Route::parse("/game", "/"), Route::Game);
    }

    #[test]
    fn parse__unknown_paths_are_not_found() {
        assert_eq!(Route::parse("/sui-battle-arena/admin", DEFAULT_BASE_PATH), Route::NotFound);
        assert_eq!(Route::parse("/sui-battle-arenas/game", DEFAULT_BASE_PATH), Route::NotFound);
    }

    #[test]
    fn href__prefixes_base_path() {
        assert_eq!(Route::Home.href(DEFAULT_BASE_PATH), "/sui-battle-arena/");
        assert_eq!(Route::Betting.href(DEFAULT_BASE_PATH), "/sui-battle-arena/betting");
        assert_eq!(Route::Game.href("/"), "/game");
    }
}
