//! Tagged JSON envelope exchanged with the embedded game iframe over
//! `postMessage`. Every inbound message is checked against the game server
//! origin before it is decoded.

use crate::types::{
    BackendRoomId,
    ParticipantId,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Value,
    json,
};
use tracing::{
    debug,
    warn,
};
use url::{
    Origin,
    Url,
};

const KNOWN_ACTIONS: [&str; 5] = [
    "select_spectate_room",
    "spectate_joined",
    "game_state_update",
    "game_ended",
    "back_to_home",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    #[serde(default)]
    pub players: Vec<Entity>,
    #[serde(default)]
    pub ai_agents: Vec<Entity>,
}

impl GameState {
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.players.iter().chain(self.ai_agents.iter())
    }
}

/// Messages the iframe sends to the page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InboundMessage {
    #[serde(rename_all = "camelCase")]
    SelectSpectateRoom { game_id: BackendRoomId },
    #[serde(rename_all = "camelCase")]
    SpectateJoined { game_id: BackendRoomId },
    #[serde(rename_all = "camelCase")]
    GameStateUpdate { game_state: GameState },
    #[serde(rename_all = "camelCase")]
    GameEnded {
        winner_id: ParticipantId,
        #[serde(default)]
        game_id: Option<BackendRoomId>,
    },
    BackToHome,
}

/// Messages the page sends to the iframe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Asks for the room list.
    Spectate,
    StartSpectating { game_id: BackendRoomId },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    ForeignOrigin(String),
    NotAnObject,
    UnknownAction(String),
    Malformed { action: String, detail: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Decoded {
    Message(InboundMessage),
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug)]
pub struct MessageBus {
    expected_origin: Origin,
}

impl MessageBus {
    pub fn new(expected_origin: Origin) -> Self {
        Self { expected_origin }
    }

    pub fn expected_origin(&self) -> &Origin {
        &self.expected_origin
    }

    /// Compares scheme, host and port only.
    pub fn is_trusted(&self, origin: &str) -> bool {
        Url::parse(origin)
            .map(|url| url.origin() == self.expected_origin)
            .unwrap_or(false)
    }

    pub fn decode(&self, origin: &str, raw: &str) -> Decoded {
        if !self.is_trusted(origin) {
            warn!(%origin, expected = %self.expected_origin.ascii_serialization(), "dropping message from foreign origin");
            return Decoded::Ignored(IgnoreReason::ForeignOrigin(origin.to_string()));
        }
        let value: Value = match serde_json::from_str(raw) {
            Ok(value @ Value::Object(_)) => value,
            _ => {
                debug!("ignoring non-object message");
                return Decoded::Ignored(IgnoreReason::NotAnObject);
            }
        };
        let Some(action) = value.get("action").and_then(Value::as_str) else {
            debug!("ignoring message without an action");
            return Decoded::Ignored(IgnoreReason::NotAnObject);
        };
        if !KNOWN_ACTIONS.contains(&action) {
            debug!(%action, "ignoring unrecognized action");
            return Decoded::Ignored(IgnoreReason::UnknownAction(action.to_string()));
        }
        let action = action.to_string();
        match serde_json::from_value::<InboundMessage>(value) {
            Ok(message) => Decoded::Message(message),
            Err(err) => {
                warn!(%action, %err, "ignoring malformed message");
                Decoded::Ignored(IgnoreReason::Malformed {
                    action,
                    detail: err.to_string(),
                })
            }
        }
    }

    pub fn encode(message: &OutboundMessage) -> String {
        let envelope = match message {
            OutboundMessage::Spectate => json!({ "action": "spectate" }),
            OutboundMessage::StartSpectating { game_id } => {
                json!({ "action": "start_spectating", "gameId": game_id.as_str() })
            }
        };
        envelope.to_string()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;

    const GAME_ORIGIN: &str = "http://localhost:3000";

    fn bus() -> MessageBus {
        MessageBus::new(Url::parse(GAME_ORIGIN).unwrap().origin())
    }

    #[test]
    fn decode__accepts_select_room_with_numeric_id() {
        // when
        let decoded = bus().decode(
            GAME_ORIGIN,
            r#"{"action":"select_spectate_room","gameId":17}"#,
        );

        // then
        assert_eq!(
            decoded,
            Decoded::Message(InboundMessage::SelectSpectateRoom {
                game_id: BackendRoomId::new("17"),
            })
        );
    }

    #[test]
    fn decode__normalizes_trailing_slash_and_default_port() {
        let bus = MessageBus::new(Url::parse("https://arena.example").unwrap().origin());
        let raw = r#"{"action":"back_to_home"}"#;
        assert_eq!(
            bus.decode("https://arena.example:443/", raw),
            Decoded::Message(InboundMessage::BackToHome)
        );
    }

    #[test]
    fn decode__rejects_foreign_and_opaque_origins() {
        let raw = r#"{"action":"game_ended","winnerId":3}"#;
        assert!(matches!(
            bus().decode("http://evil.example", raw),
            Decoded::Ignored(IgnoreReason::ForeignOrigin(_))
        ));
        assert!(matches!(
            bus().decode("http://localhost:3001", raw),
            Decoded::Ignored(IgnoreReason::ForeignOrigin(_))
        ));
        assert!(matches!(
            bus().decode("null", raw),
            Decoded::Ignored(IgnoreReason::ForeignOrigin(_))
        ));
    }

    #[test]
    fn decode__ignores_unknown_action() {
        assert_eq!(
            bus().decode(GAME_ORIGIN, r#"{"action":"self_destruct"}"#),
            Decoded::Ignored(IgnoreReason::UnknownAction("self_destruct".into()))
        );
    }

    #[test]
    fn decode__ignores_out_of_range_winner() {
        let decoded = bus().decode(GAME_ORIGIN, r#"{"action":"game_ended","winnerId":9}"#);
        assert!(matches!(
            decoded,
            Decoded::Ignored(IgnoreReason::Malformed { action, .. }) if action == "game_ended"
        ));
    }

    #[test]
    fn decode__reads_game_state_update() {
        // given
        let raw = r##"{
            "action": "game_state_update",
            "gameState": {
                "players": [{"id": 1, "name": "ann", "color": "#f00", "score": 12}],
                "aiAgents": [{"id": 2, "name": "bot", "color": "#0f0", "score": 3.5}]
            }
        }"##;

        // when
        let decoded = bus().decode(GAME_ORIGIN, raw);

        // then
        let Decoded::Message(InboundMessage::GameStateUpdate { game_state }) = decoded else {
            panic!("expected a state update, got {decoded:?}");
        };
        assert_eq!(game_state.entities().count(), 2);
        assert_eq!(game_state.ai_agents[0].score, 3.5);
    }

    #[test]
    fn encode__uses_camel_case_envelope() {
        let encoded = MessageBus::encode(&OutboundMessage::StartSpectating {
            game_id: BackendRoomId::new("room-1"),
        });
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!({ "action": "start_spectating", "gameId": "room-1" }));
        assert_eq!(
            MessageBus::encode(&OutboundMessage::Spectate),
            r#"{"action":"spectate"}"#
        );
    }
}
