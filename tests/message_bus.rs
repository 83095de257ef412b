#![allow(non_snake_case)]
use arena_client::{
    bus::{
        Decoded,
        IgnoreReason,
        MessageBus,
    },
    test_helpers::{
        GAME_ORIGIN,
        TestContext,
    },
};
use proptest::prelude::*;
use serde_json::{
    Map,
    Value,
    json,
};
use url::Url;

const KNOWN: [&str; 5] = [
    "select_spectate_room",
    "spectate_joined",
    "game_state_update",
    "game_ended",
    "back_to_home",
];

fn unknown_action() -> impl Strategy<Value = String> {
    "[a-z_]{0,24}".prop_filter("known action", |action| !KNOWN.contains(&action.as_str()))
}

fn payload() -> impl Strategy<Value = Vec<(String, Value)>> {
    let value = prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        Just(Value::Null),
    ];
    prop::collection::vec(
        (
            prop_oneof![
                Just("gameId".to_string()),
                Just("winnerId".to_string()),
                Just("gameState".to_string()),
                "[a-zA-Z]{1,8}",
            ],
            value,
        ),
        0..4,
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn handle__unknown_action_leaves_state_unchanged(
        action in unknown_action(),
        fields in payload(),
    ) {
        let mut envelope = Map::new();
        for (key, value) in fields {
            envelope.insert(key, value);
        }
        envelope.insert("action".into(), Value::String(action));
        let raw = Value::Object(envelope).to_string();

        runtime().block_on(async {
            // given
            let mut ctx = TestContext::connected_orchestrator().await;
            ctx.select_room("room-1").await;
            let session = ctx.orchestrator.session().clone();
            let scoreboard = ctx.orchestrator.scoreboard().cloned();
            let submitted = ctx.ledger.submitted().len();

            // when
            let effects = ctx.orchestrator.handle(GAME_ORIGIN, &raw).await;

            // then
            assert!(effects.is_empty());
            assert_eq!(ctx.orchestrator.session(), &session);
            assert_eq!(ctx.orchestrator.scoreboard().cloned(), scoreboard);
            assert_eq!(ctx.ledger.submitted().len(), submitted);
        });
    }

    #[test]
    fn decode__never_panics_on_arbitrary_input(raw in "\\PC{0,64}") {
        let bus = MessageBus::new(Url::parse(GAME_ORIGIN).unwrap().origin());
        let _ = bus.decode(GAME_ORIGIN, &raw);
    }
}

#[test]
fn decode__non_object_payloads_are_ignored() {
    let bus = MessageBus::new(Url::parse(GAME_ORIGIN).unwrap().origin());
    for raw in ["[]", "\"back_to_home\"", "42", "not json", r#"{"action":7}"#] {
        assert_eq!(
            bus.decode(GAME_ORIGIN, raw),
            Decoded::Ignored(IgnoreReason::NotAnObject),
            "{raw}"
        );
    }
}

#[tokio::test]
async fn handle__spectate_joined_changes_nothing() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;
    ctx.select_room("room-1").await;
    let before = ctx.orchestrator.session().clone();

    // when
    let effects = ctx
        .send(json!({ "action": "spectate_joined", "gameId": "room-1" }))
        .await;

    // then
    assert!(effects.is_empty());
    assert_eq!(ctx.orchestrator.session(), &before);
}

#[test]
fn request_room_list__posts_spectate() {
    // given
    let ctx = TestContext::disconnected_orchestrator();

    // when
    let effect = ctx.orchestrator.request_room_list();

    // then
    let arena_client::Effect::Post(message) = effect else {
        panic!("expected a post");
    };
    assert_eq!(MessageBus::encode(&message), r#"{"action":"spectate"}"#);
}
