#![allow(non_snake_case)]
use arena_client::{
    ChainError,
    Effect,
    Notice,
    orchestrator::NoticeLevel,
    session::Phase,
    test_helpers::TestContext,
};
use serde_json::json;

#[tokio::test]
async fn game_ended__settles_once_and_returns_to_idle() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;
    ctx.select_room("room-1").await;
    let game = ctx.orchestrator.session().chain_game().cloned().unwrap();

    // when
    let first = ctx
        .send(json!({ "action": "game_ended", "winnerId": 4, "gameId": "room-1" }))
        .await;
    let second = ctx
        .send(json!({ "action": "game_ended", "winnerId": 4, "gameId": "room-1" }))
        .await;

    // then
    assert!(matches!(
        first.as_slice(),
        [Effect::Notify(Notice { level: NoticeLevel::Info, .. })]
    ));
    assert!(second.is_empty());
    assert_eq!(ctx.ledger.submitted_calls("end_game"), 1);
    assert_eq!(ctx.ledger.winner_of(&game), Some(4));
    let session = ctx.orchestrator.session();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.chain_game(), None);
    assert_eq!(session.room(), None);
    assert!(session.was_settled(&game));
}

#[tokio::test]
async fn game_ended__failed_settlement_is_not_retried() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;
    ctx.select_room("room-1").await;
    ctx.wallet.reject_next_request();

    // when
    let first = ctx
        .send(json!({ "action": "game_ended", "winnerId": 2 }))
        .await;
    let second = ctx
        .send(json!({ "action": "game_ended", "winnerId": 2 }))
        .await;

    // then
    assert_eq!(
        first,
        vec![Effect::Notify(Notice::error(&ChainError::UserRejected))]
    );
    assert!(second.is_empty());
    assert_eq!(ctx.ledger.submitted_calls("end_game"), 0);
    assert_eq!(ctx.orchestrator.session().phase(), Phase::Idle);
    assert_eq!(ctx.orchestrator.session().chain_game(), None);
}

#[tokio::test]
async fn game_ended__without_chain_game_is_a_no_op() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;

    // when
    let effects = ctx
        .send(json!({ "action": "game_ended", "winnerId": 1 }))
        .await;

    // then
    assert!(effects.is_empty());
    assert!(ctx.ledger.submitted().is_empty());
}

#[tokio::test]
async fn game_ended__after_back_to_home_is_a_no_op() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;
    ctx.select_room("room-1").await;
    ctx.send(json!({ "action": "back_to_home" })).await;

    // when
    let effects = ctx
        .send(json!({ "action": "game_ended", "winnerId": 1 }))
        .await;

    // then
    assert!(effects.is_empty());
    assert_eq!(ctx.ledger.submitted_calls("end_game"), 0);
}

#[tokio::test]
async fn game_ended__chain_failure_still_clears_session() {
    // given
    let mut ctx = TestContext::connected_orchestrator().await;
    ctx.select_room("room-1").await;
    let game = ctx.orchestrator.session().chain_game().cloned().unwrap();
    ctx.orchestrator
        .contract()
        .end_game(
            ctx.orchestrator.gateway(),
            &game,
            arena_client::types::ParticipantId::new(1).unwrap(),
        )
        .await
        .unwrap();

    // when
    let effects = ctx
        .send(json!({ "action": "game_ended", "winnerId": 3 }))
        .await;

    // then
    assert!(matches!(
        effects.as_slice(),
        [Effect::Notify(Notice { level: NoticeLevel::Error, .. })]
    ));
    assert_eq!(ctx.orchestrator.session().phase(), Phase::Idle);
    assert_eq!(ctx.ledger.winner_of(&game), Some(1));
}
