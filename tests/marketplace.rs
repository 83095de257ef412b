#![allow(non_snake_case)]
use arena_client::{
    ChainError,
    ledger::MoveObject,
    marketplace::{
        AgentDraft,
        MINT_MIN_BALANCE_MIST,
    },
    test_helpers::{
        FakeWallet,
        TestContext,
    },
    wallet::WalletGateway,
};
use serde_json::json;
use std::time::Duration;

fn draft(title: &str) -> AgentDraft {
    AgentDraft {
        author: "ann".into(),
        title: title.into(),
        category: "hunter".into(),
        story: "grew up eating pellets".into(),
    }
}

#[tokio::test]
async fn mint_agent__shows_up_in_owned_agents() {
    // given
    let ctx = TestContext::connected().await;
    let market = ctx.agent_market();

    // when
    let minted = market
        .mint_agent(ctx.gateway(), &draft("Blob"))
        .await
        .unwrap();

    // then
    let owned = market.owned_agents(ctx.gateway()).await.unwrap();
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].id, minted);
    assert_eq!(owned[0].title, "Blob");
    assert_eq!(owned[0].owner, ctx.alice().as_str());
    assert_eq!(owned[0].price, None);
}

#[tokio::test]
async fn mint_agent__requires_connection_and_minimum_balance() {
    // given
    let disconnected = TestContext::disconnected();
    let poor = {
        let ctx = TestContext::disconnected();
        ctx.ledger().drain(&ctx.alice());
        ctx.ledger().credit(&ctx.alice(), MINT_MIN_BALANCE_MIST - 1);
        ctx.connect().await
    };

    // when
    let not_connected = disconnected
        .agent_market()
        .mint_agent(disconnected.gateway(), &draft("Blob"))
        .await;
    let too_poor = poor
        .agent_market()
        .mint_agent(poor.gateway(), &draft("Blob"))
        .await;

    // then
    assert_eq!(not_connected, Err(ChainError::WalletNotConnected));
    assert_eq!(too_poor, Err(ChainError::InsufficientFunds));
    assert!(poor.ledger().submitted().is_empty());
}

#[tokio::test]
async fn list_agent__moves_agent_into_kiosk_listing() {
    // given
    let ctx = TestContext::connected().await;
    let market = ctx.agent_market();
    let (kiosk, cap) = ctx.ledger().create_kiosk();
    let agent = market
        .mint_agent(ctx.gateway(), &draft("Blob"))
        .await
        .unwrap();

    // when
    market
        .list_agent(ctx.gateway(), &kiosk, &cap, &agent, 250_000_000)
        .await
        .unwrap();

    // then
    let listed = market.listed_agents(ctx.gateway(), &kiosk).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, agent);
    assert_eq!(listed[0].price, Some(250_000_000));
    assert_eq!(listed[0].owner, kiosk.to_string());
    assert!(market.owned_agents(ctx.gateway()).await.unwrap().is_empty());
}

#[tokio::test]
async fn purchase_agent__transfers_agent_to_buyer() {
    // given
    let seller = TestContext::connected().await;
    let market = seller.agent_market();
    let (kiosk, cap) = seller.ledger().create_kiosk();
    let agent = market
        .mint_agent(seller.gateway(), &draft("Blob"))
        .await
        .unwrap();
    market
        .list_agent(seller.gateway(), &kiosk, &cap, &agent, 250_000_000)
        .await
        .unwrap();
    let ledger = seller.ledger().clone();
    let bob = ledger.fund_new_account(&[500_000_000]);
    let mut buyer = WalletGateway::new(
        FakeWallet::new(ledger.clone(), bob.clone()),
        ledger.clone(),
        Duration::from_secs(10),
    );
    buyer.connect().await.unwrap();

    // when
    market
        .purchase_agent(&buyer, &kiosk, &agent, 250_000_000)
        .await
        .unwrap();

    // then
    assert_eq!(ledger.owner_of(&agent), Some(bob));
    assert!(market.listed_agents(&buyer, &kiosk).await.unwrap().is_empty());
    let owned = market.owned_agents(&buyer).await.unwrap();
    assert_eq!(owned.len(), 1);
}

#[tokio::test]
async fn purchase_agent__rejects_price_above_balance() {
    // given
    let ctx = TestContext::connected().await;
    let (kiosk, _cap) = ctx.ledger().create_kiosk();
    let agent = "0x77".parse().unwrap();
    let balance = ctx.gateway().balance_mist();

    // when
    let result = ctx
        .agent_market()
        .purchase_agent(ctx.gateway(), &kiosk, &agent, balance + 1)
        .await;

    // then
    assert_eq!(result, Err(ChainError::InsufficientFunds));
    assert!(ctx.ledger().submitted().is_empty());
}

#[tokio::test]
async fn owned_agents__skips_malformed_objects() {
    // given
    let ctx = TestContext::connected().await;
    let market = ctx.agent_market();
    market
        .mint_agent(ctx.gateway(), &draft("Blob"))
        .await
        .unwrap();
    ctx.ledger().insert_object(
        &ctx.alice(),
        MoveObject {
            object_id: "0x99".parse().unwrap(),
            type_: market.agent_type(),
            fields: json!({ "title": "missing everything else" }),
        },
    );

    // when
    let owned = market.owned_agents(ctx.gateway()).await.unwrap();

    // then
    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].title, "Blob");
}

#[tokio::test]
async fn listed_agents__surfaces_network_errors() {
    // given
    let ctx = TestContext::connected().await;
    let (kiosk, _cap) = ctx.ledger().create_kiosk();
    ctx.ledger().fail_network(true);

    // when
    let result = ctx
        .agent_market()
        .listed_agents(ctx.gateway(), &kiosk)
        .await;

    // then
    assert!(matches!(result, Err(ChainError::NetworkError(_))));
}
