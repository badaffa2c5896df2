//! End-to-end gateway tests over a real WebSocket connection

use std::sync::Arc;

use anyhow::Result;
use integration_tests::{FakeStore, TestGateway};
use parley_core::{RoomKey, Snowflake};
use parley_gateway::protocol::ClientFrame;
use serde_json::json;

/// A store with guild 10 containing alice (1) and bob (2), and a public
/// channel 100
fn seeded_store() -> Arc<FakeStore> {
    let store = Arc::new(FakeStore::new());
    store.add_user(1, "alice");
    store.add_user(2, "bob");
    store.add_membership(10, 1);
    store.add_membership(10, 2);
    store.add_public_channel(100, 10, "general");
    store
}

#[tokio::test]
async fn test_handshake_rejected_without_token() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;
    assert!(gateway.connect_unauthenticated().await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_handshake_rejected_with_bad_token() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;
    assert!(gateway.connect_raw("not-a-real-token").await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_handshake_rejected_for_unknown_user() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;
    let token = gateway.tokens.issue(Snowflake::new(999))?;
    assert!(gateway.connect_raw(&token).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_connect_persists_online_and_notifies_guild() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;

    let mut bob = gateway.connect(2).await?;
    let mut alice = gateway.connect(1).await?;

    // Bob is auto-joined to guild 10's room and sees alice come online
    bob.expect_event_matching("toggle_online", &json!("1")).await?;

    // Alice sees herself come online too; she is in the guild room as well
    alice.expect_event_matching("toggle_online", &json!("1")).await?;

    assert!(gateway.store.online_log().contains(&(1, true)));
    Ok(())
}

#[tokio::test]
async fn test_disconnect_sets_offline_and_notifies_guild() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;

    let mut bob = gateway.connect(2).await?;
    let alice = gateway.connect(1).await?;
    bob.expect_event_matching("toggle_online", &json!("1")).await?;

    alice.close().await?;

    let ev = bob.expect_event("toggle_offline").await?;
    assert_eq!(ev.d, json!("1"));
    assert!(gateway.store.online_log().contains(&(1, false)));
    Ok(())
}

#[tokio::test]
async fn test_typing_and_message_end_to_end() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;

    let mut alice = gateway.connect(1).await?;
    let mut bob = gateway.connect(2).await?;
    alice.expect_event("toggle_online").await?;

    let join = ClientFrame::JoinChannel {
        channel_id: Snowflake::new(100),
    };
    alice.send(&join).await?;
    bob.send(&join).await?;

    // Joins produce no reply; heartbeat acks prove both were processed
    alice.send(&ClientFrame::Heartbeat).await?;
    bob.send(&ClientFrame::Heartbeat).await?;
    alice.expect_event("heartbeat_ack").await?;
    bob.expect_event("heartbeat_ack").await?;

    // Alice types: bob hears it, alice does not get her own echo
    alice
        .send(&ClientFrame::StartTyping {
            room: RoomKey::Channel(Snowflake::new(100)),
        })
        .await?;
    let ev = bob.expect_event("addToTyping").await?;
    assert_eq!(ev.d, json!("alice"));
    alice.expect_silence().await?;

    // A domain service announces a new message: both receive the payload
    let message = json!({"id": "m1", "text": "hi"});
    gateway
        .state
        .handle()
        .message_created(Snowflake::new(100), Snowflake::new(10), &message)
        .await;

    let ev = alice.expect_event("new_message").await?;
    assert_eq!(ev.d, message);
    let ev = bob.expect_event("new_message").await?;
    assert_eq!(ev.d, message);

    // The guild room gets the sidebar nudge
    let ev = bob.expect_event("push_to_top").await?;
    assert_eq!(ev.d, json!("100"));
    Ok(())
}

#[tokio::test]
async fn test_outsider_cannot_join_or_type_in_channel() -> Result<()> {
    let store = seeded_store();
    store.add_user(3, "mallory");
    let gateway = TestGateway::start(store).await?;

    let mut bob = gateway.connect(2).await?;
    let mut mallory = gateway.connect(3).await?;

    bob.send(&ClientFrame::JoinChannel {
        channel_id: Snowflake::new(100),
    })
    .await?;
    bob.send(&ClientFrame::Heartbeat).await?;
    bob.expect_event("heartbeat_ack").await?;

    // Mallory is not a guild member: her join is silently dropped
    mallory
        .send(&ClientFrame::JoinChannel {
            channel_id: Snowflake::new(100),
        })
        .await?;
    mallory
        .send(&ClientFrame::StartTyping {
            room: RoomKey::Channel(Snowflake::new(100)),
        })
        .await?;

    mallory.expect_silence().await?;
    bob.expect_silence().await?;
    Ok(())
}

#[tokio::test]
async fn test_private_channel_requires_explicit_membership() -> Result<()> {
    let store = seeded_store();
    store.add_private_channel(200, 10, &[1]);
    let gateway = TestGateway::start(store).await?;

    let mut alice = gateway.connect(1).await?;
    let mut bob = gateway.connect(2).await?;
    bob.expect_event_matching("toggle_online", &json!("2")).await?;

    let join = ClientFrame::JoinChannel {
        channel_id: Snowflake::new(200),
    };
    alice.send(&join).await?;
    bob.send(&join).await?;
    alice.send(&ClientFrame::Heartbeat).await?;
    alice.expect_event("heartbeat_ack").await?;

    alice
        .send(&ClientFrame::StartTyping {
            room: RoomKey::Channel(Snowflake::new(200)),
        })
        .await?;

    // Bob is a guild member but not a channel member: he hears nothing
    bob.expect_silence().await?;
    Ok(())
}

#[tokio::test]
async fn test_voice_join_signal_and_disconnect_cleanup() -> Result<()> {
    let store = seeded_store();
    store.add_user(3, "carol");
    store.add_membership(10, 3);
    let gateway = TestGateway::start(store).await?;

    let mut alice = gateway.connect(1).await?;
    let mut bob = gateway.connect(2).await?;
    let mut carol = gateway.connect(3).await?;

    let join_voice = ClientFrame::JoinVoice {
        guild_id: Snowflake::new(10),
    };
    alice.send(&join_voice).await?;
    let ev = alice.expect_event("joinVoice").await?;
    assert_eq!(ev.d["clients"], json!(["1"]));

    bob.send(&join_voice).await?;
    let ev = bob.expect_event("joinVoice").await?;
    assert_eq!(ev.d["clients"], json!(["1", "2"]));
    assert_eq!(ev.d["userId"], "2");
    alice.expect_event("joinVoice").await?;

    carol.send(&join_voice).await?;
    carol.expect_event("joinVoice").await?;
    alice.expect_event("joinVoice").await?;
    bob.expect_event("joinVoice").await?;

    // Alice signals bob: only bob receives it
    let sdp = json!({"type": "offer", "sdp": "v=0"});
    alice
        .send(&ClientFrame::VoiceSignal {
            guild_id: Snowflake::new(10),
            target_user_id: Snowflake::new(2),
            payload: sdp.clone(),
        })
        .await?;
    let ev = bob.expect_event("voice-signal").await?;
    assert_eq!(ev.d, sdp);
    carol.expect_silence().await?;

    // Alice's connection drops: the roster is reaped and announced
    alice.close().await?;
    let ev = bob.expect_event("leaveVoice").await?;
    assert_eq!(ev.d["userId"], "1");
    assert_eq!(ev.d["clients"], json!(["2", "3"]));
    Ok(())
}

#[tokio::test]
async fn test_malformed_frames_do_not_kill_the_connection() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;
    let mut alice = gateway.connect(1).await?;

    alice.send_raw("not json at all").await?;
    alice.send_raw(r#"{"op":"no_such_frame"}"#).await?;
    alice.send_raw(r#"{"op":"join_channel","d":{}}"#).await?;

    // Connection still answers heartbeats
    alice.send(&ClientFrame::Heartbeat).await?;
    alice.expect_event("heartbeat_ack").await?;
    Ok(())
}

#[tokio::test]
async fn test_second_connection_keeps_user_online() -> Result<()> {
    let gateway = TestGateway::start(seeded_store()).await?;

    let mut bob = gateway.connect(2).await?;
    let _alice_tab1 = gateway.connect(1).await?;
    let alice_tab2 = gateway.connect(1).await?;
    bob.expect_event_matching("toggle_online", &json!("1")).await?;
    bob.expect_event_matching("toggle_online", &json!("1")).await?;

    // One of alice's two tabs closes: she is still online
    alice_tab2.close().await?;
    bob.expect_silence().await?;
    Ok(())
}
