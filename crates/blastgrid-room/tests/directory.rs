//! Matchmaking and routing through the room directory.

mod common;

use std::time::Duration;

use blastgrid_protocol::{ClientMessage, PlayerId, RoomId};
use blastgrid_room::{LobbyPlayer, RoomConfig, RoomDirectory, RoomStatus, ServerMessage};
use common::{connect, is_game_over, is_start, join};

fn directory() -> RoomDirectory {
    RoomDirectory::new(RoomConfig {
        rng_seed: Some(11),
        ..RoomConfig::default()
    })
}

#[tokio::test(start_paused = true)]
async fn test_first_join_creates_a_room() {
    let mut dir = directory();
    let a = connect(&mut dir, 1);
    assert_eq!(dir.room_count(), 0);

    join(&mut dir, &a, "ada").await;

    assert_eq!(dir.room_count(), 1);
    assert_eq!(dir.room_of(a.conn), Some(RoomId(1)));
    let info = dir.room_info(RoomId(1)).await.unwrap();
    assert_eq!(info.player_count, 1);
    assert_eq!(info.max_players, 4);
}

#[tokio::test(start_paused = true)]
async fn test_fifth_player_gets_a_new_room() {
    let mut dir = directory();
    let mut clients = Vec::new();
    for i in 1..=5 {
        let client = connect(&mut dir, i);
        join(&mut dir, &client, &format!("p{i}")).await;
        clients.push(client);
    }

    for client in &clients[..4] {
        assert_eq!(dir.room_of(client.conn), Some(RoomId(1)));
    }
    assert_eq!(dir.room_of(clients[4].conn), Some(RoomId(2)));
    assert_eq!(dir.room_ids(), vec![RoomId(1), RoomId(2)]);

    // Player ids are per room.
    let last = &mut clients[4];
    match last.next().await {
        ServerMessage::UpdateLobbyState { players, .. } => {
            assert_eq!(
                players,
                vec![LobbyPlayer {
                    id: PlayerId(1),
                    nickname: "p5".into()
                }]
            );
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_join_skips_rooms_past_the_lobby() {
    let mut dir = directory();
    let mut a = connect(&mut dir, 1);
    let b = connect(&mut dir, 2);
    join(&mut dir, &a, "ada").await;
    join(&mut dir, &b, "bob").await;
    a.until(is_start).await;

    let c = connect(&mut dir, 3);
    join(&mut dir, &c, "cy").await;

    assert_eq!(dir.room_of(c.conn), Some(RoomId(2)));
    let info = dir.room_info(RoomId(1)).await.unwrap();
    assert_eq!(info.status, RoomStatus::InProgress);
    assert_eq!(info.player_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_second_join_is_refused_to_requester_only() {
    let mut dir = directory();
    let mut a = connect(&mut dir, 1);
    let mut b = connect(&mut dir, 2);
    join(&mut dir, &a, "ada").await;
    join(&mut dir, &b, "bob").await;
    a.clear();
    b.clear();

    join(&mut dir, &a, "ada again").await;

    match a.next().await {
        ServerMessage::Error { reason } => assert!(reason.contains("already in room")),
        other => panic!("expected ERROR, got {other:?}"),
    }
    assert_eq!(b.next_within(Duration::from_secs(1)).await, None);
    assert_eq!(dir.room_info(RoomId(1)).await.unwrap().player_count, 2);
}

#[tokio::test(start_paused = true)]
async fn test_rejoin_after_match_lands_in_fresh_room() {
    let mut dir = directory();
    let mut a = connect(&mut dir, 1);
    let b = connect(&mut dir, 2);
    join(&mut dir, &a, "ada").await;
    join(&mut dir, &b, "bob").await;
    a.until(is_start).await;
    dir.close(b.conn).await;
    a.until(is_game_over).await;

    join(&mut dir, &a, "ada").await;

    // The finished room emptied out and was dropped.
    assert_eq!(dir.room_ids(), vec![RoomId(2)]);
    assert_eq!(dir.room_of(a.conn), Some(RoomId(2)));
    match a.next().await {
        ServerMessage::UpdateLobbyState { status, players, .. } => {
            assert_eq!(status, RoomStatus::Waiting);
            assert_eq!(players.len(), 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_message_without_room_is_dropped() {
    let mut dir = directory();
    let mut a = connect(&mut dir, 1);

    dir.dispatch(a.conn, ClientMessage::PlaceBomb).await;
    dir.dispatch(
        a.conn,
        ClientMessage::SendChatMessage {
            message: "hello?".into(),
        },
    )
    .await;

    assert_eq!(a.next_within(Duration::from_secs(5)).await, None);
    assert_eq!(dir.room_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_last_close_destroys_room() {
    let mut dir = directory();
    let a = connect(&mut dir, 1);
    let b = connect(&mut dir, 2);
    join(&mut dir, &a, "ada").await;
    join(&mut dir, &b, "bob").await;

    dir.close(a.conn).await;
    assert_eq!(dir.room_count(), 1);
    assert_eq!(dir.room_of(a.conn), None);

    dir.close(b.conn).await;
    assert_eq!(dir.room_count(), 0);
    assert!(dir.room_info(RoomId(1)).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_close_unknown_connection_is_noop() {
    let mut dir = directory();
    let a = connect(&mut dir, 1);
    join(&mut dir, &a, "ada").await;

    dir.close(blastgrid_transport::ConnectionId::new(99)).await;
    dir.close(a.conn).await;
    dir.close(a.conn).await;
    assert_eq!(dir.room_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_freed_seat_is_reused() {
    let mut dir = directory();
    let a = connect(&mut dir, 1);
    let b = connect(&mut dir, 2);
    let c = connect(&mut dir, 3);
    join(&mut dir, &a, "ada").await;
    join(&mut dir, &b, "bob").await;
    dir.close(b.conn).await;

    join(&mut dir, &c, "cy").await;

    assert_eq!(dir.room_of(c.conn), Some(RoomId(1)));
    assert_eq!(dir.room_count(), 1);
    assert_eq!(dir.room_info(RoomId(1)).await.unwrap().player_count, 2);
}
