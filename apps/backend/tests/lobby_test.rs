//! Lobby lifecycle, force-start pruning and host commands.

mod common;

use common::{
    game, harness, new_game, open_table, phase, seats, settle, started_table, wait_for_end,
    with_role,
};
use mafia_backend::domain::ids::{ChannelId, PlayerId};
use mafia_backend::domain::roles::{balance_for, Role};
use mafia_backend::domain::state::Phase;
use mafia_backend::transport::TransportOp;
use mafia_backend::{ErrorCode, ForceStartOutcome, GameLookup};

#[tokio::test(start_paused = true)]
async fn test_last_ready_starts_the_game_and_deals_roles() {
    let h = harness(None);
    let table = open_table(&h, 7, 0).await;
    assert_eq!(phase(&h, &table), Phase::Lobby);

    for player in &table.players[..6] {
        h.engine.mark_ready(table.lookup(), *player).await.unwrap();
    }
    assert_eq!(phase(&h, &table), Phase::Lobby);
    h.engine
        .mark_ready(table.lookup(), table.players[6])
        .await
        .unwrap();
    assert_eq!(phase(&h, &table), Phase::Night);
    settle().await;

    let mafia = with_role(&h, &table, Role::Mafia);
    assert_eq!(mafia.len(), 2);
    for player in &table.players {
        let dms = h.transport.dms(*player);
        assert!(dms.iter().any(|dm| dm.contains("your role is")), "{player}");
    }
    let teammate = common::name_of(&h, &table, mafia[1]);
    assert!(h
        .transport
        .dms(mafia[0])
        .iter()
        .any(|dm| dm.contains(&format!("Your fellow Mafia: {teammate}."))));

    // Secret channel for the mafia, public channel locked for the night.
    let created = h.transport.created_channels();
    assert_eq!(created.len(), 1);
    let (secret, members) = &created[0];
    let mut members = members.clone();
    members.sort();
    let mut expected = mafia.clone();
    expected.sort();
    assert_eq!(members, expected);
    assert!(h.transport.is_locked(table.channel));
    assert_eq!(
        h.engine
            .get_status(GameLookup::SecretChannel(*secret))
            .unwrap()
            .game_number,
        table.game_number
    );
}

#[tokio::test(start_paused = true)]
async fn test_ready_rejections() {
    let h = harness(None);
    let table = open_table(&h, 5, 0).await;
    let player = table.players[2];

    h.engine.mark_ready(table.lookup(), player).await.unwrap();
    let err = h.engine.mark_ready(table.lookup(), player).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::AlreadyReady);

    let err = h
        .engine
        .mark_ready(table.lookup(), PlayerId(5))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotInGame);
}

#[tokio::test(start_paused = true)]
async fn test_force_start_prunes_unready_humans() {
    let h = harness(None);
    let table = open_table(&h, 4, 2).await;
    let absent = table.players[3];
    for player in &table.players[..3] {
        h.engine.mark_ready(table.lookup(), *player).await.unwrap();
    }

    let outcome = h
        .engine
        .force_start(table.lookup(), table.host())
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ForceStartOutcome::Started {
            pruned: vec![absent]
        }
    );
    assert_eq!(phase(&h, &table), Phase::Night);

    // Balance is recomputed for the five who stayed.
    let state = game(&h, &table);
    let state = state.lock();
    assert_eq!(state.players.len(), 5);
    assert!(!state.players.contains_key(&absent));
    let balance = balance_for(5).unwrap();
    for role in [Role::Mafia, Role::Detective, Role::Doctor, Role::Civilian] {
        let count = state.players.values().filter(|p| p.role == role).count();
        assert_eq!(count, balance.count_of(role), "{role}");
    }
    drop(state);

    settle().await;
    assert!(h
        .transport
        .dms(absent)
        .iter()
        .any(|dm| dm.contains("started without you")));
    assert!(h.engine.get_status(GameLookup::Player(absent)).is_err());
}

#[tokio::test(start_paused = true)]
async fn test_force_start_cancels_a_thin_lobby() {
    let h = harness(None);
    let mut rx = h.engine.subscribe();
    let table = open_table(&h, 5, 0).await;
    for player in &table.players[..2] {
        h.engine.mark_ready(table.lookup(), *player).await.unwrap();
    }

    let err = h
        .engine
        .force_start(table.lookup(), table.players[1])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotHost);

    let outcome = h
        .engine
        .force_start(table.lookup(), table.host())
        .await
        .unwrap();
    assert_eq!(outcome, ForceStartOutcome::Cancelled { remaining: 2 });
    assert_eq!(wait_for_end(&mut rx, table.channel).await, None);
    assert!(h.engine.registry().get(table.channel).is_none());
    assert!(h
        .transport
        .messages(table.channel)
        .iter()
        .any(|m| m.contains("cancelled before it started")));
}

#[tokio::test(start_paused = true)]
async fn test_create_game_rejections() {
    let h = harness(None);

    for (humans, computers) in [(4, 0), (0, 9), (0, 0)] {
        let err = h
            .engine
            .create_game(new_game(seats(humans, computers)))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPlayerCount);
    }

    let mut participants = seats(5, 0);
    participants[4].id = participants[0].id;
    let err = h
        .engine
        .create_game(new_game(participants))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateParticipant);

    let first = new_game(seats(5, 0));
    let mut second = new_game(seats(5, 0));
    second.channel = first.channel;
    let number = h.engine.create_game(first).await.unwrap();
    let err = h.engine.create_game(second).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameAlreadyRunning);

    let later = h.engine.create_game(new_game(seats(5, 0))).await.unwrap();
    assert!(later > number);
}

#[tokio::test(start_paused = true)]
async fn test_game_survives_secret_channel_failure() {
    let h = harness(None);
    h.transport.fail(TransportOp::CreateChannel);
    let table = started_table(&h, 5).await;
    assert_eq!(phase(&h, &table), Phase::Night);
    assert_eq!(game(&h, &table).lock().secret_channel_id, None);
}

#[tokio::test(start_paused = true)]
async fn test_force_end_reveals_and_removes() {
    let h = harness(None);
    let mut rx = h.engine.subscribe();
    let table = started_table(&h, 6).await;
    let secret = game(&h, &table).lock().secret_channel_id.unwrap();

    let err = h
        .engine
        .force_end(table.lookup(), table.players[3])
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotHost);

    h.engine.force_end(table.lookup(), table.host()).await.unwrap();
    assert_eq!(wait_for_end(&mut rx, table.channel).await, None);
    settle().await;

    assert!(h.engine.registry().get(table.channel).is_none());
    assert!(h.transport.deleted_channels().contains(&secret));
    assert!(!h.transport.is_locked(table.channel));
    let reveal = h.transport.messages(table.channel).last().cloned().unwrap();
    assert!(reveal.contains("ended by the host"));
    assert!(reveal.contains("Roles:"));

    let err = h
        .engine
        .force_end(table.lookup(), table.host())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
}

#[tokio::test(start_paused = true)]
async fn test_status_lookups() {
    let h = harness(None);
    let table = started_table(&h, 5).await;

    let by_channel = h.engine.get_status(table.lookup()).unwrap();
    let by_player = h
        .engine
        .get_status(GameLookup::Player(table.players[4]))
        .unwrap();
    assert_eq!(by_channel, by_player);
    assert_eq!(by_channel.phase, Phase::Night);
    assert_eq!(by_channel.round, 1);
    assert_eq!(by_channel.alive.len(), 5);
    assert_eq!(by_channel.night_actions_received, 0);
    assert_eq!(by_channel.night_actions_required, 2);

    let err = h
        .engine
        .get_status(GameLookup::Channel(ChannelId(7)))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::GameNotFound);
    assert!(err.is_rejection());
}
