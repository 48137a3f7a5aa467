//! Session-level behavior of the runtime: floor transitions, move
//! validation, instance lifetime and broadcasts.
use game_core::{
    AttackKind, AttackRequest, DungeonSnapshot, InstanceError, MoveOutcome, PlayerId,
    PlayerProfile, Tile, Vec2,
};
use runtime::{
    DungeonEvent, DungeonHandle, Event, Runtime, RuntimeConfig, RuntimeError, SessionEvent, Topic,
};

fn start(seed: u64) -> Runtime {
    Runtime::start(RuntimeConfig::default().with_tick_rate(0).with_seed(seed))
}

async fn connected(handle: &DungeonHandle, name: &str) -> PlayerId {
    let player = PlayerId::new(name);
    handle
        .connect(player.clone(), PlayerProfile::default())
        .await
        .unwrap();
    player
}

fn tackle() -> AttackRequest {
    AttackRequest {
        move_name: "tackle".into(),
        kind: AttackKind::Direct,
        damage: 10,
        range: 60.0,
    }
}

/// Top-left of a 2x2 floor block, offset so the player box stays inside it.
fn open_position(snapshot: &DungeonSnapshot) -> Vec2 {
    let tiles = &snapshot.tiles;
    let size = snapshot.tile_size as f32;
    for y in 0..tiles.len().saturating_sub(1) {
        for x in 0..tiles[y].len().saturating_sub(1) {
            let open = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)]
                .iter()
                .all(|&(cx, cy)| tiles[cy][cx] == Tile::Floor);
            if open {
                return Vec2::new(x as f32 * size + 10.0, y as f32 * size + 10.0);
            }
        }
    }
    panic!("generated floor has no 2x2 open area");
}

#[tokio::test]
async fn attack_on_previous_floor_is_rejected_after_next_floor() {
    let runtime = start(7);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;

    let first = handle.enter_dungeon(&alice, 1).await.unwrap();
    let second = handle.next_floor(&alice).await.unwrap();
    assert_eq!(second.floor, 2);
    assert_ne!(first.instance_id, second.instance_id);

    let err = handle
        .attack(&alice, first.instance_id, tackle())
        .await
        .unwrap_err();
    match &err {
        RuntimeError::StaleInstance {
            requested, bound, ..
        } => {
            assert_eq!(*requested, first.instance_id);
            assert_eq!(*bound, Some(second.instance_id));
        }
        other => panic!("expected stale instance, got {other:?}"),
    }
    assert!(err.is_recoverable());

    handle
        .attack(&alice, second.instance_id, tackle())
        .await
        .unwrap();

    // the first floor lost its only player
    assert_eq!(handle.instance_count().await, 1);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn enter_dungeon_places_player_on_walkable_spawn() {
    let runtime = start(11);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;

    let entered = handle.enter_dungeon(&alice, 1).await.unwrap();
    let snapshot = &entered.snapshot;
    let tile_size = snapshot.tile_size as f32;
    let (tx, ty) = (
        (entered.spawn.x / tile_size) as usize,
        (entered.spawn.y / tile_size) as usize,
    );

    assert_eq!(snapshot.instance_id, entered.instance_id);
    assert_eq!(snapshot.tiles[ty][tx], Tile::Floor);
    assert!(snapshot.explored[ty][tx]);
    assert_eq!(handle.binding(&alice).await, Some(entered.instance_id));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn rejected_move_reverts_and_accepted_move_is_broadcast() {
    let runtime = start(3);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let entered = handle.enter_dungeon(&alice, 1).await.unwrap();
    let mut session = handle.subscribe(Topic::Session);

    let outcome = handle
        .player_move(&alice, -400.0, -400.0, -1.0, 0.0)
        .await
        .unwrap();
    assert_eq!(
        outcome,
        MoveOutcome::Rejected {
            authoritative: entered.spawn
        }
    );

    let target = open_position(&entered.snapshot);
    let outcome = handle
        .player_move(&alice, target.x, target.y, 1.0, 0.0)
        .await
        .unwrap();
    assert!(matches!(outcome, MoveOutcome::Accepted { position, .. } if position == target));

    match session.recv().await.unwrap() {
        Event::Session(SessionEvent::PlayerMoved {
            player,
            instance,
            position,
            ..
        }) => {
            assert_eq!(player, alice);
            assert_eq!(instance, Some(entered.instance_id));
            assert_eq!(position, target);
        }
        other => panic!("unexpected event {other:?}"),
    }

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn hub_moves_are_accepted_without_validation() {
    let runtime = start(1);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;

    let outcome = handle
        .player_move(&alice, -5.0, 12345.0, 0.0, 1.0)
        .await
        .unwrap();

    assert!(matches!(outcome, MoveOutcome::Accepted { .. }));
    assert_eq!(
        handle.hub_position(&alice).await,
        Some(Vec2::new(-5.0, 12345.0))
    );
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn exit_returns_to_hub_and_releases_the_instance() {
    let runtime = start(5);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let entered = handle.enter_dungeon(&alice, 1).await.unwrap();

    let exit = handle.exit_dungeon(&alice).await.unwrap();

    assert_eq!(exit.hub_spawn, Vec2::new(500.0, 500.0));
    assert_eq!(handle.binding(&alice).await, None);
    assert_eq!(handle.instance_count().await, 0);
    assert!(matches!(
        handle.attack(&alice, entered.instance_id, tackle()).await,
        Err(RuntimeError::StaleInstance { bound: None, .. })
    ));
    assert!(matches!(
        handle.exit_dungeon(&alice).await,
        Err(RuntimeError::NotInDungeon(_))
    ));
    assert!(matches!(
        handle.next_floor(&alice).await,
        Err(RuntimeError::NotInDungeon(_))
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shared_instance_lives_until_its_last_player_leaves() {
    let runtime = start(9);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let bob = connected(&handle, "bob").await;

    let id = handle.create_dungeon(4).await.unwrap();
    let joined = handle.join_dungeon(&alice, id).await.unwrap();
    handle.join_dungeon(&bob, id).await.unwrap();
    assert_eq!(joined.floor, 4);
    assert_eq!(handle.players_in(id).await.map(|p| p.len()), Some(2));

    handle.exit_dungeon(&alice).await.unwrap();
    assert_eq!(handle.players_in(id).await, Some(vec![bob.clone()]));

    handle.disconnect(&bob).await.unwrap();
    assert_eq!(handle.players_in(id).await, None);
    assert_eq!(handle.instance_count().await, 0);
    assert!(matches!(
        handle.join_dungeon(&alice, id).await,
        Err(RuntimeError::UnknownInstance(missing)) if missing == id
    ));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn unjoined_instances_expire_after_the_unclaimed_ttl() {
    let runtime = Runtime::start(
        RuntimeConfig::default()
            .with_tick_rate(0)
            .with_seed(5)
            .with_unclaimed_ttl(2),
    );
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;

    for _ in 0..5 {
        handle.create_dungeon(1).await.unwrap();
    }
    let kept = handle.create_dungeon(2).await.unwrap();
    handle.join_dungeon(&alice, kept).await.unwrap();
    assert_eq!(handle.instance_count().await, 6);

    let mut dungeon = handle.subscribe(Topic::Dungeon);
    assert_eq!(handle.tick().await.unwrap(), 6);
    assert_eq!(handle.instance_count().await, 6);

    assert_eq!(handle.tick().await.unwrap(), 6);
    assert_eq!(handle.instance_count().await, 1);
    assert_eq!(handle.players_in(kept).await, Some(vec![alice.clone()]));

    let mut removed = 0;
    while let Ok(event) = dungeon.try_recv() {
        if let Event::Dungeon(DungeonEvent::InstanceRemoved { instance }) = event {
            assert_ne!(instance, kept);
            removed += 1;
        }
    }
    assert_eq!(removed, 5);

    for _ in 0..3 {
        handle.tick().await.unwrap();
    }
    assert_eq!(handle.binding(&alice).await, Some(kept));
    handle.exit_dungeon(&alice).await.unwrap();
    assert_eq!(handle.instance_count().await, 0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn out_of_range_profile_level_is_rejected_at_connect() {
    let runtime = start(17);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let entered = handle.enter_dungeon(&alice, 1).await.unwrap();

    let mallory = PlayerId::new("mallory");
    let profile = PlayerProfile {
        level: u32::MAX,
        ..PlayerProfile::default()
    };
    let err = handle.connect(mallory.clone(), profile).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Instance(InstanceError::InvalidLevel { level: u32::MAX, .. })
    ));
    assert!(err.is_recoverable());

    assert!(matches!(
        handle.join_dungeon(&mallory, entered.instance_id).await,
        Err(RuntimeError::UnknownPlayer(_))
    ));
    let snapshot = handle
        .dungeon_state(&alice, entered.instance_id)
        .await
        .unwrap();
    assert_eq!(snapshot.instance_id, entered.instance_id);
    assert_eq!(handle.tick().await.unwrap(), 1);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn tick_pushes_an_update_to_each_bound_player() {
    let runtime = start(21);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let bob = connected(&handle, "bob").await;
    let id = handle.create_dungeon(1).await.unwrap();
    handle.join_dungeon(&alice, id).await.unwrap();
    handle.join_dungeon(&bob, id).await.unwrap();

    let mut dungeon = handle.subscribe(Topic::Dungeon);
    assert_eq!(handle.tick().await.unwrap(), 1);

    let mut recipients = Vec::new();
    while let Ok(event) = dungeon.try_recv() {
        if let Event::Dungeon(DungeonEvent::Update { player, update }) = event {
            assert_eq!(update.instance_id, id);
            recipients.push(player);
        }
    }
    recipients.sort();
    assert_eq!(recipients, vec![alice, bob]);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn requests_from_unknown_players_are_rejected() {
    let runtime = start(2);
    let handle = runtime.handle();
    let ghost = PlayerId::new("ghost");

    let err = handle.enter_dungeon(&ghost, 1).await.unwrap_err();
    assert!(matches!(err, RuntimeError::UnknownPlayer(_)));
    assert!(err.is_recoverable());
    assert!(matches!(
        handle.player_move(&ghost, 0.0, 0.0, 0.0, 0.0).await,
        Err(RuntimeError::UnknownPlayer(_))
    ));
    assert!(matches!(
        handle.disconnect(&ghost).await,
        Err(RuntimeError::UnknownPlayer(_))
    ));
    assert_eq!(handle.instance_count().await, 0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn vitals_are_mirrored_only_inside_a_dungeon() {
    let runtime = start(4);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;

    assert!(matches!(
        handle.report_vitals(&alice, 10, 20).await,
        Err(RuntimeError::NotInDungeon(_))
    ));

    handle.enter_dungeon(&alice, 1).await.unwrap();
    let vitals = handle.report_vitals(&alice, 30, 20).await.unwrap();
    assert_eq!((vitals.current_hp, vitals.max_hp), (20, 20));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn same_seed_reproduces_the_same_floor() {
    let first = start(1234);
    let second = start(1234);
    let a = connected(&first.handle(), "alice").await;
    let b = connected(&second.handle(), "alice").await;

    let left = first.handle().enter_dungeon(&a, 3).await.unwrap();
    let right = second.handle().enter_dungeon(&b, 3).await.unwrap();

    assert_eq!(left.snapshot.tiles, right.snapshot.tiles);
    assert_eq!(left.snapshot.ladder, right.snapshot.ladder);
    assert_eq!(left.spawn, right.spawn);

    first.shutdown().await.unwrap();
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn payloads_serialize_with_snake_case_tags() {
    let runtime = start(8);
    let handle = runtime.handle();
    let alice = connected(&handle, "alice").await;
    let entered = handle.enter_dungeon(&alice, 1).await.unwrap();

    let json = serde_json::to_value(&entered).unwrap();
    assert_eq!(json["floor"], 1);
    assert!(json["spawn"]["x"].is_number());
    assert!(json["snapshot"]["tiles"].is_array());
    assert!(json["snapshot"]["explored"].is_array());

    let rejected = MoveOutcome::Rejected {
        authoritative: Vec2::new(1.0, 2.0),
    };
    let json = serde_json::to_value(&rejected).unwrap();
    assert_eq!(json["status"], "rejected");

    let event = Event::from(SessionEvent::LeftDungeon {
        player: alice,
        instance: entered.instance_id,
    });
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["topic"], "session");
    assert_eq!(json["event"]["type"], "left_dungeon");

    runtime.shutdown().await.unwrap();
}
