use cat_siege_core::{
    Command, EnemyKind, EntityHandle, EntityKind, Event, Overlap, PlayerSlot, SessionPhase,
    Viewport,
};
use cat_siege_world::{self as world, query, World, WorldConfig};
use glam::Vec2;

fn running_world() -> World {
    let mut world = World::new(WorldConfig::classic(Viewport::new(800.0, 600.0)));
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    world
}

fn spawn(world: &mut World, kind: EnemyKind, position: Vec2) -> EntityHandle {
    let mut events = Vec::new();
    world::apply(world, Command::SpawnEnemy { kind, position }, &mut events);
    match events.as_slice() {
        [Event::EnemySpawned { handle, .. }] => *handle,
        other => panic!("unexpected events: {other:?}"),
    }
}

fn fire(world: &mut World, target: Vec2) -> EntityHandle {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::FireProjectile {
            player: PlayerSlot::new(0),
            target,
        },
        &mut events,
    );
    match events.as_slice() {
        [Event::ProjectileFired { handle, .. }] => *handle,
        other => panic!("unexpected events: {other:?}"),
    }
}

#[test]
fn projectile_kill_scores_and_counts() {
    let mut world = running_world();
    let enemy = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 300.0));
    let projectile = fire(&mut world, Vec2::new(-30.0, 300.0));
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::ResolveOverlap {
            overlap: Overlap::ProjectileEnemy { projectile, enemy },
        },
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::ScoreChanged { score: 1 },
            Event::EntityHit {
                kind: EntityKind::Regular
            },
            Event::EntityDied {
                kind: EntityKind::Regular
            },
            Event::KillRecorded {
                kind: EnemyKind::Regular,
                total: 1
            },
        ]
    );
    assert!(query::entity(&world, enemy).is_none());
    assert!(query::projectiles(&world).is_empty());
}

#[test]
fn spent_projectile_deals_no_further_damage() {
    let mut world = running_world();
    let first = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 300.0));
    let second = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 200.0));
    let projectile = fire(&mut world, Vec2::new(-30.0, 300.0));
    let mut events = Vec::new();

    for enemy in [first, second] {
        world::apply(
            &mut world,
            Command::ResolveOverlap {
                overlap: Overlap::ProjectileEnemy { projectile, enemy },
            },
            &mut events,
        );
    }

    assert_eq!(query::session(&world).score, 1);
    assert!(query::entity(&world, second).is_some());
}

#[test]
fn mismatched_pairs_are_ignored() {
    let mut world = running_world();
    let enemy = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 300.0));
    let projectile = fire(&mut world, Vec2::new(-30.0, 300.0));
    let mut events = Vec::new();

    world::apply(
        &mut world,
        Command::ResolveOverlap {
            overlap: Overlap::ProjectileEnemy {
                projectile: enemy,
                enemy: projectile,
            },
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert!(query::entity(&world, enemy).is_some());
    assert!(query::entity(&world, projectile).is_some());
}

#[test]
fn repeated_contact_ends_the_session_once() {
    let mut world = running_world();
    let enemy = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 300.0));
    let mut events = Vec::new();

    for _ in 0..3 {
        world::apply(
            &mut world,
            Command::ResolveOverlap {
                overlap: Overlap::EnemyPlayer {
                    enemy,
                    player: PlayerSlot::new(0),
                },
            },
            &mut events,
        );
    }

    let game_overs = events
        .iter()
        .filter(|event| matches!(event, Event::GameOver { .. }))
        .count();
    assert_eq!(game_overs, 1);
    assert!(events.contains(&Event::PlayerRemoved {
        slot: PlayerSlot::new(0)
    }));
    assert_eq!(query::session(&world).phase, SessionPhase::GameOver);
    assert!(query::players(&world).is_empty());
    assert!(query::entity(&world, enemy).is_some());
}

#[test]
fn start_after_game_over_resets_the_run() {
    let mut world = running_world();
    let enemy = spawn(&mut world, EnemyKind::Regular, Vec2::new(-30.0, 300.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveOverlap {
            overlap: Overlap::EnemyPlayer {
                enemy,
                player: PlayerSlot::new(0),
            },
        },
        &mut events,
    );
    events.clear();

    world::apply(&mut world, Command::StartSession, &mut events);

    assert_eq!(events.first(), Some(&Event::SessionReset));
    assert_eq!(events.last(), Some(&Event::SessionStarted));
    assert_eq!(query::session(&world).phase, SessionPhase::Running);
    assert_eq!(query::players(&world).len(), 1);
    assert!(query::enemies(&world).is_empty());
}
