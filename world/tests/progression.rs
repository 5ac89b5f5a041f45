use std::time::Duration;

use cat_siege_core::{
    BossTier, Command, EnemyKind, EntityHandle, Event, Overlap, PlayerSlot, PoolKind,
    SessionPhase, StageDefinition, StageIndex, StageTable, TextureAtlas, Viewport,
    MAX_SCALE_STEPS,
};
use cat_siege_world::{self as world, query, World, WorldConfig};
use glam::Vec2;

const BOSS_POSITION: Vec2 = Vec2::new(400.0, 120.0);

fn running_world() -> World {
    running_world_with(WorldConfig::classic(Viewport::new(800.0, 600.0)))
}

fn running_world_with(config: WorldConfig) -> World {
    let mut world = World::new(config);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartSession, &mut events);
    world
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

fn touch(world: &mut World, enemy: EntityHandle, player: PlayerSlot) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::ResolveOverlap {
            overlap: Overlap::EnemyPlayer { enemy, player },
        },
        &mut events,
    );
}

fn spawn_regular(world: &mut World, position: Vec2) -> EntityHandle {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            kind: EnemyKind::Regular,
            position,
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { handle, .. } => Some(*handle),
            _ => None,
        })
        .expect("regular spawned")
}

fn spawn_boss(world: &mut World, tier: BossTier) -> EntityHandle {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnBoss {
            tier,
            position: BOSS_POSITION,
        },
        &mut events,
    );
    events
        .iter()
        .find_map(|event| match event {
            Event::BossSpawned { handle, .. } => Some(*handle),
            _ => None,
        })
        .expect("boss spawned")
}

fn hit(world: &mut World, enemy: EntityHandle, events: &mut Vec<Event>) {
    let target = query::entity(world, enemy).expect("enemy alive").position;
    let mut fired = Vec::new();
    world::apply(
        world,
        Command::FireProjectile {
            player: PlayerSlot::new(0),
            target,
        },
        &mut fired,
    );
    let projectile = fired
        .iter()
        .find_map(|event| match event {
            Event::ProjectileFired { handle, .. } => Some(*handle),
            _ => None,
        })
        .expect("projectile fired");
    world::apply(
        world,
        Command::ResolveOverlap {
            overlap: Overlap::ProjectileEnemy { projectile, enemy },
        },
        events,
    );
}

fn defeat(world: &mut World, tier: BossTier) -> Vec<Event> {
    let boss = spawn_boss(world, tier);
    let mut events = Vec::new();
    while query::entity(world, boss).is_some() {
        hit(world, boss, &mut events);
    }
    events
}

fn spawn_regulars(world: &mut World, count: usize) {
    let mut events = Vec::new();
    for index in 0..count {
        world::apply(
            world,
            Command::SpawnEnemy {
                kind: EnemyKind::Regular,
                position: Vec2::new(-40.0, 40.0 * index as f32),
            },
            &mut events,
        );
    }
}

#[test]
fn dog_defeat_advances_to_stage_one() {
    let mut world = running_world();
    spawn_regulars(&mut world, 5);

    let events = defeat(&mut world, BossTier::Dog);

    let session = query::session(&world);
    assert_eq!(session.stage, StageIndex::new(1));
    assert_eq!(session.scale_step, 1);
    assert_eq!(session.score, 6);
    assert_eq!(query::players(&world).len(), 2);
    assert!(query::enemies(&world).is_empty());
    assert_eq!(query::pool(&world, PoolKind::BossDog).capacity(), 25);

    let progress = query::progress(&world);
    assert_eq!(progress.active_boss, None);
    assert_eq!(progress.kills.get(EnemyKind::BossDog), 0);

    let tail: Vec<&Event> = events
        .iter()
        .skip_while(|event| !matches!(event, Event::PoolsCleared))
        .collect();
    assert_eq!(tail.len(), 5);
    assert_eq!(
        tail[..4],
        [
            &Event::PoolsCleared,
            &Event::BossDefeated {
                tier: BossTier::Dog
            },
            &Event::StageChanged {
                stage: StageIndex::new(1)
            },
            &Event::PlayerAdded {
                slot: PlayerSlot::new(1)
            },
        ]
    );
    match tail[4] {
        Event::ScaleStepStarted { step, ratio } => {
            assert_eq!(*step, 1);
            assert!((ratio - (1.0 - 0.7 / 3.0)).abs() < 1e-5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn avatars_settle_on_stage_scale_after_step() {
    let mut world = running_world();
    let _ = defeat(&mut world, BossTier::Dog);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1_000),
        },
        &mut events,
    );

    assert!(events.contains(&Event::ScaleStepCompleted { step: 1 }));
    let expected = 0.45 * (1.0 - 0.7 / 3.0);
    for player in query::players(&world) {
        assert!((player.scale - expected).abs() < 1e-5);
        assert!((player.body.x - 96.0 * expected * 1.2).abs() < 1e-3);
    }
}

#[test]
fn tank_defeat_adds_third_avatar() {
    let mut world = running_world();
    let _ = defeat(&mut world, BossTier::Dog);
    let _ = defeat(&mut world, BossTier::Tank);

    let session = query::session(&world);
    assert_eq!(session.stage, StageIndex::new(2));
    assert_eq!(session.scale_step, 2);
    assert_eq!(query::players(&world).len(), 3);
}

#[test]
fn final_boss_loop_doubles_threshold_without_extra_steps() {
    let mut world = running_world();
    let _ = defeat(&mut world, BossTier::Dog);
    let _ = defeat(&mut world, BossTier::Tank);

    let events = defeat(&mut world, BossTier::Weini);
    let progress = query::progress(&world);
    assert_eq!(progress.stage, StageIndex::FINAL);
    assert_eq!(progress.thresholds.tank_kills_for_final, 30);
    assert_eq!(progress.kills.get(EnemyKind::BossWeini), 1);
    assert_eq!(query::session(&world).scale_step, MAX_SCALE_STEPS);
    assert!(events.contains(&Event::KillRecorded {
        kind: EnemyKind::BossWeini,
        total: 1
    }));

    let events = defeat(&mut world, BossTier::Weini);
    let progress = query::progress(&world);
    assert_eq!(progress.stage, StageIndex::FINAL);
    assert_eq!(progress.thresholds.tank_kills_for_final, 60);
    assert_eq!(progress.kills.get(EnemyKind::BossWeini), 2);
    assert_eq!(query::session(&world).scale_step, MAX_SCALE_STEPS);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ScaleStepStarted { .. })));
    assert_eq!(query::players(&world).len(), 3);
}

#[test]
fn second_boss_is_rejected_while_one_is_active() {
    let mut world = running_world();
    let _ = spawn_boss(&mut world, BossTier::Dog);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            tier: BossTier::Tank,
            position: BOSS_POSITION,
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(query::pool(&world, PoolKind::Boss).active_count(), 1);
    assert_eq!(query::progress(&world).active_boss, Some(BossTier::Dog));
}

#[test]
fn full_pool_leaves_existing_enemies_untouched() {
    let mut world = running_world();
    let capacity = query::pool(&world, PoolKind::Regular).capacity();
    spawn_regulars(&mut world, capacity);
    let before = query::enemies(&world);
    assert_eq!(before.len(), capacity);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Regular,
            position: Vec2::new(-60.0, 0.0),
        },
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(query::enemies(&world), before);
}

#[test]
fn reset_restores_stage_zero_defaults() {
    let mut world = running_world();
    let _ = defeat(&mut world, BossTier::Dog);
    let mut events = Vec::new();
    world::apply(&mut world, Command::SetMuted { muted: true }, &mut events);

    world::apply(&mut world, Command::ResetSession, &mut events);

    let session = query::session(&world);
    assert_eq!(session.phase, SessionPhase::NotStarted);
    assert_eq!(session.stage, StageIndex::INITIAL);
    assert_eq!(session.score, 0);
    assert_eq!(session.scale_step, 0);
    assert!(session.muted);
    assert_eq!(query::players(&world).len(), 1);
    assert_eq!(query::formation_center(&world), Vec2::new(400.0, 300.0));
    assert_eq!(query::progress(&world).kills.total(), 0);
}

#[test]
fn contact_hits_the_touched_avatars_after_the_row_closes() {
    let mut stages: Vec<StageDefinition> = StageTable::classic().iter().cloned().collect();
    stages[2].players[2].health = 5;
    let config = WorldConfig {
        stages: StageTable::new(stages).expect("valid table"),
        ..WorldConfig::classic(Viewport::new(800.0, 600.0))
    };
    let mut world = running_world_with(config);
    let _ = defeat(&mut world, BossTier::Dog);
    let _ = defeat(&mut world, BossTier::Tank);
    let healths: Vec<u32> = query::players(&world).iter().map(|player| player.health).collect();
    assert_eq!(healths, vec![1, 1, 5]);

    let enemy = spawn_regular(&mut world, Vec2::new(-40.0, 300.0));
    touch(&mut world, enemy, PlayerSlot::new(0));
    touch(&mut world, enemy, PlayerSlot::new(1));

    let survivors: Vec<(PlayerSlot, u32)> = query::players(&world)
        .iter()
        .map(|player| (player.slot, player.health))
        .collect();
    assert_eq!(survivors, vec![(PlayerSlot::new(2), 5)]);
}

#[test]
fn tank_grants_its_own_avatar_after_a_loss() {
    let textures = TextureAtlas::from_sizes([
        ("bg", [1920.0, 1080.0]),
        ("player", [96.0, 96.0]),
        ("playerDor", [96.0, 96.0]),
        ("playerXu", [200.0, 200.0]),
        ("enemy", [80.0, 80.0]),
        ("bossDog", [160.0, 160.0]),
        ("bossTank", [200.0, 160.0]),
        ("bossWeini", [240.0, 240.0]),
        ("bullet", [32.0, 32.0]),
    ]);
    let config = WorldConfig {
        textures,
        ..WorldConfig::classic(Viewport::new(800.0, 600.0))
    };
    let mut world = running_world_with(config);
    let _ = defeat(&mut world, BossTier::Dog);
    let enemy = spawn_regular(&mut world, Vec2::new(-40.0, 300.0));
    touch(&mut world, enemy, PlayerSlot::new(1));
    assert_eq!(query::players(&world).len(), 1);

    let events = defeat(&mut world, BossTier::Tank);
    assert!(events.contains(&Event::PlayerAdded {
        slot: PlayerSlot::new(2)
    }));
    let _ = tick(&mut world, 1_000);

    let players = query::players(&world);
    let joined = players
        .iter()
        .find(|player| player.slot == PlayerSlot::new(2))
        .expect("tank avatar present");
    assert!((joined.body.x / joined.scale - 200.0 * 1.2).abs() < 1e-2);
    assert_eq!(players.len(), 2);
}

#[test]
fn stage_change_mid_shrink_completes_the_running_step_first() {
    let mut world = running_world();
    let _ = defeat(&mut world, BossTier::Dog);
    let _ = tick(&mut world, 300);

    let events = defeat(&mut world, BossTier::Tank);

    let steps: Vec<&Event> = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::ScaleStepCompleted { .. } | Event::ScaleStepStarted { .. }
            )
        })
        .collect();
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0], &Event::ScaleStepCompleted { step: 1 });
    assert!(matches!(steps[1], Event::ScaleStepStarted { step: 2, .. }));

    let events = tick(&mut world, 1_000);
    assert!(events.contains(&Event::ScaleStepCompleted { step: 2 }));
    let expected = 0.42 * (1.0 - 0.7 * 2.0 / 3.0);
    for player in query::players(&world) {
        assert!((player.scale - expected).abs() < 1e-5);
    }
}
