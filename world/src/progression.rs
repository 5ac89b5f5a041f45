//! Authoritative half of the boss progression: the single boss slot and the defeat policy.

use cat_siege_core::{BossTier, EnemyKind, Event, Facing, PoolKind, StageIndex, MAX_SCALE_STEPS};
use glam::Vec2;
use tracing::{debug, info};

use crate::{pool::EntityRecord, World};

pub(crate) fn spawn_boss(world: &mut World, tier: BossTier, position: Vec2, out_events: &mut Vec<Event>) {
    if world.boss.is_some() || !world.pools.get(PoolKind::Boss).is_empty() {
        debug!(?tier, active = ?world.boss, "boss spawn rejected, slot occupied");
        return;
    }

    let kind = tier.enemy_kind();
    let spec = world.stage_definition().enemies.get(kind);
    let scale = spec.scale * world.scale.ratio();
    let facing = world
        .nearest_avatar(position)
        .map_or(Facing::Right, |target| Facing::toward(position, target));
    let record = EntityRecord::new(
        kind.into(),
        position,
        spec.health,
        scale,
        world.texture_size(&spec.texture),
    )
    .with_speed(spec.speed)
    .with_facing(facing);

    let Some(handle) = world.pools.get_mut(PoolKind::Boss).acquire(record) else {
        debug!(?tier, "boss slot unavailable");
        return;
    };
    world.boss = Some(tier);
    info!(?tier, stage = world.stage.get(), "boss spawned");
    out_events.push(Event::BossSpawned {
        handle,
        tier,
        position,
        scale,
    });
}

pub(crate) fn defeat(world: &mut World, tier: BossTier, out_events: &mut Vec<Event>) {
    world.boss = None;
    let previous = world.stage;
    let target = match tier {
        BossTier::Dog => StageIndex::new(1),
        BossTier::Tank => StageIndex::new(2),
        BossTier::Weini => {
            let total = world.kills.record(EnemyKind::BossWeini);
            out_events.push(Event::KillRecorded {
                kind: EnemyKind::BossWeini,
                total,
            });
            world.thresholds.escalate_final();
            StageIndex::FINAL
        }
    };
    world.stage = previous.max(target);

    for kind in PoolKind::ENEMY_POOLS {
        let _ = world.pools.get_mut(kind).clear();
    }
    out_events.push(Event::PoolsCleared);
    world.apply_stage_capacities();

    info!(
        ?tier,
        from = previous.get(),
        to = world.stage.get(),
        "boss defeated"
    );
    out_events.push(Event::BossDefeated { tier });
    out_events.push(Event::StageChanged { stage: world.stage });

    if let Some(slot) = tier.reward_slot() {
        if world.add_avatar(slot) {
            out_events.push(Event::PlayerAdded { slot });
        } else {
            debug!(?tier, slot = slot.get(), "avatar slot taken or formation full");
        }
    }

    if world.stage > previous {
        begin_scale_step(world, out_events);
    }
}

fn begin_scale_step(world: &mut World, out_events: &mut Vec<Event>) {
    if world.scale.step() >= MAX_SCALE_STEPS {
        return;
    }
    // A step still running is finished before the next one starts from its targets.
    if let Some(step) = world.scale.finish_in_flight() {
        world.settle_scale_step(step, out_events);
    }
    let Some((previous, next)) = world.scale.begin_step() else {
        return;
    };
    let factor = next / previous;
    for pool in world.pools.iter_mut() {
        for record in pool.iter_mut() {
            record.begin_tween(record.scale * factor);
        }
    }

    let stage = world.stages.stage(world.stage);
    for (slot, avatar) in world.formation.iter_mut() {
        avatar.begin_tween(stage.player(slot.get() as usize).scale * next);
    }

    let step = world.scale.step();
    info!(step, ratio = next, "scale step started");
    out_events.push(Event::ScaleStepStarted { step, ratio: next });
}
