//! Turns overlap reports into damage, score and kill bookkeeping.

use cat_siege_core::{
    BossTier, EntityHandle, EntityKind, Event, Overlap, PlayerSlot, PoolKind, SessionPhase,
};
use tracing::{debug, info};

use crate::{progression, World};

pub(crate) fn resolve(world: &mut World, overlap: Overlap, out_events: &mut Vec<Event>) {
    match overlap {
        Overlap::ProjectileEnemy { projectile, enemy } => {
            projectile_hit(world, projectile, enemy, out_events);
        }
        Overlap::EnemyPlayer { enemy, player } => enemy_contact(world, enemy, player, out_events),
    }
}

fn is_live_enemy(world: &World, enemy: EntityHandle) -> bool {
    enemy.pool().is_hostile() && world.pools.get(enemy.pool()).get(enemy).is_some()
}

fn projectile_hit(
    world: &mut World,
    projectile: EntityHandle,
    enemy: EntityHandle,
    out_events: &mut Vec<Event>,
) {
    if projectile.pool() != PoolKind::Projectile || !is_live_enemy(world, enemy) {
        debug!(?projectile, ?enemy, "projectile overlap with invalid pair ignored");
        return;
    }
    if world.pools.get_mut(PoolKind::Projectile).release(projectile).is_none() {
        debug!(?projectile, "overlap with spent projectile ignored");
        return;
    }

    let pool = world.pools.get_mut(enemy.pool());
    let Some(record) = pool.get_mut(enemy) else {
        return;
    };
    record.health = record.health.saturating_sub(1);
    let kind = record.kind;
    let remaining = record.health;

    world.score = world.score.saturating_add(1);
    out_events.push(Event::ScoreChanged { score: world.score });
    out_events.push(Event::EntityHit { kind });

    if remaining > 0 {
        return;
    }
    let _ = world.pools.get_mut(enemy.pool()).release(enemy);
    out_events.push(Event::EntityDied { kind });

    let Some(enemy_kind) = kind.enemy() else {
        return;
    };
    if enemy.pool() == PoolKind::Boss {
        match BossTier::from_enemy_kind(enemy_kind) {
            Some(tier) => progression::defeat(world, tier, out_events),
            None => debug!(kind = enemy_kind.label(), "boss slot held a non-boss enemy"),
        }
    } else {
        let total = world.kills.record(enemy_kind);
        out_events.push(Event::KillRecorded {
            kind: enemy_kind,
            total,
        });
    }
}

fn enemy_contact(
    world: &mut World,
    enemy: EntityHandle,
    player: PlayerSlot,
    out_events: &mut Vec<Event>,
) {
    if !is_live_enemy(world, enemy) {
        debug!(?enemy, "contact with inactive enemy ignored");
        return;
    }
    let Some(avatar) = world.formation.get_mut(player) else {
        debug!(slot = player.get(), "contact with missing avatar ignored");
        return;
    };
    avatar.health = avatar.health.saturating_sub(1);
    let remaining = avatar.health;
    out_events.push(Event::EntityHit {
        kind: EntityKind::Player,
    });

    if remaining > 0 {
        return;
    }
    let _ = world.formation.remove(player, world.viewport);
    out_events.push(Event::PlayerRemoved { slot: player });
    out_events.push(Event::EntityDied {
        kind: EntityKind::Player,
    });

    if world.formation.is_empty() {
        world.phase = SessionPhase::GameOver;
        info!(score = world.score, kills = world.kills.total(), "game over");
        out_events.push(Event::GameOver {
            score: world.score,
            kills: world.kills,
        });
    }
}
