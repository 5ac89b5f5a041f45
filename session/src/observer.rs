//! Collaborator seams: overlap detection in, encounter callbacks out.

use cat_siege_core::{BossTier, EntityKind, Event, KillCounters, Overlap, PlayerSlot, StageIndex};
use cat_siege_world::{query, World};
use glam::Vec2;

/// Receives fire-and-forget notifications as the encounter unfolds.
///
/// Every method defaults to doing nothing, so implementors override only what they present.
pub trait EncounterObserver {
    /// An enemy, boss or projectile appeared.
    fn on_spawn(&mut self, _kind: EntityKind, _position: Vec2, _scale: f32) {}

    /// The single boss slot was filled; follows the matching [`Self::on_spawn`].
    ///
    /// Pooled elites share the boss kinds but never reach this callback.
    fn on_boss_spawn(&mut self, _tier: BossTier) {}

    /// An entity lost health.
    fn on_hit(&mut self, _kind: EntityKind) {}

    /// An entity died.
    fn on_death(&mut self, _kind: EntityKind) {}

    /// The score changed.
    fn on_score_change(&mut self, _score: u64) {}

    /// The stage was (re)applied.
    fn on_stage_change(&mut self, _stage: StageIndex) {}

    /// An avatar joined the formation.
    fn on_player_added(&mut self, _slot: PlayerSlot) {}

    /// An avatar left the formation.
    fn on_player_removed(&mut self, _slot: PlayerSlot) {}

    /// The formation was wiped out.
    fn on_game_over(&mut self, _score: u64, _kills: &KillCounters) {}
}

impl EncounterObserver for () {}

pub(crate) fn notify<O>(observer: &mut O, event: &Event)
where
    O: EncounterObserver + ?Sized,
{
    match event {
        Event::EnemySpawned {
            kind,
            position,
            scale,
            ..
        } => observer.on_spawn((*kind).into(), *position, *scale),
        Event::BossSpawned {
            tier,
            position,
            scale,
            ..
        } => {
            observer.on_spawn(tier.enemy_kind().into(), *position, *scale);
            observer.on_boss_spawn(*tier);
        }
        Event::ProjectileFired {
            position, scale, ..
        } => observer.on_spawn(EntityKind::Projectile, *position, *scale),
        Event::EntityHit { kind } => observer.on_hit(*kind),
        Event::EntityDied { kind } => observer.on_death(*kind),
        Event::ScoreChanged { score } => observer.on_score_change(*score),
        Event::StageChanged { stage } => observer.on_stage_change(*stage),
        Event::PlayerAdded { slot } => observer.on_player_added(*slot),
        Event::PlayerRemoved { slot } => observer.on_player_removed(*slot),
        Event::GameOver { score, kills } => observer.on_game_over(*score, kills),
        _ => {}
    }
}

/// Supplies the overlapping pairs of the current world state.
pub trait OverlapDetector {
    /// Appends every overlapping pair to `out`.
    fn detect(&mut self, world: &World, out: &mut Vec<Overlap>);
}

impl<F> OverlapDetector for F
where
    F: FnMut(&World, &mut Vec<Overlap>),
{
    fn detect(&mut self, world: &World, out: &mut Vec<Overlap>) {
        self(world, out);
    }
}

/// Axis-aligned bounding-box detector over the collision bodies.
///
/// Each projectile is reported against at most one enemy; every enemy
/// touching an avatar is reported once per avatar.
#[derive(Debug, Default)]
pub struct AabbOverlaps;

impl OverlapDetector for AabbOverlaps {
    fn detect(&mut self, world: &World, out: &mut Vec<Overlap>) {
        let enemies = query::enemies(world);
        let players = query::players(world);

        for projectile in query::projectiles(world) {
            let bounds = projectile.bounds();
            if let Some(enemy) = enemies
                .iter()
                .find(|enemy| enemy.bounds().intersects(&bounds))
            {
                out.push(Overlap::ProjectileEnemy {
                    projectile: projectile.handle,
                    enemy: enemy.handle,
                });
            }
        }

        for enemy in &enemies {
            let bounds = enemy.bounds();
            for player in players
                .iter()
                .filter(|player| player.bounds().intersects(&bounds))
            {
                out.push(Overlap::EnemyPlayer {
                    enemy: enemy.handle,
                    player: player.slot,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_siege_core::{EnemyKind, EntityHandle, PoolKind};

    #[derive(Debug, Default)]
    struct Spawns {
        kinds: Vec<EntityKind>,
        bosses: Vec<BossTier>,
    }

    impl EncounterObserver for Spawns {
        fn on_spawn(&mut self, kind: EntityKind, _position: Vec2, _scale: f32) {
            self.kinds.push(kind);
        }

        fn on_boss_spawn(&mut self, tier: BossTier) {
            self.bosses.push(tier);
        }
    }

    #[test]
    fn only_the_boss_slot_reports_a_boss() {
        let mut spawns = Spawns::default();
        notify(
            &mut spawns,
            &Event::EnemySpawned {
                handle: EntityHandle::new(PoolKind::BossDog, 0, 0),
                kind: EnemyKind::BossDog,
                position: Vec2::ZERO,
                scale: 0.3,
            },
        );
        notify(
            &mut spawns,
            &Event::BossSpawned {
                handle: EntityHandle::new(PoolKind::Boss, 0, 0),
                tier: BossTier::Dog,
                position: Vec2::ZERO,
                scale: 0.5,
            },
        );

        assert_eq!(spawns.kinds, vec![EntityKind::BossDog, EntityKind::BossDog]);
        assert_eq!(spawns.bosses, vec![BossTier::Dog]);
    }
}
