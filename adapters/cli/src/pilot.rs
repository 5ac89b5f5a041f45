//! Scripted steering used in place of a human at the controls.

use cat_siege_core::MovementInput;
use cat_siege_world::{query, World};
use glam::Vec2;

/// Enemies closer than this to the formation center trigger an escape.
const THREAT_RADIUS: f32 = 220.0;

/// Drags the formation away from the closest threat and drifts home otherwise.
#[derive(Debug, Default)]
pub(crate) struct EvasivePilot;

impl EvasivePilot {
    /// Chooses the movement input for the next tick.
    pub(crate) fn steer(&self, world: &World) -> MovementInput {
        let center = query::formation_center(world);
        let home = query::viewport(world).center();

        let threat = query::enemies(world)
            .into_iter()
            .map(|enemy| enemy.position)
            .filter(|position| position.distance(center) < THREAT_RADIUS)
            .min_by(|a, b| a.distance_squared(center).total_cmp(&b.distance_squared(center)));

        let target = match threat {
            Some(enemy) => {
                let away = (center - enemy).normalize_or_zero();
                if away == Vec2::ZERO {
                    return MovementInput::Idle;
                }
                center + away * THREAT_RADIUS
            }
            None => home,
        };
        MovementInput::Drag { target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_siege_core::{Command, EnemyKind, Viewport};
    use cat_siege_world::{self as world, WorldConfig};

    fn running_world() -> World {
        let mut world = World::new(WorldConfig::classic(Viewport::new(800.0, 600.0)));
        let mut events = Vec::new();
        world::apply(&mut world, Command::StartSession, &mut events);
        world
    }

    #[test]
    fn calm_playfield_steers_home() {
        let world = running_world();
        assert_eq!(
            EvasivePilot.steer(&world),
            MovementInput::Drag {
                target: Vec2::new(400.0, 300.0)
            }
        );
    }

    #[test]
    fn close_enemy_pushes_the_formation_away() {
        let mut world = running_world();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Regular,
                position: Vec2::new(500.0, 300.0),
            },
            &mut events,
        );

        match EvasivePilot.steer(&world) {
            MovementInput::Drag { target } => assert!(target.x < 400.0),
            other => panic!("unexpected input: {other:?}"),
        }
    }
}
