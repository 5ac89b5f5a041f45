#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile volleys aimed at the closest enemies.

use std::time::Duration;

use cat_siege_core::{Command, EntitySnapshot, Event, PlayerSnapshot, StageDefinition};
use glam::Vec2;

/// Auto-fire system that queues one projectile per avatar for every elapsed volley interval.
#[derive(Debug)]
pub struct Firing {
    interval: Duration,
    accumulator: Duration,
    scratch: Vec<Command>,
}

impl Firing {
    /// Creates a firing system using the lead avatar's volley cadence in `stage`.
    #[must_use]
    pub fn new(stage: &StageDefinition) -> Self {
        Self {
            interval: stage.lead_player().volley_interval(),
            accumulator: Duration::ZERO,
            scratch: Vec::new(),
        }
    }

    /// Time accumulated toward the next volley.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Emits `Command::FireProjectile` entries for every volley that came due.
    pub fn handle(
        &mut self,
        events: &[Event],
        stage: &StageDefinition,
        players: &[PlayerSnapshot],
        enemies: &[EntitySnapshot],
        out: &mut Vec<Command>,
    ) {
        let mut volleys = 0;
        for event in events {
            match event {
                Event::StageChanged { .. } | Event::SessionReset => {
                    self.interval = stage.lead_player().volley_interval();
                    self.accumulator = Duration::ZERO;
                    volleys = 0;
                }
                Event::TimeAdvanced { dt } => volleys += self.resolve_volleys(*dt),
                _ => {}
            }
        }

        if volleys == 0 || enemies.is_empty() {
            return;
        }

        self.scratch.clear();
        for player in players {
            if let Some(target) = closest_enemy(player.position, enemies) {
                self.scratch.push(Command::FireProjectile {
                    player: player.slot,
                    target,
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len() * volleys);
        for _ in 1..volleys {
            out.extend_from_slice(&self.scratch);
        }
        out.append(&mut self.scratch);
    }

    fn resolve_volleys(&mut self, dt: Duration) -> usize {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut volleys = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            volleys += 1;
        }
        volleys
    }
}

fn closest_enemy(origin: Vec2, enemies: &[EntitySnapshot]) -> Option<Vec2> {
    enemies
        .iter()
        .map(|enemy| enemy.position)
        .min_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
}
