#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that turns keyboard or drag input into formation displacement.

use std::{f32::consts::SQRT_2, time::Duration};

use cat_siege_core::{Command, DirectionKeys, Event, Facing, MovementInput, StageDefinition};
use glam::Vec2;

/// Drag movement runs faster than keyboard movement.
const DRAG_SPEED_MULTIPLIER: f32 = 3.0;

/// Drags closer than this to the formation center are ignored.
const DRAG_DEAD_ZONE: f32 = 5.0;

/// Pure system that reacts to time events and emits formation movement commands.
#[derive(Debug)]
pub struct Movement {
    speed: f32,
}

impl Movement {
    /// Creates a movement system using the lead avatar speed of `stage`.
    #[must_use]
    pub fn new(stage: &StageDefinition) -> Self {
        Self {
            speed: stage.lead_player().speed,
        }
    }

    /// Formation speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Consumes world events and the tick's input to emit a movement command.
    pub fn handle(
        &mut self,
        events: &[Event],
        stage: &StageDefinition,
        input: &MovementInput,
        center: Vec2,
        out: &mut Vec<Command>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::StageChanged { .. } | Event::SessionReset => {
                    self.speed = stage.lead_player().speed;
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }

        if elapsed.is_zero() {
            return;
        }

        let seconds = elapsed.as_secs_f32();
        let planned = match input {
            MovementInput::Idle => None,
            MovementInput::Keys(keys) => self.keyboard_step(*keys, seconds),
            MovementInput::Drag { target } => self.drag_step(center, *target, seconds),
        };

        if let Some((displacement, facing)) = planned {
            out.push(Command::MoveFormation {
                displacement,
                facing,
            });
        }
    }

    fn keyboard_step(&self, keys: DirectionKeys, seconds: f32) -> Option<(Vec2, Option<Facing>)> {
        let direction = Vec2::new(axis(keys.left, keys.right), axis(keys.up, keys.down));
        if direction == Vec2::ZERO {
            return None;
        }

        let speed = if direction.x != 0.0 && direction.y != 0.0 {
            self.speed / SQRT_2
        } else {
            self.speed
        };
        Some((
            direction * speed * seconds,
            Facing::from_horizontal(direction.x),
        ))
    }

    fn drag_step(&self, center: Vec2, target: Vec2, seconds: f32) -> Option<(Vec2, Option<Facing>)> {
        let delta = target - center;
        let distance = delta.length();
        if distance <= DRAG_DEAD_ZONE {
            return None;
        }

        let step = (self.speed * DRAG_SPEED_MULTIPLIER * seconds).min(distance);
        Some((delta / distance * step, Facing::from_horizontal(delta.x)))
    }
}

fn axis(negative: bool, positive: bool) -> f32 {
    match (negative, positive) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    }
}
