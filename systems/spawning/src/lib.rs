#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timer-driven spawning system that emits enemy spawn commands on the spawn ring.

use std::time::Duration;

use cat_siege_core::{
    Command, EnemyKind, Event, PoolOccupancy, Rect, SpawnRing, StageDefinition,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Samples a point uniformly from the band between the ring's outer and inner rectangles.
///
/// The band is split into four strips (top, bottom, left, right) and a strip
/// is chosen with probability proportional to its area. Degenerate rings fall
/// back to the outer rectangle.
pub fn spawn_point<R: Rng + ?Sized>(ring: &SpawnRing, rng: &mut R) -> Vec2 {
    let outer = ring.outer;
    let inner = ring.inner;
    let strips = [
        Strip::new(
            outer.min().x,
            outer.max().x,
            outer.min().y,
            inner.min().y,
            Edge::Low,
            Edge::Low,
        ),
        Strip::new(
            outer.min().x,
            outer.max().x,
            inner.max().y,
            outer.max().y,
            Edge::Low,
            Edge::High,
        ),
        Strip::new(
            outer.min().x,
            inner.min().x,
            inner.min().y,
            inner.max().y,
            Edge::Low,
            Edge::Low,
        ),
        Strip::new(
            inner.max().x,
            outer.max().x,
            inner.min().y,
            inner.max().y,
            Edge::High,
            Edge::Low,
        ),
    ];

    let total: f32 = strips.iter().map(Strip::area).sum();
    if total <= 0.0 {
        return sample_rect(&outer, rng);
    }

    let mut pick = rng.gen::<f32>() * total;
    for strip in &strips {
        let area = strip.area();
        if pick < area {
            return strip.sample(rng);
        }
        pick -= area;
    }
    strips
        .iter()
        .rev()
        .find(|strip| strip.area() > 0.0)
        .map_or_else(|| outer.min(), |strip| strip.sample(rng))
}

fn sample_rect<R: Rng + ?Sized>(rect: &Rect, rng: &mut R) -> Vec2 {
    let t = Vec2::new(rng.gen(), rng.gen());
    rect.min() + (rect.max() - rect.min()) * t
}

/// Side of a strip the sampler anchors at, so the shared inner edge is never produced.
#[derive(Clone, Copy, Debug)]
enum Edge {
    Low,
    High,
}

#[derive(Clone, Copy, Debug)]
struct Strip {
    x: (f32, f32),
    y: (f32, f32),
    anchor_x: Edge,
    anchor_y: Edge,
}

impl Strip {
    fn new(x0: f32, x1: f32, y0: f32, y1: f32, anchor_x: Edge, anchor_y: Edge) -> Self {
        Self {
            x: (x0, x1.max(x0)),
            y: (y0, y1.max(y0)),
            anchor_x,
            anchor_y,
        }
    }

    fn area(&self) -> f32 {
        (self.x.1 - self.x.0) * (self.y.1 - self.y.0)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        Vec2::new(
            along(self.x, self.anchor_x, rng.gen()),
            along(self.y, self.anchor_y, rng.gen()),
        )
    }
}

fn along((low, high): (f32, f32), anchor: Edge, t: f32) -> f32 {
    match anchor {
        Edge::Low => low + (high - low) * t,
        Edge::High => high - (high - low) * t,
    }
}

#[derive(Clone, Copy, Debug)]
struct SpawnTimer {
    kind: EnemyKind,
    interval: Duration,
    max_count: usize,
    accumulator: Duration,
}

impl SpawnTimer {
    fn configured(kind: EnemyKind, stage: &StageDefinition) -> Self {
        let spec = stage.enemies.get(kind);
        Self {
            kind,
            interval: spec.spawn_interval(),
            max_count: spec.max_count,
            accumulator: Duration::ZERO,
        }
    }

    fn resolve_spawn_attempts(&mut self, dt: Duration) -> usize {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let mut attempts = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            attempts += 1;
        }
        attempts
    }
}

/// Pure system that emits enemy spawn commands from per-kind timers.
#[derive(Debug)]
pub struct Spawning {
    timers: [SpawnTimer; 3],
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a spawning system with timers configured for `stage`.
    #[must_use]
    pub fn new(stage: &StageDefinition, rng_seed: u64) -> Self {
        Self {
            timers: EnemyKind::POOLED.map(|kind| SpawnTimer::configured(kind, stage)),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Time accumulated toward the next spawn of the provided kind.
    #[must_use]
    pub fn accumulated(&self, kind: EnemyKind) -> Duration {
        self.timers
            .iter()
            .find(|timer| timer.kind == kind)
            .map_or(Duration::ZERO, |timer| timer.accumulator)
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// Stage changes and resets replace every interval and zero every
    /// accumulator before later events in the slice are processed.
    pub fn handle(
        &mut self,
        events: &[Event],
        stage: &StageDefinition,
        occupancy: PoolOccupancy,
        ring: &SpawnRing,
        out: &mut Vec<Command>,
    ) {
        let mut pending = [0_usize; 3];

        for event in events {
            match event {
                Event::StageChanged { .. } | Event::SessionReset => {
                    self.timers = EnemyKind::POOLED.map(|kind| SpawnTimer::configured(kind, stage));
                }
                Event::TimeAdvanced { dt } => {
                    for (timer, requested) in self.timers.iter_mut().zip(pending.iter_mut()) {
                        let attempts = timer.resolve_spawn_attempts(*dt);
                        for _ in 0..attempts {
                            if occupancy.get(timer.kind) + *requested >= timer.max_count {
                                continue;
                            }
                            *requested += 1;
                            out.push(Command::SpawnEnemy {
                                kind: timer.kind,
                                position: spawn_point(ring, &mut self.rng),
                            });
                        }
                    }
                }
                _ => {}
            }
        }
    }
}
