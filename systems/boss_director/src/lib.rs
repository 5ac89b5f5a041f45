#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Threshold-gated boss director that requests tiered boss spawns.
//!
//! The director polls the kill counters on its own fixed cadence rather than
//! reacting to individual kills. Once a threshold is met and no boss is
//! alive it requests a spawn and then refuses further attempts until a short
//! cooldown elapses. The world stays authoritative: it may reject the spawn,
//! and it alone applies the defeat policy.

use std::time::Duration;

use cat_siege_core::{
    BossTier, Command, Event, ProgressSnapshot, SpawnRing, BOSS_CHECK_INTERVAL,
    BOSS_SPAWN_COOLDOWN,
};
use cat_siege_system_spawning::spawn_point;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Director state as seen from the system side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BossPhase {
    /// No boss alive and no spawn in flight.
    #[default]
    Idle,
    /// A spawn was requested and has not been confirmed yet.
    Spawning(BossTier),
    /// The world confirmed the boss is alive.
    Active(BossTier),
}

/// Tier whose threshold is met in the provided progress, if any.
///
/// Stage 0 gates the dog on regular kills, stage 1 gates the tank on dog
/// kills, and every later stage gates the final boss on tank kills.
#[must_use]
pub fn select_tier(progress: &ProgressSnapshot) -> Option<BossTier> {
    let tier = match progress.stage.get() {
        0 => BossTier::Dog,
        1 => BossTier::Tank,
        _ => BossTier::Weini,
    };
    let (kind, required) = progress.thresholds.gate(tier);
    (progress.kills.get(kind) >= required).then_some(tier)
}

/// Pure system that polls boss thresholds and emits `Command::SpawnBoss`.
#[derive(Debug)]
pub struct BossDirector {
    phase: BossPhase,
    check_accumulator: Duration,
    cooldown: Option<Duration>,
    rng: ChaCha8Rng,
}

impl BossDirector {
    /// Creates an idle director whose spawn points derive from `rng_seed`.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            phase: BossPhase::Idle,
            check_accumulator: Duration::ZERO,
            cooldown: None,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Current director state.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Reports whether a recent spawn attempt still blocks new attempts.
    #[must_use]
    pub const fn is_spawning_boss(&self) -> bool {
        self.cooldown.is_some()
    }

    /// Consumes world events and the progress snapshot to emit boss spawn commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        progress: &ProgressSnapshot,
        ring: &SpawnRing,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::BossSpawned { tier, .. } => self.phase = BossPhase::Active(*tier),
                Event::BossDefeated { tier } => {
                    if self.phase == BossPhase::Active(*tier) {
                        self.phase = BossPhase::Idle;
                    } else {
                        debug!(?tier, phase = ?self.phase, "defeat for untracked boss ignored");
                    }
                }
                Event::StageChanged { .. } => self.check_accumulator = Duration::ZERO,
                Event::SessionReset => {
                    self.phase = BossPhase::Idle;
                    self.check_accumulator = Duration::ZERO;
                    self.cooldown = None;
                }
                Event::TimeAdvanced { dt } => self.advance(*dt, progress, ring, out),
                _ => {}
            }
        }
    }

    fn advance(
        &mut self,
        dt: Duration,
        progress: &ProgressSnapshot,
        ring: &SpawnRing,
        out: &mut Vec<Command>,
    ) {
        if let Some(remaining) = self.cooldown {
            let remaining = remaining.saturating_sub(dt);
            if remaining.is_zero() {
                self.cooldown = None;
                if let BossPhase::Spawning(tier) = self.phase {
                    debug!(?tier, "boss spawn was not confirmed");
                    self.phase = BossPhase::Idle;
                }
            } else {
                self.cooldown = Some(remaining);
            }
        }

        self.check_accumulator = self.check_accumulator.saturating_add(dt);
        while self.check_accumulator >= BOSS_CHECK_INTERVAL {
            self.check_accumulator -= BOSS_CHECK_INTERVAL;
            self.check(progress, ring, out);
        }
    }

    fn check(&mut self, progress: &ProgressSnapshot, ring: &SpawnRing, out: &mut Vec<Command>) {
        if self.cooldown.is_some() || progress.active_boss.is_some() {
            return;
        }
        let Some(tier) = select_tier(progress) else {
            return;
        };

        self.cooldown = Some(BOSS_SPAWN_COOLDOWN);
        self.phase = BossPhase::Spawning(tier);
        info!(?tier, stage = progress.stage.get(), "boss threshold reached");
        out.push(Command::SpawnBoss {
            tier,
            position: spawn_point(ring, &mut self.rng),
        });
    }
}
