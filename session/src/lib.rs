#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestration for Cat Siege encounters.
//!
//! [`SessionController`] owns the authoritative world and every pure system.
//! Controls and ticks are translated into commands, the world's events are
//! appended to a shared log, and each system reads the log through its own
//! cursor so it sees every event exactly once. Observers are notified from
//! the same log at the end of each tick.

mod event_log;
mod observer;

use std::time::Duration;

use cat_siege_core::{
    Command, MovementInput, Overlap, ProgressSnapshot, SessionPhase, SessionSnapshot,
};
use cat_siege_system_boss_director::{BossDirector, BossPhase};
use cat_siege_system_firing::Firing;
use cat_siege_system_movement::Movement;
use cat_siege_system_spawning::Spawning;
use cat_siege_world::{self as world, query, World, WorldConfig};
use tracing::debug;

use crate::event_log::{EventLog, Reader};

pub use observer::{AabbOverlaps, EncounterObserver, OverlapDetector};

/// Mixed into the session seed so bosses and regular spawns draw from distinct streams.
const BOSS_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Drives one encounter: lifecycle controls plus the per-tick pipeline.
#[derive(Debug)]
pub struct SessionController {
    world: World,
    movement: Movement,
    spawning: Spawning,
    firing: Firing,
    boss_director: BossDirector,
    log: EventLog,
    commands: Vec<Command>,
    overlaps: Vec<Overlap>,
}

impl SessionController {
    /// Creates a session waiting on [`Self::start`].
    #[must_use]
    pub fn new(config: WorldConfig, seed: u64) -> Self {
        let world = World::new(config);
        let stage = query::stage(&world);
        Self {
            movement: Movement::new(stage),
            spawning: Spawning::new(stage, seed),
            firing: Firing::new(stage),
            boss_director: BossDirector::new(seed ^ BOSS_SEED_SALT),
            world,
            log: EventLog::default(),
            commands: Vec::new(),
            overlaps: Vec::new(),
        }
    }

    /// Begins the run; a finished run is reset first.
    pub fn start(&mut self) {
        self.submit(Command::StartSession);
    }

    /// Freezes a running session.
    pub fn pause(&mut self) {
        self.submit(Command::PauseSession);
    }

    /// Unfreezes a paused session.
    pub fn resume(&mut self) {
        self.submit(Command::ResumeSession);
    }

    /// Silences audio collaborators.
    pub fn mute(&mut self) {
        self.submit(Command::SetMuted { muted: true });
    }

    /// Re-enables audio collaborators.
    pub fn unmute(&mut self) {
        self.submit(Command::SetMuted { muted: false });
    }

    /// Returns every piece of run state to stage 0 and waits on [`Self::start`].
    pub fn reset(&mut self) {
        self.submit(Command::ResetSession);
    }

    /// Advances the encounter by `dt`.
    ///
    /// Runs the world tick, then movement, spawning, firing, overlap
    /// resolution and the boss check, and finally notifies `observer` of
    /// every event produced since the previous notification. Nothing but
    /// the notification happens unless the session is running.
    pub fn tick<D, O>(
        &mut self,
        dt: Duration,
        input: &MovementInput,
        detector: &mut D,
        observer: &mut O,
    ) where
        D: OverlapDetector + ?Sized,
        O: EncounterObserver + ?Sized,
    {
        if query::session(&self.world).phase == SessionPhase::Running {
            self.run_pipeline(dt, input, detector);
        }
        self.flush(observer);
    }

    /// Notifies `observer` of events produced by controls since the last tick.
    pub fn flush<O>(&mut self, observer: &mut O)
    where
        O: EncounterObserver + ?Sized,
    {
        for event in self.log.unread(Reader::Observer) {
            observer::notify(observer, event);
        }
        self.log.mark_read(Reader::Observer);
        if query::session(&self.world).phase != SessionPhase::Running {
            self.log.prune_idle();
        }
        self.log.compact();
    }

    /// Read-only access to the authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Lifecycle summary.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        query::session(&self.world)
    }

    /// Kill tallies, thresholds and boss presence.
    #[must_use]
    pub fn progress(&self) -> ProgressSnapshot {
        query::progress(&self.world)
    }

    /// Boss director state.
    #[must_use]
    pub fn boss_phase(&self) -> BossPhase {
        self.boss_director.phase()
    }

    /// Reports whether a recent boss spawn attempt still blocks new attempts.
    #[must_use]
    pub fn is_spawning_boss(&self) -> bool {
        self.boss_director.is_spawning_boss()
    }

    fn submit(&mut self, command: Command) {
        world::apply(&mut self.world, command, self.log.sink());
    }

    fn apply_pending(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, self.log.sink());
        }
    }

    fn run_pipeline<D>(&mut self, dt: Duration, input: &MovementInput, detector: &mut D)
    where
        D: OverlapDetector + ?Sized,
    {
        self.submit(Command::Tick { dt });

        self.movement.handle(
            self.log.unread(Reader::Movement),
            query::stage(&self.world),
            input,
            query::formation_center(&self.world),
            &mut self.commands,
        );
        self.log.mark_read(Reader::Movement);
        self.apply_pending();

        self.spawning.handle(
            self.log.unread(Reader::Spawning),
            query::stage(&self.world),
            query::pool_occupancy(&self.world),
            &query::spawn_ring(&self.world),
            &mut self.commands,
        );
        self.log.mark_read(Reader::Spawning);
        self.apply_pending();

        self.firing.handle(
            self.log.unread(Reader::Firing),
            query::stage(&self.world),
            &query::players(&self.world),
            &query::enemies(&self.world),
            &mut self.commands,
        );
        self.log.mark_read(Reader::Firing);
        self.apply_pending();

        self.overlaps.clear();
        detector.detect(&self.world, &mut self.overlaps);
        if !self.overlaps.is_empty() {
            debug!(count = self.overlaps.len(), "resolving overlaps");
        }
        for overlap in self.overlaps.drain(..) {
            world::apply(
                &mut self.world,
                Command::ResolveOverlap { overlap },
                self.log.sink(),
            );
        }

        self.boss_director.handle(
            self.log.unread(Reader::BossDirector),
            &query::progress(&self.world),
            &query::spawn_ring(&self.world),
            &mut self.commands,
        );
        self.log.mark_read(Reader::BossDirector);
        self.apply_pending();
    }
}
