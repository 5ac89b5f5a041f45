#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Cat Siege.

mod combat;
mod formation;
pub mod pool;
mod progression;
mod scale;

use std::time::Duration;

use cat_siege_core::{
    BossThresholds, BossTier, Command, EnemyKind, EntityKind, Event, Facing, KillCounters,
    PlayerSlot, PoolKind, SessionPhase, StageDefinition, StageIndex, StageTable, TextureAtlas,
    Viewport, SPAWN_OUTER_MARGIN,
};
use glam::Vec2;
use tracing::{debug, info, trace, warn};

use crate::{
    formation::Formation,
    pool::{EntityRecord, Pools},
    scale::{initial_background_scale, ScaleTransition, StepProgress},
};

const BACKGROUND_TEXTURE: &str = "bg";
const PROJECTILE_TEXTURE: &str = "bullet";
const PROJECTILE_BASE_SCALE: f32 = 0.4;
const PROJECTILE_SCALE_BOOST: f32 = 1.5;

/// Pools whose occupants chase the formation.
const CHASING_POOLS: [PoolKind; 4] = [
    PoolKind::Regular,
    PoolKind::BossDog,
    PoolKind::BossTank,
    PoolKind::Boss,
];

/// Pools released once their occupants leave the playfield; the boss slot is exempt.
const CULLED_POOLS: [PoolKind; 4] = [
    PoolKind::Regular,
    PoolKind::BossDog,
    PoolKind::BossTank,
    PoolKind::Projectile,
];

/// Immutable inputs a world is built from.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Validated stage table driving progression.
    pub stages: StageTable,
    /// Playfield dimensions.
    pub viewport: Viewport,
    /// Texture sizes used to derive collision bodies.
    pub textures: TextureAtlas,
}

impl WorldConfig {
    /// Configuration using the built-in stage table and art set.
    #[must_use]
    pub fn classic(viewport: Viewport) -> Self {
        Self {
            stages: StageTable::classic(),
            viewport,
            textures: TextureAtlas::classic(),
        }
    }
}

/// Represents the authoritative Cat Siege world state.
#[derive(Debug)]
pub struct World {
    stages: StageTable,
    viewport: Viewport,
    textures: TextureAtlas,
    phase: SessionPhase,
    muted: bool,
    stage: StageIndex,
    score: u64,
    elapsed: Duration,
    kills: KillCounters,
    thresholds: BossThresholds,
    pools: Pools,
    boss: Option<BossTier>,
    formation: Formation,
    scale: ScaleTransition,
}

impl World {
    /// Creates a world at stage 0, waiting for the start control.
    #[must_use]
    pub fn new(config: WorldConfig) -> Self {
        warn_missing_textures(&config.stages, &config.textures);
        let background = config.textures.size_or_fallback(BACKGROUND_TEXTURE);
        let mut world = Self {
            scale: ScaleTransition::new(initial_background_scale(config.viewport, background)),
            formation: Formation::new(config.viewport.center()),
            stages: config.stages,
            viewport: config.viewport,
            textures: config.textures,
            phase: SessionPhase::NotStarted,
            muted: false,
            stage: StageIndex::INITIAL,
            score: 0,
            elapsed: Duration::ZERO,
            kills: KillCounters::default(),
            thresholds: BossThresholds::default(),
            pools: Pools::new(),
            boss: None,
        };
        let mut discarded = Vec::new();
        world.reset_run(&mut discarded);
        world
    }

    fn stage_definition(&self) -> &StageDefinition {
        self.stages.stage(self.stage)
    }

    fn texture_size(&self, name: &str) -> Vec2 {
        self.textures.size_or_fallback(name)
    }

    fn reset_run(&mut self, out_events: &mut Vec<Event>) {
        self.phase = SessionPhase::NotStarted;
        self.stage = StageIndex::INITIAL;
        self.score = 0;
        self.elapsed = Duration::ZERO;
        self.kills = KillCounters::default();
        self.thresholds = BossThresholds::default();
        self.boss = None;
        for pool in self.pools.iter_mut() {
            let _ = pool.clear();
        }
        self.apply_stage_capacities();
        let background = self.texture_size(BACKGROUND_TEXTURE);
        self.scale = ScaleTransition::new(initial_background_scale(self.viewport, background));
        self.formation = Formation::new(self.viewport.center());

        out_events.push(Event::SessionReset);
        out_events.push(Event::ScoreChanged { score: 0 });
        out_events.push(Event::StageChanged { stage: self.stage });
        if self.add_avatar(PlayerSlot::LEAD) {
            out_events.push(Event::PlayerAdded {
                slot: PlayerSlot::LEAD,
            });
        }
    }

    fn apply_stage_capacities(&mut self) {
        for kind in EnemyKind::POOLED {
            let capacity = self.stage_definition().enemies.get(kind).max_count;
            if let Some(pool) = PoolKind::for_enemy(kind) {
                self.pools.get_mut(pool).set_capacity(capacity);
            }
        }
    }

    /// Places the avatar of `slot`, built from the current stage's entry for that slot.
    /// Returns false when the slot is already held or the row is full.
    fn add_avatar(&mut self, slot: PlayerSlot) -> bool {
        if self.formation.is_full() || self.formation.get(slot).is_some() {
            return false;
        }
        let spec = self.stage_definition().player(slot.get() as usize);
        let facing = self
            .formation
            .lead()
            .map_or(Facing::Right, |lead| lead.facing);
        let avatar = EntityRecord::new(
            EntityKind::Player,
            self.formation.center(),
            spec.health,
            spec.scale * self.scale.ratio(),
            self.texture_size(&spec.texture),
        )
        .with_speed(spec.speed)
        .with_facing(facing);
        self.formation.insert(slot, avatar, self.viewport)
    }

    fn nearest_avatar(&self, position: Vec2) -> Option<Vec2> {
        self.formation
            .iter()
            .map(|(_, avatar)| avatar.position)
            .min_by(|a, b| {
                a.distance_squared(position)
                    .total_cmp(&b.distance_squared(position))
            })
    }

    fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2, out_events: &mut Vec<Event>) {
        let Some(pool) = PoolKind::for_enemy(kind) else {
            debug!(kind = kind.label(), "enemy kind has no spawn pool");
            return;
        };
        let spec = self.stage_definition().enemies.get(kind);
        let scale = spec.scale * self.scale.ratio();
        let facing = self
            .nearest_avatar(position)
            .map_or(Facing::Right, |target| Facing::toward(position, target));
        let record = EntityRecord::new(
            kind.into(),
            position,
            spec.health,
            scale,
            self.texture_size(&spec.texture),
        )
        .with_speed(spec.speed)
        .with_facing(facing);

        match self.pools.get_mut(pool).acquire(record) {
            Some(handle) => out_events.push(Event::EnemySpawned {
                handle,
                kind,
                position,
                scale,
            }),
            None => trace!(kind = kind.label(), "spawn pool exhausted"),
        }
    }

    fn fire_projectile(&mut self, player: PlayerSlot, target: Vec2, out_events: &mut Vec<Event>) {
        let Some(avatar) = self.formation.get(player) else {
            debug!(slot = player.get(), "fire request from missing avatar");
            return;
        };
        let origin = avatar.position;
        let direction = (target - origin).normalize_or_zero();
        if direction == Vec2::ZERO {
            debug!(slot = player.get(), "fire request without direction");
            return;
        }

        let speed = self.stage_definition().player(player.get() as usize).bullet_speed;
        let scale = PROJECTILE_BASE_SCALE * self.scale.ratio() * PROJECTILE_SCALE_BOOST;
        let record = EntityRecord::new(
            EntityKind::Projectile,
            origin,
            1,
            scale,
            self.texture_size(PROJECTILE_TEXTURE),
        )
        .with_velocity(direction * speed)
        .with_facing(Facing::toward(origin, target));

        match self.pools.get_mut(PoolKind::Projectile).acquire(record) {
            Some(handle) => out_events.push(Event::ProjectileFired {
                handle,
                player,
                position: origin,
                scale,
            }),
            None => trace!("projectile pool exhausted"),
        }
    }

    fn advance_entities(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let lead = self.formation.lead().map(|avatar| avatar.position);

        for kind in CHASING_POOLS {
            for record in self.pools.get_mut(kind).iter_mut() {
                if let Some(target) = lead {
                    record.velocity = (target - record.position).normalize_or_zero() * record.speed;
                    record.facing = Facing::toward(record.position, target);
                }
                record.position += record.velocity * seconds;
            }
        }

        for record in self.pools.get_mut(PoolKind::Projectile).iter_mut() {
            record.position += record.velocity * seconds;
        }
    }

    fn cull_escaped(&mut self) {
        let bounds = self.viewport.bounds().expanded(SPAWN_OUTER_MARGIN);
        for kind in CULLED_POOLS {
            let pool = self.pools.get_mut(kind);
            let escaped: Vec<_> = pool
                .iter()
                .filter(|(_, record)| !bounds.contains(record.position))
                .map(|(handle, _)| handle)
                .collect();
            for handle in escaped {
                let _ = pool.release(handle);
            }
        }
    }

    fn advance_scale(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(progress) = self.scale.advance(dt) else {
            return;
        };
        match progress {
            StepProgress::InFlight(eased) => {
                for record in self.scaled_records() {
                    record.advance_tween(eased);
                }
            }
            StepProgress::Completed(step) => self.settle_scale_step(step, out_events),
        }
    }

    fn scaled_records(&mut self) -> impl Iterator<Item = &mut EntityRecord> + '_ {
        self.pools
            .iter_mut()
            .flat_map(|pool| pool.iter_mut())
            .chain(self.formation.iter_mut().map(|(_, avatar)| avatar))
    }

    /// Snaps every sprite to its tween target and reports `step` as done.
    fn settle_scale_step(&mut self, step: u8, out_events: &mut Vec<Event>) {
        for record in self.scaled_records() {
            record.settle();
        }
        out_events.push(Event::ScaleStepCompleted { step });
    }
}

fn warn_missing_textures(stages: &StageTable, textures: &TextureAtlas) {
    let stage_textures = stages.iter().flat_map(|stage| {
        stage
            .players
            .iter()
            .map(|player| player.texture.as_str())
            .chain(
                EnemyKind::ALL
                    .iter()
                    .map(|kind| stage.enemies.get(*kind).texture.as_str()),
            )
    });
    let mut missing: Vec<&str> = [BACKGROUND_TEXTURE, PROJECTILE_TEXTURE]
        .into_iter()
        .chain(stage_textures)
        .filter(|name| textures.get(name).is_none())
        .collect();
    missing.sort_unstable();
    missing.dedup();
    for name in missing {
        warn!(texture = name, "texture size unknown, using fallback");
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartSession => match world.phase {
            SessionPhase::NotStarted => {
                world.phase = SessionPhase::Running;
                info!(stage = world.stage.get(), "session started");
                out_events.push(Event::SessionStarted);
            }
            SessionPhase::GameOver => {
                world.reset_run(out_events);
                world.phase = SessionPhase::Running;
                info!("session restarted after game over");
                out_events.push(Event::SessionStarted);
            }
            SessionPhase::Running | SessionPhase::Paused => {
                debug!(phase = ?world.phase, "start ignored");
            }
        },
        Command::PauseSession => {
            if world.phase == SessionPhase::Running {
                world.phase = SessionPhase::Paused;
                info!("session paused");
                out_events.push(Event::SessionPaused);
            } else {
                debug!(phase = ?world.phase, "pause ignored");
            }
        }
        Command::ResumeSession => {
            if world.phase == SessionPhase::Paused {
                world.phase = SessionPhase::Running;
                info!("session resumed");
                out_events.push(Event::SessionResumed);
            } else {
                debug!(phase = ?world.phase, "resume ignored");
            }
        }
        Command::SetMuted { muted } => {
            if world.muted != muted {
                world.muted = muted;
                out_events.push(Event::MuteChanged { muted });
            }
        }
        Command::ResetSession => {
            world.reset_run(out_events);
            info!("session reset");
        }
        Command::Tick { dt } => {
            if world.phase != SessionPhase::Running {
                return;
            }
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_entities(dt);
            world.cull_escaped();
            world.advance_scale(dt, out_events);
        }
        Command::MoveFormation {
            displacement,
            facing,
        } => {
            if world.phase == SessionPhase::Running {
                world.formation.displace(displacement, facing, world.viewport);
            }
        }
        Command::SpawnEnemy { kind, position } => {
            if world.phase == SessionPhase::Running {
                world.spawn_enemy(kind, position, out_events);
            }
        }
        Command::SpawnBoss { tier, position } => {
            if world.phase == SessionPhase::Running {
                progression::spawn_boss(world, tier, position, out_events);
            }
        }
        Command::FireProjectile { player, target } => {
            if world.phase == SessionPhase::Running {
                world.fire_projectile(player, target, out_events);
            }
        }
        Command::ResolveOverlap { overlap } => {
            if world.phase == SessionPhase::Running {
                combat::resolve(world, overlap, out_events);
            } else {
                debug!(phase = ?world.phase, "overlap outside running session ignored");
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use cat_siege_core::{
        EntityHandle, EntitySnapshot, PlayerSnapshot, PoolKind, PoolOccupancy, ProgressSnapshot,
        SessionSnapshot, SpawnRing, StageDefinition, StageTable, Viewport,
    };
    use glam::Vec2;

    use super::{World, CHASING_POOLS};
    use crate::pool::{EntityPool, EntityRecord};

    /// Captures the session lifecycle state.
    #[must_use]
    pub fn session(world: &World) -> SessionSnapshot {
        SessionSnapshot {
            phase: world.phase,
            stage: world.stage,
            score: world.score,
            elapsed: world.elapsed,
            muted: world.muted,
            scale_step: world.scale.step(),
        }
    }

    /// Captures the inputs of the boss threshold check.
    #[must_use]
    pub fn progress(world: &World) -> ProgressSnapshot {
        ProgressSnapshot {
            stage: world.stage,
            kills: world.kills,
            thresholds: world.thresholds,
            active_boss: world.boss,
            players: world.formation.len(),
        }
    }

    /// Active counts of the timer-spawned enemy pools.
    #[must_use]
    pub fn pool_occupancy(world: &World) -> PoolOccupancy {
        PoolOccupancy {
            regular: world.pools.get(PoolKind::Regular).active_count(),
            boss_dog: world.pools.get(PoolKind::BossDog).active_count(),
            boss_tank: world.pools.get(PoolKind::BossTank).active_count(),
        }
    }

    /// Provides read-only access to a pool.
    #[must_use]
    pub fn pool(world: &World, kind: PoolKind) -> &EntityPool {
        world.pools.get(kind)
    }

    /// Definition of the active stage.
    #[must_use]
    pub fn stage(world: &World) -> &StageDefinition {
        world.stage_definition()
    }

    /// The full stage table.
    #[must_use]
    pub fn stage_table(world: &World) -> &StageTable {
        &world.stages
    }

    /// Playfield dimensions.
    #[must_use]
    pub fn viewport(world: &World) -> Viewport {
        world.viewport
    }

    /// Band new enemies and bosses appear in.
    #[must_use]
    pub fn spawn_ring(world: &World) -> SpawnRing {
        SpawnRing::around(world.viewport)
    }

    /// Current center of the formation.
    #[must_use]
    pub fn formation_center(world: &World) -> Vec2 {
        world.formation.center()
    }

    /// Current background scale after shrink steps.
    #[must_use]
    pub fn background_scale(world: &World) -> f32 {
        world.scale.background_scale()
    }

    /// Ratio sprites spawned now are scaled by.
    #[must_use]
    pub fn scale_ratio(world: &World) -> f32 {
        world.scale.ratio()
    }

    /// Snapshots of the avatars in row order.
    #[must_use]
    pub fn players(world: &World) -> Vec<PlayerSnapshot> {
        world
            .formation
            .iter()
            .map(|(slot, avatar)| PlayerSnapshot {
                slot,
                position: avatar.position,
                health: avatar.health,
                scale: avatar.scale,
                body: avatar.body,
                facing: avatar.facing,
            })
            .collect()
    }

    /// Snapshots of every active enemy, the boss included.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EntitySnapshot> {
        CHASING_POOLS
            .iter()
            .flat_map(|kind| world.pools.get(*kind).iter())
            .map(|(handle, record)| snapshot(handle, record))
            .collect()
    }

    /// Snapshots of every projectile in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<EntitySnapshot> {
        world
            .pools
            .get(PoolKind::Projectile)
            .iter()
            .map(|(handle, record)| snapshot(handle, record))
            .collect()
    }

    /// Resolves a handle to a snapshot if it is still live.
    #[must_use]
    pub fn entity(world: &World, handle: EntityHandle) -> Option<EntitySnapshot> {
        world
            .pools
            .get(handle.pool())
            .get(handle)
            .map(|record| snapshot(handle, record))
    }

    fn snapshot(handle: EntityHandle, record: &EntityRecord) -> EntitySnapshot {
        EntitySnapshot {
            handle,
            kind: record.kind,
            position: record.position,
            health: record.health,
            scale: record.scale,
            body: record.body,
            facing: record.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_siege_core::{Overlap, MAX_SCALE_STEPS};

    fn running_world() -> World {
        let mut world = World::new(WorldConfig::classic(Viewport::new(800.0, 600.0)));
        let mut events = Vec::new();
        apply(&mut world, Command::StartSession, &mut events);
        world
    }

    #[test]
    fn new_world_holds_one_centred_avatar() {
        let world = World::new(WorldConfig::classic(Viewport::new(800.0, 600.0)));
        let players = query::players(&world);

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].position, Vec2::new(400.0, 300.0));
        assert_eq!(query::session(&world).phase, SessionPhase::NotStarted);
        assert_eq!(query::pool(&world, PoolKind::Regular).capacity(), 100);
        assert_eq!(query::pool(&world, PoolKind::BossDog).capacity(), 0);
    }

    #[test]
    fn tick_is_ignored_until_started() {
        let mut world = World::new(WorldConfig::classic(Viewport::new(800.0, 600.0)));
        let mut events = Vec::new();

        apply(&mut world, Command::Tick { dt: Duration::from_millis(16) }, &mut events);

        assert!(events.is_empty());
        assert_eq!(query::session(&world).elapsed, Duration::ZERO);
    }

    #[test]
    fn controls_are_idempotent() {
        let mut world = running_world();
        let mut events = Vec::new();

        apply(&mut world, Command::StartSession, &mut events);
        apply(&mut world, Command::ResumeSession, &mut events);
        apply(&mut world, Command::PauseSession, &mut events);
        apply(&mut world, Command::PauseSession, &mut events);
        apply(&mut world, Command::SetMuted { muted: false }, &mut events);

        assert_eq!(events, vec![Event::SessionPaused]);
    }

    #[test]
    fn spawned_enemy_faces_and_chases_the_lead_avatar() {
        let mut world = running_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Regular,
                position: Vec2::new(850.0, 300.0),
            },
            &mut events,
        );
        let handle = match events.as_slice() {
            [Event::EnemySpawned { handle, scale, .. }] => {
                assert!((scale - 0.6).abs() < 1e-6);
                *handle
            }
            other => panic!("unexpected events: {other:?}"),
        };

        apply(&mut world, Command::Tick { dt: Duration::from_secs(1) }, &mut events);

        let enemy = query::entity(&world, handle).expect("enemy alive");
        assert_eq!(enemy.facing, Facing::Left);
        assert!((enemy.position.x - 750.0).abs() < 1e-3);
    }

    #[test]
    fn final_boss_kind_is_never_pooled() {
        let mut world = running_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::BossWeini,
                position: Vec2::new(-50.0, -50.0),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }

    #[test]
    fn projectiles_leaving_the_playfield_are_released() {
        let mut world = running_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FireProjectile {
                player: PlayerSlot::new(0),
                target: Vec2::new(400.0, 0.0),
            },
            &mut events,
        );
        assert_eq!(query::projectiles(&world).len(), 1);

        apply(&mut world, Command::Tick { dt: Duration::from_secs(2) }, &mut events);

        assert!(query::projectiles(&world).is_empty());
    }

    #[test]
    fn projectile_scale_follows_ratio() {
        let mut world = running_world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::FireProjectile {
                player: PlayerSlot::new(0),
                target: Vec2::new(800.0, 300.0),
            },
            &mut events,
        );

        match events.as_slice() {
            [Event::ProjectileFired { scale, position, .. }] => {
                assert!((scale - 0.6).abs() < 1e-6);
                assert_eq!(*position, Vec2::new(400.0, 300.0));
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn overlaps_are_ignored_while_paused() {
        let mut world = running_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                kind: EnemyKind::Regular,
                position: Vec2::new(-20.0, 300.0),
            },
            &mut events,
        );
        apply(&mut world, Command::PauseSession, &mut events);
        events.clear();

        let enemy = query::enemies(&world)[0].handle;
        apply(
            &mut world,
            Command::ResolveOverlap {
                overlap: Overlap::EnemyPlayer {
                    enemy,
                    player: PlayerSlot::new(0),
                },
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::players(&world)[0].health, 1);
    }

    #[test]
    fn scale_steps_never_exceed_the_cap() {
        let mut world = running_world();
        for _ in 0..5 {
            let _ = world.scale.begin_step();
        }
        assert_eq!(query::session(&world).scale_step, MAX_SCALE_STEPS);
    }
}
