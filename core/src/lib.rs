#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Cat Siege encounter simulator.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots, and
//! respond exclusively with new command batches.

mod stage;

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use stage::{
    EnemyRoster, EnemySpec, PlayerSpec, StageDefinition, StageIndex, StageTable, StageTableError,
    MIN_STAGES,
};

/// Title shown by adapters when a run boots.
pub const GAME_TITLE: &str = "Cat Siege";

/// Maximum number of avatars the formation can hold.
pub const MAX_PLAYERS: usize = 3;

/// Number of visual shrink steps a run can take.
pub const MAX_SCALE_STEPS: u8 = 3;

/// Period of the boss threshold check.
pub const BOSS_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Time a boss spawn attempt blocks further attempts.
pub const BOSS_SPAWN_COOLDOWN: Duration = Duration::from_millis(500);

/// Distance the spawn ring's outer edge extends past the viewport.
pub const SPAWN_OUTER_MARGIN: f32 = 100.0;

/// Distance the spawn ring's inner edge sits inside the viewport.
pub const SPAWN_INNER_MARGIN: f32 = 50.0;

/// Enemy categories that populate the encounter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EnemyKind {
    /// Rank-and-file enemy.
    Regular,
    /// First boss tier, later a pooled elite.
    BossDog,
    /// Second boss tier, later a pooled elite.
    BossTank,
    /// Final boss that loops indefinitely.
    BossWeini,
}

impl EnemyKind {
    /// Every enemy kind in progression order.
    pub const ALL: [Self; 4] = [Self::Regular, Self::BossDog, Self::BossTank, Self::BossWeini];

    /// Enemy kinds spawned by periodic timers into dedicated pools.
    pub const POOLED: [Self; 3] = [Self::Regular, Self::BossDog, Self::BossTank];

    /// Stable lowercase label used in logs and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::BossDog => "bossDog",
            Self::BossTank => "bossTank",
            Self::BossWeini => "bossWeini",
        }
    }
}

/// Closed enumeration of every simulated entity category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    /// Rank-and-file enemy.
    Regular,
    /// Dog boss or pooled dog elite.
    BossDog,
    /// Tank boss or pooled tank elite.
    BossTank,
    /// Final boss.
    BossWeini,
    /// Player avatar.
    Player,
    /// Player projectile.
    Projectile,
}

impl EntityKind {
    /// Returns the enemy kind, if this entity is an enemy.
    #[must_use]
    pub const fn enemy(self) -> Option<EnemyKind> {
        match self {
            Self::Regular => Some(EnemyKind::Regular),
            Self::BossDog => Some(EnemyKind::BossDog),
            Self::BossTank => Some(EnemyKind::BossTank),
            Self::BossWeini => Some(EnemyKind::BossWeini),
            Self::Player | Self::Projectile => None,
        }
    }
}

impl From<EnemyKind> for EntityKind {
    fn from(kind: EnemyKind) -> Self {
        match kind {
            EnemyKind::Regular => Self::Regular,
            EnemyKind::BossDog => Self::BossDog,
            EnemyKind::BossTank => Self::BossTank,
            EnemyKind::BossWeini => Self::BossWeini,
        }
    }
}

/// Tiers of the boss progression, in the order they appear.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossTier {
    /// Gatekeeper of stage 0.
    Dog,
    /// Gatekeeper of stage 1.
    Tank,
    /// Final boss, repeating from stage 2 onwards.
    Weini,
}

impl BossTier {
    /// Enemy kind whose parameters and texture the boss uses.
    #[must_use]
    pub const fn enemy_kind(self) -> EnemyKind {
        match self {
            Self::Dog => EnemyKind::BossDog,
            Self::Tank => EnemyKind::BossTank,
            Self::Weini => EnemyKind::BossWeini,
        }
    }

    /// Maps a boss enemy kind back to its tier.
    #[must_use]
    pub const fn from_enemy_kind(kind: EnemyKind) -> Option<Self> {
        match kind {
            EnemyKind::Regular => None,
            EnemyKind::BossDog => Some(Self::Dog),
            EnemyKind::BossTank => Some(Self::Tank),
            EnemyKind::BossWeini => Some(Self::Weini),
        }
    }

    /// Avatar that joins the formation when this tier is defeated.
    #[must_use]
    pub const fn reward_slot(self) -> Option<PlayerSlot> {
        match self {
            Self::Dog => Some(PlayerSlot::new(1)),
            Self::Tank => Some(PlayerSlot::new(2)),
            Self::Weini => None,
        }
    }
}

/// Storage pools that own entity slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PoolKind {
    /// Timer-spawned regular enemies.
    Regular,
    /// Timer-spawned dog elites.
    BossDog,
    /// Timer-spawned tank elites.
    BossTank,
    /// The single tiered boss slot.
    Boss,
    /// Player projectiles.
    Projectile,
}

impl PoolKind {
    /// Pools holding enemies; cleared whenever the stage advances.
    pub const ENEMY_POOLS: [Self; 3] = [Self::Regular, Self::BossDog, Self::BossTank];

    /// Pool that receives timer-spawned enemies of the provided kind.
    #[must_use]
    pub const fn for_enemy(kind: EnemyKind) -> Option<Self> {
        match kind {
            EnemyKind::Regular => Some(Self::Regular),
            EnemyKind::BossDog => Some(Self::BossDog),
            EnemyKind::BossTank => Some(Self::BossTank),
            EnemyKind::BossWeini => None,
        }
    }

    /// Reports whether the pool holds hostile entities.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        !matches!(self, Self::Projectile)
    }
}

/// Generation-checked reference to a pooled entity slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle {
    pool: PoolKind,
    index: u32,
    generation: u32,
}

impl EntityHandle {
    /// Creates a handle from its raw parts.
    #[must_use]
    pub const fn new(pool: PoolKind, index: u32, generation: u32) -> Self {
        Self {
            pool,
            index,
            generation,
        }
    }

    /// Pool that owns the referenced slot.
    #[must_use]
    pub const fn pool(&self) -> PoolKind {
        self.pool
    }

    /// Slot index within the pool.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when the handle was issued.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Stable identity of an avatar for the whole run.
///
/// The value also indexes the stage's player entries, so slot 1 is always
/// the avatar granted by the dog and slot 2 the one granted by the tank.
/// Slots never shift when another avatar leaves the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerSlot(u32);

impl PlayerSlot {
    /// The avatar every run starts with.
    pub const LEAD: Self = Self(0);

    /// Creates a slot identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the slot.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Horizontal direction a sprite faces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Sprite mirrored to look toward decreasing x.
    Left,
    /// Sprite drawn as authored, looking toward increasing x.
    #[default]
    Right,
}

impl Facing {
    /// Facing that looks from `origin` toward `target`.
    #[must_use]
    pub fn toward(origin: Vec2, target: Vec2) -> Self {
        if target.x < origin.x {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Facing implied by a horizontal velocity, if it has one.
    #[must_use]
    pub fn from_horizontal(dx: f32) -> Option<Self> {
        if dx < 0.0 {
            Some(Self::Left)
        } else if dx > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }

    /// Sign of the facing along the x axis.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Axis-aligned rectangle in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub fn from_origin_and_size(origin: Vec2, size: Vec2) -> Self {
        Self {
            min: origin,
            max: origin + size.max(Vec2::ZERO),
        }
    }

    /// Creates a rectangle centred on `center` with the provided size.
    #[must_use]
    pub fn from_center_and_size(center: Vec2, size: Vec2) -> Self {
        let half = size.max(Vec2::ZERO) * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Top-left corner.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Bottom-right corner.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Enclosed area.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the rectangle grown by `margin` on every side; negative margins shrink it.
    #[must_use]
    pub fn expanded(&self, margin: f32) -> Self {
        let min = self.min - Vec2::splat(margin);
        let max = (self.max + Vec2::splat(margin)).max(min);
        Self { min, max }
    }

    /// Reports whether the point lies inside or on the edge of the rectangle.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// Reports whether two rectangles share interior area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

/// Dimensions of the visible playfield in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    width: f32,
    height: f32,
}

impl Viewport {
    /// Creates a viewport description.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width of the playfield.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Height of the playfield.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Centre of the playfield.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width, self.height) * 0.5
    }

    /// Rectangle covering the playfield.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_and_size(Vec2::ZERO, Vec2::new(self.width, self.height))
    }
}

/// Off-screen band new enemies appear in: inside `outer`, outside `inner`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRing {
    /// Outer edge of the band.
    pub outer: Rect,
    /// Inner edge of the band.
    pub inner: Rect,
}

impl SpawnRing {
    /// Builds the standard ring for a viewport.
    #[must_use]
    pub fn around(viewport: Viewport) -> Self {
        let bounds = viewport.bounds();
        Self {
            outer: bounds.expanded(SPAWN_OUTER_MARGIN),
            inner: bounds.expanded(-SPAWN_INNER_MARGIN),
        }
    }

    /// Reports whether the point lies within the band.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        self.outer.contains(point) && !self.inner.contains(point)
    }
}

/// Pixel sizes of the textures entities are drawn with.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureAtlas {
    sizes: BTreeMap<String, [f32; 2]>,
}

impl TextureAtlas {
    /// Size assumed for textures the atlas does not list.
    pub const FALLBACK_SIZE: Vec2 = Vec2::new(64.0, 64.0);

    /// Creates an atlas from `(name, [width, height])` pairs.
    #[must_use]
    pub fn from_sizes<I, S>(sizes: I) -> Self
    where
        I: IntoIterator<Item = (S, [f32; 2])>,
        S: Into<String>,
    {
        Self {
            sizes: sizes
                .into_iter()
                .map(|(name, size)| (name.into(), size))
                .collect(),
        }
    }

    /// Texture sizes the classic art set ships with.
    #[must_use]
    pub fn classic() -> Self {
        Self::from_sizes([
            ("bg", [1920.0, 1080.0]),
            ("player", [96.0, 96.0]),
            ("playerDor", [96.0, 96.0]),
            ("playerXu", [96.0, 96.0]),
            ("enemy", [80.0, 80.0]),
            ("bossDog", [160.0, 160.0]),
            ("bossTank", [200.0, 160.0]),
            ("bossWeini", [240.0, 240.0]),
            ("bullet", [32.0, 32.0]),
        ])
    }

    /// Looks up a texture size.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Vec2> {
        self.sizes.get(name).map(|[width, height]| Vec2::new(*width, *height))
    }

    /// Looks up a texture size, substituting [`Self::FALLBACK_SIZE`] for unknown names.
    #[must_use]
    pub fn size_or_fallback(&self, name: &str) -> Vec2 {
        self.get(name).unwrap_or(Self::FALLBACK_SIZE)
    }
}

/// Kill tallies per enemy kind for the whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KillCounters {
    regular: u32,
    boss_dog: u32,
    boss_tank: u32,
    boss_weini: u32,
}

impl KillCounters {
    /// Number of recorded kills for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Regular => self.regular,
            EnemyKind::BossDog => self.boss_dog,
            EnemyKind::BossTank => self.boss_tank,
            EnemyKind::BossWeini => self.boss_weini,
        }
    }

    /// Records one kill and returns the new tally.
    pub fn record(&mut self, kind: EnemyKind) -> u32 {
        let counter = match kind {
            EnemyKind::Regular => &mut self.regular,
            EnemyKind::BossDog => &mut self.boss_dog,
            EnemyKind::BossTank => &mut self.boss_tank,
            EnemyKind::BossWeini => &mut self.boss_weini,
        };
        *counter = counter.saturating_add(1);
        *counter
    }

    /// Sum of every tally.
    #[must_use]
    pub fn total(&self) -> u64 {
        EnemyKind::ALL
            .iter()
            .map(|kind| u64::from(self.get(*kind)))
            .sum()
    }
}

/// Kill thresholds that gate each boss tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BossThresholds {
    /// Regular kills required before the dog boss appears.
    pub enemy_kills_for_dog: u32,
    /// Dog kills required before the tank boss appears.
    pub dog_kills_for_tank: u32,
    /// Tank kills required before the final boss appears; doubles on each final-boss defeat.
    pub tank_kills_for_final: u32,
}

impl Default for BossThresholds {
    fn default() -> Self {
        Self {
            enemy_kills_for_dog: 30,
            dog_kills_for_tank: 20,
            tank_kills_for_final: 15,
        }
    }
}

impl BossThresholds {
    /// Enemy kind whose kills gate the tier, and the number required.
    #[must_use]
    pub const fn gate(&self, tier: BossTier) -> (EnemyKind, u32) {
        match tier {
            BossTier::Dog => (EnemyKind::Regular, self.enemy_kills_for_dog),
            BossTier::Tank => (EnemyKind::BossDog, self.dog_kills_for_tank),
            BossTier::Weini => (EnemyKind::BossTank, self.tank_kills_for_final),
        }
    }

    /// Doubles the final-boss threshold, saturating at `u32::MAX`.
    pub fn escalate_final(&mut self) {
        self.tank_kills_for_final = self.tank_kills_for_final.saturating_mul(2);
    }
}

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Waiting on the start control.
    #[default]
    NotStarted,
    /// Simulation advancing.
    Running,
    /// Simulation frozen by the player.
    Paused,
    /// Formation wiped out; simulation frozen until reset.
    GameOver,
}

/// Keyboard direction state for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirectionKeys {
    /// Up key held.
    pub up: bool,
    /// Down key held.
    pub down: bool,
    /// Left key held.
    pub left: bool,
    /// Right key held.
    pub right: bool,
}

impl DirectionKeys {
    /// Reports whether any direction key is held.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Movement intent supplied by the input layer for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum MovementInput {
    /// No movement requested.
    #[default]
    Idle,
    /// Discrete four-axis keyboard movement.
    Keys(DirectionKeys),
    /// Pointer drag toward a point in world pixels.
    Drag {
        /// Point the formation should travel toward.
        target: Vec2,
    },
}

/// Pair of overlapping entities reported by the physics layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Overlap {
    /// A projectile touched an enemy.
    ProjectileEnemy {
        /// Projectile involved in the contact.
        projectile: EntityHandle,
        /// Enemy involved in the contact.
        enemy: EntityHandle,
    },
    /// An enemy touched an avatar.
    EnemyPlayer {
        /// Enemy involved in the contact.
        enemy: EntityHandle,
        /// Avatar involved in the contact.
        player: PlayerSlot,
    },
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Begins a run, or restarts one that ended.
    StartSession,
    /// Freezes a running session.
    PauseSession,
    /// Unfreezes a paused session.
    ResumeSession,
    /// Sets whether audio collaborators should stay silent.
    SetMuted {
        /// Desired muted state.
        muted: bool,
    },
    /// Restores every piece of run state to its stage-0 defaults.
    ResetSession,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Displaces the formation center.
    MoveFormation {
        /// Offset applied before clamping, in pixels.
        displacement: Vec2,
        /// Facing applied to every avatar, if the movement had a horizontal component.
        facing: Option<Facing>,
    },
    /// Requests a timer-driven enemy spawn.
    SpawnEnemy {
        /// Kind of enemy to spawn.
        kind: EnemyKind,
        /// Spawn location.
        position: Vec2,
    },
    /// Requests the tiered boss spawn.
    SpawnBoss {
        /// Tier to spawn.
        tier: BossTier,
        /// Spawn location.
        position: Vec2,
    },
    /// Requests a projectile from an avatar toward a point.
    FireProjectile {
        /// Avatar that fires.
        player: PlayerSlot,
        /// Point the projectile heads toward.
        target: Vec2,
    },
    /// Resolves one overlap reported by the physics layer.
    ResolveOverlap {
        /// The overlapping pair.
        overlap: Overlap,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The session entered the running phase.
    SessionStarted,
    /// The session was frozen.
    SessionPaused,
    /// The session was unfrozen.
    SessionResumed,
    /// The muted flag changed.
    MuteChanged {
        /// New muted state.
        muted: bool,
    },
    /// All run state returned to its stage-0 defaults.
    SessionReset,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// A timer-driven enemy entered the playfield.
    EnemySpawned {
        /// Handle of the new enemy.
        handle: EntityHandle,
        /// Kind of the new enemy.
        kind: EnemyKind,
        /// Spawn location.
        position: Vec2,
        /// Visual scale applied on spawn.
        scale: f32,
    },
    /// The tiered boss entered the playfield.
    BossSpawned {
        /// Handle of the boss.
        handle: EntityHandle,
        /// Tier of the boss.
        tier: BossTier,
        /// Spawn location.
        position: Vec2,
        /// Visual scale applied on spawn.
        scale: f32,
    },
    /// An avatar fired a projectile.
    ProjectileFired {
        /// Handle of the projectile.
        handle: EntityHandle,
        /// Avatar that fired.
        player: PlayerSlot,
        /// Launch position.
        position: Vec2,
        /// Visual scale applied on launch.
        scale: f32,
    },
    /// An entity lost one point of health.
    EntityHit {
        /// Kind of the entity that was hit.
        kind: EntityKind,
    },
    /// An entity's health reached zero.
    EntityDied {
        /// Kind of the entity that died.
        kind: EntityKind,
    },
    /// The score changed.
    ScoreChanged {
        /// New score.
        score: u64,
    },
    /// A pooled enemy kill was tallied.
    KillRecorded {
        /// Kind whose tally grew.
        kind: EnemyKind,
        /// New tally for the kind.
        total: u32,
    },
    /// The tiered boss fell.
    BossDefeated {
        /// Tier that fell.
        tier: BossTier,
    },
    /// The active stage was (re)applied; timers and capacities follow it.
    StageChanged {
        /// Stage now in effect.
        stage: StageIndex,
    },
    /// Every enemy pool was emptied.
    PoolsCleared,
    /// A visual shrink step began.
    ScaleStepStarted {
        /// Step number, 1 to 3.
        step: u8,
        /// Background ratio the step settles on.
        ratio: f32,
    },
    /// A visual shrink step finished and collision bodies were re-derived.
    ScaleStepCompleted {
        /// Step number, 1 to 3.
        step: u8,
    },
    /// An avatar joined the formation.
    PlayerAdded {
        /// Row position of the new avatar.
        slot: PlayerSlot,
    },
    /// An avatar left the formation.
    PlayerRemoved {
        /// Row position the avatar occupied.
        slot: PlayerSlot,
    },
    /// The formation was wiped out.
    GameOver {
        /// Final score.
        score: u64,
        /// Final kill tallies.
        kills: KillCounters,
    },
}

/// Read-only summary of session state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionSnapshot {
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Active stage.
    pub stage: StageIndex,
    /// Current score.
    pub score: u64,
    /// Simulated time spent running.
    pub elapsed: Duration,
    /// Whether audio is muted.
    pub muted: bool,
    /// Number of shrink steps started so far.
    pub scale_step: u8,
}

/// Read-only summary of boss progression inputs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressSnapshot {
    /// Active stage.
    pub stage: StageIndex,
    /// Kill tallies.
    pub kills: KillCounters,
    /// Current thresholds.
    pub thresholds: BossThresholds,
    /// Tier of the active boss, if one is alive.
    pub active_boss: Option<BossTier>,
    /// Number of avatars in the formation.
    pub players: usize,
}

/// Active counts of the timer-spawned enemy pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolOccupancy {
    /// Active regular enemies.
    pub regular: usize,
    /// Active dog elites.
    pub boss_dog: usize,
    /// Active tank elites.
    pub boss_tank: usize,
}

impl PoolOccupancy {
    /// Active count for a timer-spawned kind; the final boss is never pooled.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> usize {
        match kind {
            EnemyKind::Regular => self.regular,
            EnemyKind::BossDog => self.boss_dog,
            EnemyKind::BossTank => self.boss_tank,
            EnemyKind::BossWeini => 0,
        }
    }
}

/// Immutable representation of an avatar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Stable avatar identity.
    pub slot: PlayerSlot,
    /// Position in world pixels.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Visual scale.
    pub scale: f32,
    /// Collision body size.
    pub body: Vec2,
    /// Facing.
    pub facing: Facing,
}

/// Immutable representation of a pooled entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Handle of the entity.
    pub handle: EntityHandle,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Position in world pixels.
    pub position: Vec2,
    /// Remaining health.
    pub health: u32,
    /// Visual scale.
    pub scale: f32,
    /// Collision body size.
    pub body: Vec2,
    /// Facing.
    pub facing: Facing,
}

impl EntitySnapshot {
    /// Collision rectangle centred on the entity.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center_and_size(self.position, self.body)
    }
}

impl PlayerSnapshot {
    /// Collision rectangle centred on the avatar.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::from_center_and_size(self.position, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_follows_relative_position() {
        let origin = Vec2::new(100.0, 0.0);
        assert_eq!(Facing::toward(origin, Vec2::new(50.0, 0.0)), Facing::Left);
        assert_eq!(Facing::toward(origin, Vec2::new(150.0, 0.0)), Facing::Right);
        assert_eq!(Facing::from_horizontal(0.0), None);
    }

    #[test]
    fn spawn_ring_excludes_visible_interior() {
        let ring = SpawnRing::around(Viewport::new(800.0, 600.0));
        assert!(ring.contains(Vec2::new(-80.0, 300.0)));
        assert!(ring.contains(Vec2::new(20.0, 20.0)));
        assert!(!ring.contains(Vec2::new(400.0, 300.0)));
        assert!(!ring.contains(Vec2::new(-150.0, 300.0)));
    }

    #[test]
    fn kill_counters_track_each_kind() {
        let mut kills = KillCounters::default();
        assert_eq!(kills.record(EnemyKind::Regular), 1);
        assert_eq!(kills.record(EnemyKind::Regular), 2);
        assert_eq!(kills.record(EnemyKind::BossWeini), 1);
        assert_eq!(kills.get(EnemyKind::BossDog), 0);
        assert_eq!(kills.total(), 3);
    }

    #[test]
    fn final_threshold_doubles_and_saturates() {
        let mut thresholds = BossThresholds::default();
        thresholds.escalate_final();
        assert_eq!(thresholds.tank_kills_for_final, 30);

        thresholds.tank_kills_for_final = u32::MAX - 1;
        thresholds.escalate_final();
        assert_eq!(thresholds.tank_kills_for_final, u32::MAX);
    }

    #[test]
    fn boss_gates_follow_progression() {
        let thresholds = BossThresholds::default();
        assert_eq!(thresholds.gate(BossTier::Dog), (EnemyKind::Regular, 30));
        assert_eq!(thresholds.gate(BossTier::Tank), (EnemyKind::BossDog, 20));
        assert_eq!(thresholds.gate(BossTier::Weini), (EnemyKind::BossTank, 15));
    }

    #[test]
    fn each_tier_grants_a_fixed_avatar() {
        assert_eq!(BossTier::Dog.reward_slot(), Some(PlayerSlot::new(1)));
        assert_eq!(BossTier::Tank.reward_slot(), Some(PlayerSlot::new(2)));
        assert_eq!(BossTier::Weini.reward_slot(), None);
        assert_eq!(PlayerSlot::LEAD.get(), 0);
    }

    #[test]
    fn stage_table_round_trips_through_bincode() {
        let stage = StageTable::classic().stage(StageIndex::new(1)).clone();
        let bytes = bincode::serialize(&stage).expect("serialize");
        let restored: StageDefinition = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, stage);
    }
}
