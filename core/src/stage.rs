//! Immutable stage definitions that parameterise every encounter phase.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, MAX_PLAYERS};

/// Minimum number of stages a table must define; stage indices 0..=3 are reachable.
pub const MIN_STAGES: usize = 4;

/// Per-slot avatar parameters for a stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSpec {
    /// Texture key used to render the avatar.
    pub texture: String,
    /// Hit points granted when the avatar joins the formation.
    pub health: u32,
    /// Movement speed of the formation center in pixels per second.
    pub speed: f32,
    /// Speed of projectiles fired by the avatar in pixels per second.
    pub bullet_speed: f32,
    /// Delay between volleys in milliseconds.
    #[serde(alias = "bulletRateMs")]
    pub bullet_rate: u64,
    /// Visual scale applied before the background ratio.
    pub scale: f32,
}

impl PlayerSpec {
    /// Delay between volleys as a [`Duration`].
    #[must_use]
    pub const fn volley_interval(&self) -> Duration {
        Duration::from_millis(self.bullet_rate)
    }
}

/// Parameters for a single enemy kind within a stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemySpec {
    /// Texture key used to render the enemy.
    pub texture: String,
    /// Hit points assigned on spawn.
    pub health: u32,
    /// Chase speed in pixels per second.
    pub speed: f32,
    /// Visual scale applied before the background ratio.
    pub scale: f32,
    /// Spawn timer period in milliseconds.
    #[serde(alias = "spawnRate")]
    pub spawn_interval_ms: u64,
    /// Maximum simultaneously active enemies of this kind.
    pub max_count: usize,
}

impl EnemySpec {
    /// Spawn timer period as a [`Duration`].
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

/// Enemy parameters keyed by kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRoster {
    /// Parameters for regular enemies.
    pub regular: EnemySpec,
    /// Parameters for dog bosses.
    pub boss_dog: EnemySpec,
    /// Parameters for tank bosses.
    pub boss_tank: EnemySpec,
    /// Parameters for the final boss.
    pub boss_weini: EnemySpec,
}

impl EnemyRoster {
    /// Looks up the parameters for the provided kind.
    #[must_use]
    pub const fn get(&self, kind: EnemyKind) -> &EnemySpec {
        match kind {
            EnemyKind::Regular => &self.regular,
            EnemyKind::BossDog => &self.boss_dog,
            EnemyKind::BossTank => &self.boss_tank,
            EnemyKind::BossWeini => &self.boss_weini,
        }
    }
}

/// A single ordered phase of the run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Human-readable stage name.
    pub name: String,
    /// Avatar parameters indexed by formation slot.
    pub players: Vec<PlayerSpec>,
    /// Enemy parameters keyed by kind.
    pub enemies: EnemyRoster,
}

impl StageDefinition {
    /// Avatar parameters for the provided formation slot.
    ///
    /// Slots past the listed specs reuse the last one.
    #[must_use]
    pub fn player(&self, slot: usize) -> &PlayerSpec {
        let last = self.players.len().saturating_sub(1);
        &self.players[slot.min(last)]
    }

    /// Parameters of the lead avatar, which drive formation speed and volley cadence.
    #[must_use]
    pub fn lead_player(&self) -> &PlayerSpec {
        self.player(0)
    }
}

/// Zero-based index into the [`StageTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageIndex(u32);

impl StageIndex {
    /// The opening stage.
    pub const INITIAL: Self = Self(0);
    /// The stage entered once the final boss first falls.
    pub const FINAL: Self = Self(3);

    /// Creates a stage index from its numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric value of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a stage table fails validation.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StageTableError {
    /// Fewer stages than the progression can reach.
    #[error("stage table defines {found} stages, at least {required} are required")]
    TooFewStages {
        /// Number of stages supplied.
        found: usize,
        /// Number of stages required.
        required: usize,
    },
    /// A stage lists fewer avatars than the formation can hold by then.
    #[error("stage `{stage}` lists {found} player specs, at least {required} are required")]
    MissingPlayers {
        /// Name of the offending stage.
        stage: String,
        /// Number of player specs supplied.
        found: usize,
        /// Number of player specs required.
        required: usize,
    },
    /// A stage lists more avatars than the formation can hold.
    #[error("stage `{stage}` lists {found} player specs, the formation holds at most {}", MAX_PLAYERS)]
    TooManyPlayers {
        /// Name of the offending stage.
        stage: String,
        /// Number of player specs supplied.
        found: usize,
    },
    /// An enemy or avatar entry would spawn an entity that is already dead.
    #[error("stage `{stage}` assigns zero health to `{texture}`")]
    ZeroHealth {
        /// Name of the offending stage.
        stage: String,
        /// Texture key of the offending spec.
        texture: String,
    },
}

/// Validated, ordered list of stage definitions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageTable {
    stages: Vec<StageDefinition>,
}

impl StageTable {
    /// Validates and wraps the provided stages.
    pub fn new(stages: Vec<StageDefinition>) -> Result<Self, StageTableError> {
        if stages.len() < MIN_STAGES {
            return Err(StageTableError::TooFewStages {
                found: stages.len(),
                required: MIN_STAGES,
            });
        }

        for (index, stage) in stages.iter().enumerate() {
            let required = (index + 1).min(MAX_PLAYERS);
            if stage.players.len() < required {
                return Err(StageTableError::MissingPlayers {
                    stage: stage.name.clone(),
                    found: stage.players.len(),
                    required,
                });
            }
            if stage.players.len() > MAX_PLAYERS {
                return Err(StageTableError::TooManyPlayers {
                    stage: stage.name.clone(),
                    found: stage.players.len(),
                });
            }

            let player_textures = stage
                .players
                .iter()
                .map(|player| (player.texture.as_str(), player.health));
            let enemy_textures = EnemyKind::ALL.iter().map(|kind| {
                let spec = stage.enemies.get(*kind);
                (spec.texture.as_str(), spec.health)
            });
            if let Some((texture, _)) = player_textures
                .chain(enemy_textures)
                .find(|(_, health)| *health == 0)
            {
                return Err(StageTableError::ZeroHealth {
                    stage: stage.name.clone(),
                    texture: texture.to_owned(),
                });
            }
        }

        Ok(Self { stages })
    }

    /// Retrieves the stage at the provided index.
    ///
    /// # Panics
    ///
    /// Panics if the index lies past the table; validated progression never produces one.
    #[must_use]
    pub fn stage(&self, index: StageIndex) -> &StageDefinition {
        &self.stages[index.get() as usize]
    }

    /// Number of stages in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Reports whether the table is empty; validated tables never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Iterator over the stages in progression order.
    pub fn iter(&self) -> impl Iterator<Item = &StageDefinition> {
        self.stages.iter()
    }

    /// The four-stage table the game ships with.
    #[must_use]
    pub fn classic() -> Self {
        let stages = vec![
            stage(
                "Initial Stage",
                players(1, 200.0, 400.0, 0.8),
                [
                    enemy("enemy", 1, 1_000, 100, 0.6),
                    enemy("bossDog", 6, 100_000, 0, 0.5),
                    enemy("bossTank", 12, 100_000, 0, 0.5),
                    enemy("bossWeini", 66, 100_000, 0, 0.5),
                ],
            ),
            stage(
                "BossDog Stage",
                players(2, 300.0, 380.0, 0.45),
                [
                    enemy("enemy", 1, 500, 200, 0.34),
                    enemy("bossDog", 6, 2_000, 25, 0.30),
                    enemy("bossTank", 12, 100_000, 0, 0.28),
                    enemy("bossWeini", 66, 100_000, 0, 0.5),
                ],
            ),
            stage(
                "BossTank Stage",
                players(3, 300.0, 360.0, 0.42),
                [
                    enemy("enemy", 1, 250, 300, 0.30),
                    enemy("bossDog", 6, 1_500, 30, 0.28),
                    enemy("bossTank", 12, 4_000, 15, 0.22),
                    enemy("bossWeini", 66, 100_000, 1, 0.6),
                ],
            ),
            stage(
                "BossWeini Stage",
                players(3, 300.0, 340.0, 0.40),
                [
                    enemy("enemy", 1, 100, 300, 0.28),
                    enemy("bossDog", 6, 1_125, 36, 0.26),
                    enemy("bossTank", 12, 3_000, 20, 0.20),
                    enemy("bossWeini", 66, 100_000, 1, 0.4),
                ],
            ),
        ];

        match Self::new(stages) {
            Ok(table) => table,
            Err(error) => unreachable!("built-in stage table is invalid: {error}"),
        }
    }
}

const AVATAR_TEXTURES: [&str; MAX_PLAYERS] = ["player", "playerDor", "playerXu"];

fn players(count: usize, speed: f32, bullet_speed: f32, scale: f32) -> Vec<PlayerSpec> {
    AVATAR_TEXTURES
        .iter()
        .take(count)
        .map(|texture| PlayerSpec {
            texture: (*texture).to_owned(),
            health: 1,
            speed,
            bullet_speed,
            bullet_rate: 500,
            scale,
        })
        .collect()
}

fn enemy(texture: &str, health: u32, interval_ms: u64, max_count: usize, scale: f32) -> EnemySpec {
    EnemySpec {
        texture: texture.to_owned(),
        health,
        speed: 100.0,
        scale,
        spawn_interval_ms: interval_ms,
        max_count,
    }
}

fn stage(name: &str, players: Vec<PlayerSpec>, enemies: [EnemySpec; 4]) -> StageDefinition {
    let [regular, boss_dog, boss_tank, boss_weini] = enemies;
    StageDefinition {
        name: name.to_owned(),
        players,
        enemies: EnemyRoster {
            regular,
            boss_dog,
            boss_tank,
            boss_weini,
        },
    }
}
