//! Scenario files describing the stage table and texture sizes of a run.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use cat_siege_core::{StageDefinition, StageTable, TextureAtlas, Viewport};
use cat_siege_world::WorldConfig;
use serde::Deserialize;

/// Scenario bundled with the runner, mirroring the built-in stage table.
pub(crate) const CLASSIC_SCENARIO: &str = include_str!("../scenarios/classic.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    textures: Option<TextureAtlas>,
    stages: Vec<StageDefinition>,
}

/// Reads and validates the scenario stored at `path`.
pub(crate) fn load(path: &Path, viewport: Viewport) -> Result<WorldConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario at {}", path.display()))?;
    parse(&contents, viewport)
        .with_context(|| format!("invalid scenario at {}", path.display()))
}

/// Parses scenario contents; textures default to the classic art set.
pub(crate) fn parse(contents: &str, viewport: Viewport) -> Result<WorldConfig> {
    let file: ScenarioFile =
        toml::from_str(contents).context("failed to parse scenario toml contents")?;
    let stages = StageTable::new(file.stages).context("stage table rejected")?;

    Ok(WorldConfig {
        stages,
        viewport,
        textures: file.textures.unwrap_or_else(TextureAtlas::classic),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cat_siege_core::{EnemyKind, StageIndex};

    fn viewport() -> Viewport {
        Viewport::new(1280.0, 720.0)
    }

    #[test]
    fn bundled_scenario_matches_the_builtin_table() {
        let config = parse(CLASSIC_SCENARIO, viewport()).expect("bundled scenario parses");

        let builtin = StageTable::classic();
        assert_eq!(config.stages.len(), builtin.len());
        for (loaded, expected) in config.stages.iter().zip(builtin.iter()) {
            assert_eq!(loaded, expected);
        }
        assert_eq!(config.textures, TextureAtlas::classic());
    }

    #[test]
    fn spawn_rate_is_accepted_as_an_alias() {
        let contents = CLASSIC_SCENARIO.replace("spawnIntervalMs", "spawnRate");
        let config = parse(&contents, viewport()).expect("aliased scenario parses");

        let spec = config
            .stages
            .stage(StageIndex::new(1))
            .enemies
            .get(EnemyKind::Regular);
        assert_eq!(spec.spawn_interval_ms, 500);
    }

    #[test]
    fn missing_textures_fall_back_to_the_classic_set() {
        let start = CLASSIC_SCENARIO
            .find("[[stages]]")
            .expect("bundled scenario lists stages");
        let config = parse(&CLASSIC_SCENARIO[start..], viewport()).expect("stages alone parse");

        assert_eq!(config.textures, TextureAtlas::classic());
    }

    #[test]
    fn short_stage_tables_are_rejected() {
        let cut = CLASSIC_SCENARIO
            .rfind("[[stages]]")
            .expect("bundled scenario lists stages");
        let error = parse(&CLASSIC_SCENARIO[..cut], viewport()).expect_err("three stages rejected");

        assert!(format!("{error:#}").contains("stage table rejected"));
    }

    #[test]
    fn unknown_keys_are_reported() {
        let contents = format!("difficulty = 3\n{CLASSIC_SCENARIO}");
        assert!(parse(&contents, viewport()).is_err());
    }
}
