//! Run report assembled from encounter callbacks.

use std::fmt;

use cat_siege_core::{
    BossTier, EnemyKind, EntityKind, KillCounters, PlayerSlot, ProgressSnapshot,
    SessionSnapshot, StageIndex,
};
use cat_siege_session::EncounterObserver;
use glam::Vec2;

/// Tallies what happened during a run.
#[derive(Debug, Default)]
pub(crate) struct RunReport {
    enemies_spawned: u64,
    boss_kind_spawns: u64,
    bosses_spawned: u64,
    projectiles_fired: u64,
    hits: u64,
    deaths: u64,
    players_joined: u32,
    players_lost: u32,
    highest_stage: u32,
    game_over: Option<u64>,
}

impl RunReport {
    /// Pairs the tallies with the final session state for printing.
    pub(crate) fn summary<'a>(
        &'a self,
        session: &'a SessionSnapshot,
        progress: &'a ProgressSnapshot,
    ) -> Summary<'a> {
        Summary {
            report: self,
            session,
            progress,
        }
    }
}

impl EncounterObserver for RunReport {
    fn on_spawn(&mut self, kind: EntityKind, _position: Vec2, _scale: f32) {
        match kind {
            EntityKind::Regular => self.enemies_spawned += 1,
            EntityKind::BossDog | EntityKind::BossTank | EntityKind::BossWeini => {
                self.boss_kind_spawns += 1;
            }
            EntityKind::Projectile => self.projectiles_fired += 1,
            EntityKind::Player => {}
        }
    }

    fn on_boss_spawn(&mut self, _tier: BossTier) {
        self.bosses_spawned += 1;
    }

    fn on_hit(&mut self, _kind: EntityKind) {
        self.hits += 1;
    }

    fn on_death(&mut self, _kind: EntityKind) {
        self.deaths += 1;
    }

    fn on_stage_change(&mut self, stage: StageIndex) {
        self.highest_stage = self.highest_stage.max(stage.get());
    }

    fn on_player_added(&mut self, _slot: PlayerSlot) {
        self.players_joined += 1;
    }

    fn on_player_removed(&mut self, _slot: PlayerSlot) {
        self.players_lost += 1;
    }

    fn on_game_over(&mut self, score: u64, _kills: &KillCounters) {
        self.game_over = Some(score);
    }
}

/// Printable view over a finished run.
#[derive(Debug)]
pub(crate) struct Summary<'a> {
    report: &'a RunReport,
    session: &'a SessionSnapshot,
    progress: &'a ProgressSnapshot,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        match report.game_over {
            Some(score) => writeln!(f, "game over with score {score}")?,
            None => writeln!(f, "survived with score {}", self.session.score)?,
        }
        writeln!(
            f,
            "elapsed {:.1}s, stage {} (highest {}), scale step {}",
            self.session.elapsed.as_secs_f32(),
            self.session.stage.get(),
            report.highest_stage,
            self.session.scale_step,
        )?;
        writeln!(
            f,
            "spawned {} enemies, {} elites and {} bosses, fired {} projectiles",
            report.enemies_spawned,
            report.boss_kind_spawns.saturating_sub(report.bosses_spawned),
            report.bosses_spawned,
            report.projectiles_fired,
        )?;
        writeln!(
            f,
            "{} hits, {} deaths, avatars joined {} lost {}",
            report.hits, report.deaths, report.players_joined, report.players_lost,
        )?;
        write!(f, "kills:")?;
        for kind in EnemyKind::ALL {
            write!(f, " {}={}", kind.label(), self.progress.kills.get(kind))?;
        }
        Ok(())
    }
}
