//! Engine and server configuration.
//!
//! Settings are plain structs with defaults, passed explicitly to the store
//! rather than read from globals.

use crate::models::{FinalStage, TournamentError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Ranking points paid for each final stage in one point category.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct StagePoints {
    pub champion: i64,
    pub runner_up: i64,
    pub semifinalist: i64,
    pub quarterfinalist: i64,
    pub round_of_16: i64,
    pub group_stage: i64,
}

impl StagePoints {
    pub fn for_stage(&self, stage: FinalStage) -> i64 {
        match stage {
            FinalStage::Champion => self.champion,
            FinalStage::RunnerUp => self.runner_up,
            FinalStage::Semifinalist => self.semifinalist,
            FinalStage::Quarterfinalist => self.quarterfinalist,
            FinalStage::RoundOf16 => self.round_of_16,
            FinalStage::GroupStage => self.group_stage,
        }
    }

    fn scaled(base: i64) -> Self {
        Self {
            champion: base,
            runner_up: base * 6 / 10,
            semifinalist: base * 36 / 100,
            quarterfinalist: base * 18 / 100,
            round_of_16: base * 9 / 100,
            group_stage: base * 45 / 1000,
        }
    }
}

/// One line of a points table CSV file.
#[derive(Debug, Deserialize)]
struct PointsRow {
    category: String,
    champion: i64,
    runner_up: i64,
    semifinalist: i64,
    quarterfinalist: i64,
    round_of_16: i64,
    group_stage: i64,
}

/// Lookup from a modality's point category to its stage payouts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointsTable {
    categories: HashMap<String, StagePoints>,
}

impl Default for PointsTable {
    fn default() -> Self {
        let categories = [("P1000", 1000), ("P500", 500), ("P250", 250), ("P100", 100)]
            .into_iter()
            .map(|(name, base)| (name.to_string(), StagePoints::scaled(base)))
            .collect();
        Self { categories }
    }
}

impl PointsTable {
    pub fn empty() -> Self {
        Self {
            categories: HashMap::new(),
        }
    }

    pub fn insert(&mut self, category: impl Into<String>, points: StagePoints) {
        self.categories.insert(category.into(), points);
    }

    pub fn get(&self, category: &str) -> Option<&StagePoints> {
        self.categories.get(category)
    }

    /// Points for `stage` in `category`; unknown categories pay nothing.
    pub fn points(&self, category: &str, stage: FinalStage) -> i64 {
        match self.categories.get(category) {
            Some(p) => p.for_stage(stage),
            None => {
                log::warn!("No ranking points configured for point category {}", category);
                0
            }
        }
    }

    /// Parse a CSV table with header
    /// `category,champion,runner_up,semifinalist,quarterfinalist,round_of_16,group_stage`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TournamentError> {
        let mut table = Self::empty();
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        for row in rdr.deserialize::<PointsRow>() {
            let row = row.map_err(|e| TournamentError::PointsTable(e.to_string()))?;
            table.insert(
                row.category,
                StagePoints {
                    champion: row.champion,
                    runner_up: row.runner_up,
                    semifinalist: row.semifinalist,
                    quarterfinalist: row.quarterfinalist,
                    round_of_16: row.round_of_16,
                    group_stage: row.group_stage,
                },
            );
        }
        Ok(table)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TournamentError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            TournamentError::PointsTable(format!("{}: {}", path.as_ref().display(), e))
        })?;
        Self::from_reader(file)
    }
}

/// Tunables of the scheduling, standings and ranking rules.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Group-stage points for a win (a loss pays 0).
    pub points_per_win: u32,
    /// Most recent registrations considered for ascension.
    pub ascension_sample: usize,
    /// Consecutive finals that trigger automatic ascension.
    pub consecutive_finals: usize,
    /// Semifinal-or-better results that trigger a committee-reviewed ascension.
    pub semifinals_for_review: usize,
    pub points_table: PointsTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            points_per_win: 3,
            ascension_sample: 5,
            consecutive_finals: 2,
            semifinals_for_review: 3,
            points_table: PointsTable::default(),
        }
    }
}

/// Settings of the HTTP binary, read from the environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Optional CSV file replacing the built-in points table.
    pub points_table: Option<String>,
}

impl ServerConfig {
    /// Read `HOST`, `PORT` and `POINTS_TABLE`.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let points_table = std::env::var("POINTS_TABLE").ok();
        Self {
            host,
            port,
            points_table,
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig, TournamentError> {
        let mut config = EngineConfig::default();
        if let Some(path) = &self.points_table {
            config.points_table = PointsTable::from_path(path)?;
            log::info!("Loaded ranking points table from {}", path);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_points_table_csv() {
        let csv = "category,champion,runner_up,semifinalist,quarterfinalist,round_of_16,group_stage\n\
                   GOLD, 200, 120, 70, 35, 15, 5\n";
        let table = PointsTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.points("GOLD", FinalStage::Champion), 200);
        assert_eq!(table.points("GOLD", FinalStage::GroupStage), 5);
        assert_eq!(table.points("SILVER", FinalStage::Champion), 0);
    }

    #[test]
    fn rejects_malformed_rows() {
        let csv = "category,champion\nGOLD,abc\n";
        assert!(matches!(
            PointsTable::from_reader(csv.as_bytes()),
            Err(TournamentError::PointsTable(_))
        ));
    }

    #[test]
    fn default_table_pays_more_for_deeper_runs() {
        let table = PointsTable::default();
        let p = table.get("P1000").unwrap();
        assert!(p.champion > p.runner_up);
        assert!(p.runner_up > p.semifinalist);
        assert!(p.quarterfinalist > p.round_of_16);
        assert!(p.round_of_16 > p.group_stage);
    }
}
