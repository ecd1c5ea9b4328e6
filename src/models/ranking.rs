//! Ranking ledger rows and category-change records.

use crate::models::modality::ModalityKind;
use crate::models::player::{AssociationId, PlayerId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RankingId = Uuid;
pub type CategoryChangeId = Uuid;

/// Geographic breadth of a ranking ledger.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scope {
    City,
    National,
}

impl Scope {
    pub const ALL: [Scope; 2] = [Scope::City, Scope::National];
}

/// Aggregate results of one player in one (kind, category, scope).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranking {
    pub id: RankingId,
    pub player_id: PlayerId,
    pub kind: ModalityKind,
    pub category: String,
    pub scope: Scope,
    /// Only CITY rows carry an association.
    pub association_id: Option<AssociationId>,
    pub played: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: i64,
}

impl Ranking {
    pub fn new(
        player_id: PlayerId,
        kind: ModalityKind,
        category: impl Into<String>,
        scope: Scope,
        association_id: Option<AssociationId>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            player_id,
            kind,
            category: category.into(),
            scope,
            association_id: match scope {
                Scope::City => association_id,
                Scope::National => None,
            },
            played: 0,
            wins: 0,
            losses: 0,
            points: 0,
        }
    }

    pub fn reset(&mut self) {
        self.played = 0;
        self.wins = 0;
        self.losses = 0;
        self.points = 0;
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Ascension,
    Descent,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    Pending,
    Approved,
}

/// A promotion/demotion of a player between categories of one modality kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub id: CategoryChangeId,
    pub player_id: PlayerId,
    pub kind: ModalityKind,
    pub from_category: String,
    pub to_category: String,
    pub change_type: ChangeType,
    pub status: ChangeStatus,
    pub reason: String,
    pub auto_approved: bool,
    pub created_at: NaiveDateTime,
}
