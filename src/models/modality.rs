//! Modality: one bracket (format/gender x skill category) within a tournament.

use crate::models::player::PlayerId;
use crate::models::tournament::TournamentId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a modality.
pub type ModalityId = Uuid;

/// Format/gender axis of a modality. Each kind has its own category ladder.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModalityKind {
    MensDoubles,
    WomensDoubles,
    MixedDoubles,
}

const LETTER_LADDER: &[&str] = &["D", "C", "B", "A"];
const ORDINAL_LADDER: &[&str] = &["6th", "5th", "4th", "3rd", "2nd", "1st"];

impl ModalityKind {
    /// Categories from lowest to highest.
    pub fn ladder(self) -> &'static [&'static str] {
        match self {
            ModalityKind::MixedDoubles => LETTER_LADDER,
            ModalityKind::MensDoubles | ModalityKind::WomensDoubles => ORDINAL_LADDER,
        }
    }

    /// Position of `category` on this kind's ladder (0 = lowest).
    pub fn rank_of(self, category: &str) -> Option<usize> {
        self.ladder().iter().position(|c| c.eq_ignore_ascii_case(category))
    }

    /// The category one step above, or `None` at the top (or off-ladder).
    pub fn category_above(self, category: &str) -> Option<&'static str> {
        let rank = self.rank_of(category)?;
        self.ladder().get(rank + 1).copied()
    }
}

/// A modality within a tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modality {
    pub id: ModalityId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub kind: ModalityKind,
    /// Skill category label (on `kind`'s ladder).
    pub category: String,
    /// Key into the ranking points table.
    pub point_category: String,
    /// Bounds on active registrations checked by group generation.
    pub min_pairs: usize,
    pub max_pairs: usize,
    /// Display/processing order among the tournament's modalities.
    pub order: u32,
    /// Set once final-stage ranking points have been paid out.
    pub points_awarded: bool,
    pub bracket_generated_by: Option<PlayerId>,
    pub bracket_generated_at: Option<NaiveDateTime>,
}

impl Modality {
    pub fn new(
        tournament_id: TournamentId,
        name: impl Into<String>,
        kind: ModalityKind,
        category: impl Into<String>,
        point_category: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            kind,
            category: category.into(),
            point_category: point_category.into(),
            min_pairs: 3,
            max_pairs: 32,
            order: 0,
            points_awarded: false,
            bracket_generated_by: None,
            bracket_generated_at: None,
        }
    }
}
