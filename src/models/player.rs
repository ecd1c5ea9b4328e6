//! Player and Registration (a doubles pair entered into a modality).

use crate::models::modality::{ModalityId, ModalityKind};
use crate::models::game::FinalStage;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for a player.
pub type PlayerId = Uuid;

/// Unique identifier for a registration (pair).
pub type RegistrationId = Uuid;

/// City association a player plays under; CITY ranking rows carry it.
pub type AssociationId = Uuid;

/// A player known to the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub association_id: Option<AssociationId>,
    /// Current skill category per modality kind (e.g. mixed doubles "C").
    pub categories: BTreeMap<ModalityKind, String>,
}

impl Player {
    /// Create a new player with no association and no categories.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            association_id: None,
            categories: BTreeMap::new(),
        }
    }

    pub fn with_association(mut self, association_id: AssociationId) -> Self {
        self.association_id = Some(association_id);
        self
    }

    pub fn with_category(mut self, kind: ModalityKind, category: impl Into<String>) -> Self {
        self.categories.insert(kind, category.into());
        self
    }

    pub fn category(&self, kind: ModalityKind) -> Option<&str> {
        self.categories.get(&kind).map(String::as_str)
    }
}

/// Payment state of a registration. Informational only; the engine never gates on it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Two players entered together into one modality.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: RegistrationId,
    pub modality_id: ModalityId,
    pub player_a: PlayerId,
    pub player_b: PlayerId,
    /// 1-based rank within the modality, written by group formation.
    pub seed: Option<u32>,
    /// Sum of both players' prior points in the modality's kind and category.
    pub ranking_score: i64,
    pub payment: PaymentStatus,
    pub status: RegistrationStatus,
    pub registered_at: NaiveDateTime,
    /// Furthest stage reached, set when ranking points are awarded.
    pub final_stage: Option<FinalStage>,
}

impl Registration {
    pub fn new(
        modality_id: ModalityId,
        player_a: PlayerId,
        player_b: PlayerId,
        registered_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality_id,
            player_a,
            player_b,
            seed: None,
            ranking_score: 0,
            payment: PaymentStatus::Unpaid,
            status: RegistrationStatus::Pending,
            registered_at,
            final_stage: None,
        }
    }

    pub fn players(&self) -> [PlayerId; 2] {
        [self.player_a, self.player_b]
    }

    /// Pending and confirmed registrations take part in group formation.
    pub fn is_active(&self) -> bool {
        !matches!(self.status, RegistrationStatus::Cancelled)
    }
}
