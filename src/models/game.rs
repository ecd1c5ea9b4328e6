//! Match (game), its phase, winner side and set scores.

use crate::models::court::SlotId;
use crate::models::group::GroupId;
use crate::models::modality::ModalityId;
use crate::models::player::RegistrationId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side won the match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Winner {
    #[default]
    None,
    TeamA,
    TeamB,
}

impl Winner {
    pub fn is_decided(self) -> bool {
        !matches!(self, Winner::None)
    }
}

/// Side of a match a registration occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

/// Phase of the tournament this match belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    GroupStage,
    PreliminaryRound,
    RoundOf32,
    RoundOf16,
    Quarterfinal,
    Semifinal,
    Final,
    /// Knockout round with no dedicated name (more than 32 pairs).
    Knockout,
}

impl Phase {
    /// Phase of a knockout round that starts with `pairs` entrants.
    pub fn for_round_size(pairs: usize) -> Phase {
        match pairs {
            2 => Phase::Final,
            4 => Phase::Semifinal,
            8 => Phase::Quarterfinal,
            16 => Phase::RoundOf16,
            32 => Phase::RoundOf32,
            _ => Phase::Knockout,
        }
    }

    pub fn round_name(self, pairs: usize) -> String {
        match self {
            Phase::GroupStage => "Group Stage".to_string(),
            Phase::PreliminaryRound => "Preliminary Round".to_string(),
            Phase::RoundOf32 => "Round of 32".to_string(),
            Phase::RoundOf16 => "Round of 16".to_string(),
            Phase::Quarterfinal => "Quarterfinal".to_string(),
            Phase::Semifinal => "Semifinal".to_string(),
            Phase::Final => "Final".to_string(),
            Phase::Knockout => format!("Round of {}", pairs),
        }
    }

    pub fn is_knockout(self) -> bool {
        !matches!(self, Phase::GroupStage)
    }
}

/// Furthest point a pair reached in a modality, used for ranking payouts
/// and ascension history.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalStage {
    GroupStage,
    RoundOf16,
    Quarterfinalist,
    Semifinalist,
    RunnerUp,
    Champion,
}

impl FinalStage {
    /// Stage for a pair knocked out `rounds_back` rounds before the final
    /// (0 = lost the final).
    pub fn eliminated_rounds_back(rounds_back: u32) -> FinalStage {
        match rounds_back {
            0 => FinalStage::RunnerUp,
            1 => FinalStage::Semifinalist,
            2 => FinalStage::Quarterfinalist,
            3 => FinalStage::RoundOf16,
            _ => FinalStage::GroupStage,
        }
    }

    pub fn reached_final(self) -> bool {
        self >= FinalStage::RunnerUp
    }

    pub fn semifinal_or_better(self) -> bool {
        self >= FinalStage::Semifinalist
    }
}

/// Games won by each side in one set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct SetScore {
    pub team_a: u32,
    pub team_b: u32,
}

impl SetScore {
    pub fn new(team_a: u32, team_b: u32) -> Self {
        Self { team_a, team_b }
    }

    /// Winner of the set; level sets count for nobody.
    pub fn winner(&self) -> Winner {
        use std::cmp::Ordering::*;
        match self.team_a.cmp(&self.team_b) {
            Greater => Winner::TeamA,
            Less => Winner::TeamB,
            Equal => Winner::None,
        }
    }
}

/// A single match between two registrations. Knockout placeholders start
/// with empty sides that advancement fills in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameMatch {
    pub id: MatchId,
    pub modality_id: ModalityId,
    pub phase: Phase,
    pub name: String,
    /// 1-based round number within the phase sequence.
    pub round_order: u32,
    /// 1-based position within the round.
    pub match_order: u32,
    pub group_id: Option<GroupId>,
    pub team_a: Option<RegistrationId>,
    pub team_b: Option<RegistrationId>,
    pub winner: Winner,
    pub sets: Vec<SetScore>,
    pub slot_id: Option<SlotId>,
    pub scheduled_at: Option<NaiveDateTime>,
    pub court_label: Option<String>,
}

impl GameMatch {
    pub fn new(
        modality_id: ModalityId,
        phase: Phase,
        name: impl Into<String>,
        round_order: u32,
        match_order: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            modality_id,
            phase,
            name: name.into(),
            round_order,
            match_order,
            group_id: None,
            team_a: None,
            team_b: None,
            winner: Winner::None,
            sets: Vec::new(),
            slot_id: None,
            scheduled_at: None,
            court_label: None,
        }
    }

    pub fn with_teams(
        mut self,
        team_a: Option<RegistrationId>,
        team_b: Option<RegistrationId>,
    ) -> Self {
        self.team_a = team_a;
        self.team_b = team_b;
        self
    }

    pub fn teams(&self) -> impl Iterator<Item = RegistrationId> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).copied()
    }

    pub fn involves(&self, registration: RegistrationId) -> bool {
        self.team_a == Some(registration) || self.team_b == Some(registration)
    }

    pub fn winning_team(&self) -> Option<RegistrationId> {
        match self.winner {
            Winner::TeamA => self.team_a,
            Winner::TeamB => self.team_b,
            Winner::None => None,
        }
    }

    pub fn losing_team(&self) -> Option<RegistrationId> {
        match self.winner {
            Winner::TeamA => self.team_b,
            Winner::TeamB => self.team_a,
            Winner::None => None,
        }
    }

    pub fn set_side(&mut self, side: Side, registration: RegistrationId) {
        match side {
            Side::A => self.team_a = Some(registration),
            Side::B => self.team_b = Some(registration),
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.slot_id.is_some()
    }
}
