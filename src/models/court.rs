//! Courts, their opening windows, and the bookable slots derived from them.

use crate::models::tournament::TournamentId;
use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CourtId = Uuid;
pub type SlotId = Uuid;

/// Which days an availability window applies to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityDay {
    /// Every matching weekday inside the tournament range.
    Weekday(Weekday),
    /// One specific calendar date.
    Date(NaiveDate),
}

/// Opening hours of a court on some day(s).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    pub day: AvailabilityDay,
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Availability {
    pub fn applies_to(&self, date: NaiveDate) -> bool {
        match self.day {
            AvailabilityDay::Weekday(w) => date.weekday() == w,
            AvailabilityDay::Date(d) => d == date,
        }
    }
}

/// A physical court of a tournament.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Court {
    pub id: CourtId,
    pub tournament_id: TournamentId,
    pub name: String,
    pub availability: Vec<Availability>,
}

impl Court {
    pub fn new(tournament_id: TournamentId, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            name: name.into(),
            availability: Vec::new(),
        }
    }

    pub fn open_on(mut self, day: AvailabilityDay, open: NaiveTime, close: NaiveTime) -> Self {
        self.availability.push(Availability { day, open, close });
        self
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlotStatus {
    /// Free; the slot generator may delete and recreate it.
    #[default]
    Available,
    /// Backs exactly one match.
    Assigned,
    /// Held manually by an organiser.
    Reserved,
    Blocked,
}

/// A concrete bookable range on one court.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub tournament_id: TournamentId,
    pub court_id: CourtId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: SlotStatus,
}

impl Slot {
    pub fn new(
        tournament_id: TournamentId,
        court_id: CourtId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            tournament_id,
            court_id,
            date,
            start,
            end,
            status: SlotStatus::Available,
        }
    }
}
