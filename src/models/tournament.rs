//! Tournament, TournamentStatus and the engine-wide error type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

/// Owning club of a tournament.
pub type ClubId = Uuid;

/// Errors that can occur during tournament operations.
///
/// Every variant renders a message that can be shown to an organiser as-is.
#[derive(Clone, Debug, PartialEq)]
pub enum TournamentError {
    TournamentNotFound(Uuid),
    ModalityNotFound(Uuid),
    MatchNotFound(Uuid),
    PlayerNotFound(Uuid),
    RegistrationNotFound(Uuid),
    GroupNotFound(Uuid),
    CategoryChangeNotFound(Uuid),
    /// The operation is not legal while the tournament is in this status.
    InvalidState {
        operation: &'static str,
        status: TournamentStatus,
    },
    /// Fewer registrations than the modality minimum.
    NotEnoughRegistrations { required: usize, found: usize },
    /// More registrations than the modality accepts.
    TooManyRegistrations { allowed: usize, found: usize },
    /// The registration count cannot be split into groups of 3 and 4.
    ImpossibleGroupSplit(usize),
    NoCourts,
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    InvalidMatchDuration(i64),
    /// Bracket generation requested before groups exist.
    NoGroups,
    /// A group has fewer than two ranked entrants.
    IncompleteStandings { group: String },
    NotEnoughQualifiers(usize),
    /// A match already carries a winner.
    ResultAlreadyRecorded(Uuid),
    /// A winner was given for a match that does not have both pairs yet.
    MatchNotReady(Uuid),
    /// Groups or the bracket cannot be regenerated over recorded results.
    ResultsAlreadyRecorded { modality: String },
    /// A regeneration plan was computed against an outdated snapshot.
    StaleGeneration { expected: u64, found: u64 },
    /// A player already has a pending category change for this modality kind.
    PendingCategoryChange(Uuid),
    /// The category is not on the ladder or the change makes no move.
    InvalidCategory(String),
    /// The change is not pending any more.
    CategoryChangeNotPending(Uuid),
    PointsTable(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::TournamentNotFound(id) => write!(f, "Tournament {} not found", id),
            TournamentError::ModalityNotFound(id) => write!(f, "Modality {} not found", id),
            TournamentError::MatchNotFound(id) => write!(f, "Match {} not found", id),
            TournamentError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            TournamentError::RegistrationNotFound(id) => write!(f, "Registration {} not found", id),
            TournamentError::GroupNotFound(id) => write!(f, "Group {} not found", id),
            TournamentError::CategoryChangeNotFound(id) => {
                write!(f, "Category change {} not found", id)
            }
            TournamentError::InvalidState { operation, status } => {
                write!(f, "Cannot {} while the tournament is {}", operation, status)
            }
            TournamentError::NotEnoughRegistrations { required, found } => write!(
                f,
                "Need at least {} registered pairs to generate groups (found {})",
                required, found
            ),
            TournamentError::TooManyRegistrations { allowed, found } => write!(
                f,
                "At most {} pairs can play this modality (found {})",
                allowed, found
            ),
            TournamentError::ImpossibleGroupSplit(n) => {
                write!(f, "{} pairs cannot be split into groups of 3 and 4", n)
            }
            TournamentError::NoCourts => write!(f, "The tournament has no courts configured"),
            TournamentError::InvalidDateRange { start, end } => {
                write!(f, "End date {} is before start date {}", end, start)
            }
            TournamentError::InvalidMatchDuration(d) => {
                write!(f, "Match duration must be a positive number of minutes (got {})", d)
            }
            TournamentError::NoGroups => write!(f, "The modality has no groups yet"),
            TournamentError::IncompleteStandings { group } => {
                write!(f, "Group {} has fewer than two ranked pairs", group)
            }
            TournamentError::NotEnoughQualifiers(n) => {
                write!(f, "Need at least 2 qualifiers for a bracket (found {})", n)
            }
            TournamentError::ResultAlreadyRecorded(id) => {
                write!(f, "Match {} already has a recorded result", id)
            }
            TournamentError::MatchNotReady(id) => {
                write!(f, "Match {} does not have both pairs yet", id)
            }
            TournamentError::ResultsAlreadyRecorded { modality } => write!(
                f,
                "Modality {} already has recorded results that a regeneration would discard",
                modality
            ),
            TournamentError::StaleGeneration { expected, found } => write!(
                f,
                "Tournament changed while regenerating (expected generation {}, found {}); retry",
                expected, found
            ),
            TournamentError::PendingCategoryChange(id) => {
                write!(f, "Player {} already has a pending category change", id)
            }
            TournamentError::InvalidCategory(c) => write!(f, "Invalid category change: {}", c),
            TournamentError::CategoryChangeNotPending(id) => {
                write!(f, "Category change {} is not pending", id)
            }
            TournamentError::PointsTable(msg) => write!(f, "Points table error: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

/// Lifecycle status of a tournament.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentStatus {
    /// Being configured: courts, modalities, dates.
    #[default]
    Draft,
    /// Registrations open.
    Open,
    /// Registrations closed; groups and schedule can be generated.
    Closed,
    /// Groups and schedule published.
    Generated,
    /// Group stage being played.
    InProgress,
    /// Knockout stage being played.
    Eliminations,
    Completed,
    Cancelled,
}

impl TournamentStatus {
    /// The single forward step from this status, if any.
    pub fn next(self) -> Option<TournamentStatus> {
        use TournamentStatus::*;
        match self {
            Draft => Some(Open),
            Open => Some(Closed),
            Closed => Some(Generated),
            Generated => Some(InProgress),
            InProgress => Some(Eliminations),
            Eliminations => Some(Completed),
            Completed | Cancelled => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, TournamentStatus::Completed | TournamentStatus::Cancelled)
    }

    /// Statuses reachable in one transition.
    pub fn allowed_targets(self) -> Vec<TournamentStatus> {
        if self.is_terminal() {
            return Vec::new();
        }
        let mut targets: Vec<_> = self.next().into_iter().collect();
        targets.push(TournamentStatus::Cancelled);
        targets
    }
}

impl std::fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "DRAFT",
            TournamentStatus::Open => "OPEN",
            TournamentStatus::Closed => "CLOSED",
            TournamentStatus::Generated => "GENERATED",
            TournamentStatus::InProgress => "IN_PROGRESS",
            TournamentStatus::Eliminations => "ELIMINATIONS",
            TournamentStatus::Completed => "COMPLETED",
            TournamentStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A tournament: date range, fixed match duration and lifecycle status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    pub club_id: ClubId,
    /// First playing day (inclusive).
    pub start_date: NaiveDate,
    /// Last playing day (inclusive).
    pub end_date: NaiveDate,
    /// Length of every match and therefore of every slot, in minutes.
    pub match_duration_minutes: i64,
    pub status: TournamentStatus,
    /// Bumped by every committed regeneration; plans computed against an older
    /// value are rejected.
    pub generation: u64,
}

impl Tournament {
    /// Create a new tournament in Draft status.
    pub fn new(
        name: impl Into<String>,
        club_id: ClubId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        match_duration_minutes: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            club_id,
            start_date,
            end_date,
            match_duration_minutes,
            status: TournamentStatus::Draft,
            generation: 0,
        }
    }

    /// Fail with `InvalidState` unless the status is one of `allowed`.
    pub fn ensure_status(
        &self,
        operation: &'static str,
        allowed: &[TournamentStatus],
    ) -> Result<(), TournamentError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(TournamentError::InvalidState {
                operation,
                status: self.status,
            })
        }
    }
}
