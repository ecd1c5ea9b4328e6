//! Doubles tournament engine: library with models, an in-memory store and
//! the group, scheduling, bracket, ranking and lifecycle logic.

pub mod config;
pub mod logic;
pub mod models;
pub mod store;

pub use config::{EngineConfig, PointsTable, ServerConfig, StagePoints};
pub use logic::{
    advance_winner, approve_category_change, calculate_group_standings,
    calculate_modality_standings, evaluate_ascension, evaluate_player_ascension, generate_bracket,
    generate_groups, generate_slots, recalculate_all_rankings, record_match_result,
    request_category_change, schedule_group_matches, transition_tournament, validate_transition,
    AscensionRule, BracketLayout, BracketSummary, GroupStandings, ScheduleReport, SlotSummary,
    TransitionCheck, TransitionOutcome,
};
pub use models::{
    Availability, AvailabilityDay, CategoryChange, ChangeStatus, ChangeType, Court, FinalStage,
    GameMatch, Group, GroupPlacement, MatchId, Modality, ModalityId, ModalityKind, Phase, Player,
    PlayerId, Ranking, Registration, RegistrationId, RegistrationStatus, Scope, SetScore, Side,
    Slot, SlotStatus, Tournament, TournamentError, TournamentId, TournamentStatus, Winner,
};
pub use store::Store;
