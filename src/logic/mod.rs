//! Tournament business logic: groups, slots, scheduling, standings,
//! brackets, rankings and the lifecycle.

pub mod advancement;
pub mod category;
pub mod finals;
pub mod group_play;
pub mod lifecycle;
pub mod ranking;
pub mod results;
pub mod scheduler;
pub mod slots;
pub mod standings;
pub mod time;

pub use advancement::advance_winner;
pub use category::{
    approve_category_change, evaluate_ascension, evaluate_player_ascension,
    request_category_change, AscensionRule,
};
pub use finals::{generate_bracket, BracketLayout, BracketSummary};
pub use group_play::generate_groups;
pub use lifecycle::{transition_tournament, validate_transition, TransitionCheck, TransitionOutcome};
pub use ranking::recalculate_all_rankings;
pub use results::record_match_result;
pub use scheduler::{schedule_group_matches, ScheduleReport};
pub use slots::{generate_slots, SlotSummary};
pub use standings::{calculate_group_standings, calculate_modality_standings, GroupStandings};
