//! Lifecycle state machine: validated, all-or-nothing status transitions.

use crate::models::{Phase, TournamentError, TournamentId, TournamentStatus};
use crate::store::Store;
use serde::Serialize;

/// Whether a transition may happen, and every reason it may not.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransitionOutcome {
    pub success: bool,
    pub errors: Vec<String>,
    /// Status after the call (unchanged on failure).
    pub new_status: TournamentStatus,
}

/// Check the transition table and the guards for `target`.
pub fn validate_transition(
    store: &Store,
    tournament_id: TournamentId,
    target: TournamentStatus,
) -> Result<TransitionCheck, TournamentError> {
    use TournamentStatus::*;
    let tournament = store.tournament(tournament_id)?;
    let current = tournament.status;

    if !current.allowed_targets().contains(&target) {
        let message = if current.is_terminal() {
            format!("Tournament is {}; no further transitions are possible", current)
        } else {
            format!("Cannot move a tournament from {} to {}", current, target)
        };
        return Ok(TransitionCheck {
            valid: false,
            errors: vec![message],
        });
    }

    let mut errors = Vec::new();
    let matches = store.matches_of_tournament(tournament_id);
    match target {
        Open => {
            if store.courts_of(tournament_id).is_empty() {
                errors.push("Add at least one court before opening registrations".to_string());
            }
            if store.modalities_of(tournament_id).is_empty() {
                errors.push("Add at least one modality before opening registrations".to_string());
            }
        }
        Generated => {
            for modality in store.modalities_of(tournament_id) {
                let has_pairs = store
                    .registrations_of(modality.id)
                    .iter()
                    .any(|r| r.is_active());
                if has_pairs && store.groups_of(modality.id).is_empty() {
                    errors.push(format!(
                        "Modality {} has registrations but no groups; generate groups first",
                        modality.name
                    ));
                }
            }
            let scheduled = matches
                .iter()
                .any(|m| m.phase == Phase::GroupStage && m.is_scheduled());
            if !scheduled {
                errors.push("Schedule at least one group match into a court slot".to_string());
            }
        }
        InProgress => {
            if !matches.iter().any(|m| m.winner.is_decided()) {
                errors.push("Record at least one match result before starting".to_string());
            }
        }
        Eliminations => {
            let pending = matches
                .iter()
                .filter(|m| m.phase == Phase::GroupStage && !m.winner.is_decided())
                .count();
            if pending > 0 {
                errors.push(format!("{} group matches still have no result", pending));
            }
        }
        Completed => {
            let pending = matches
                .iter()
                .filter(|m| m.phase == Phase::Final && !m.winner.is_decided())
                .count();
            if pending > 0 {
                errors.push(format!("{} finals still have no result", pending));
            }
        }
        Draft | Closed | Cancelled => {}
    }

    Ok(TransitionCheck {
        valid: errors.is_empty(),
        errors,
    })
}

/// Validate and apply a transition. On failure the status is left untouched.
pub fn transition_tournament(
    store: &mut Store,
    tournament_id: TournamentId,
    target: TournamentStatus,
) -> Result<TransitionOutcome, TournamentError> {
    let check = validate_transition(store, tournament_id, target)?;
    let tournament = store.tournament_mut(tournament_id)?;
    if !check.valid {
        log::info!(
            "Rejected transition of tournament {} from {} to {}: {}",
            tournament_id,
            tournament.status,
            target,
            check.errors.join("; ")
        );
        return Ok(TransitionOutcome {
            success: false,
            errors: check.errors,
            new_status: tournament.status,
        });
    }

    let previous = tournament.status;
    tournament.status = target;
    log::info!(
        "Tournament {} moved from {} to {}",
        tournament_id,
        previous,
        target
    );
    Ok(TransitionOutcome {
        success: true,
        errors: Vec::new(),
        new_status: target,
    })
}
