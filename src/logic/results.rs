//! Recording match results and everything a result triggers.

use crate::logic::advancement::advance_winner;
use crate::logic::category::evaluate_after_final;
use crate::logic::ranking::{apply_match_result, award_final_points};
use crate::models::{MatchId, Phase, SetScore, TournamentError, TournamentStatus, Winner};
use crate::store::Store;

/// Store a match's score and, once it has a winner, advance the winner,
/// update the ranking ledgers and, after a final, pay out points and
/// evaluate ascensions.
///
/// A winner of `Winner::None` only stores the set scores.
pub fn record_match_result(
    store: &mut Store,
    match_id: MatchId,
    winner: Winner,
    sets: Vec<SetScore>,
) -> Result<(), TournamentError> {
    use TournamentStatus::*;
    let m = store.game(match_id)?;
    let tournament = store.tournament_of(m.modality_id)?;
    tournament.ensure_status("record a match result", &[Generated, InProgress, Eliminations])?;
    if m.winner.is_decided() {
        return Err(TournamentError::ResultAlreadyRecorded(match_id));
    }
    if winner.is_decided() && (m.team_a.is_none() || m.team_b.is_none()) {
        return Err(TournamentError::MatchNotReady(match_id));
    }
    let (modality_id, phase) = (m.modality_id, m.phase);

    let m = store.game_mut(match_id)?;
    m.sets = sets;
    m.winner = winner;
    if !winner.is_decided() {
        return Ok(());
    }

    apply_match_result(store, match_id)?;
    advance_winner(store, match_id)?;
    log::info!("Recorded result of match {}: {:?}", match_id, winner);

    if phase == Phase::Final {
        award_final_points(store, modality_id)?;
        let changes = evaluate_after_final(store, modality_id)?;
        log::info!(
            "Final of modality {} decided; {} category changes",
            modality_id,
            changes.len()
        );
    }
    Ok(())
}
