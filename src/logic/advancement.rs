//! Winner advancement: write a decided match's winner into the next round.

use crate::logic::finals::BracketLayout;
use crate::models::{MatchId, Phase, Side, TournamentError};
use crate::store::Store;

/// Round order of the first main-bracket round.
const MAIN_ROUND: u32 = 2;

/// Next-round position fed by match `match_order` of a halving round.
pub fn next_position(round_order: u32, match_order: u32) -> (u32, u32, Side) {
    let side = if match_order % 2 == 1 { Side::A } else { Side::B };
    (round_order + 1, match_order.div_ceil(2), side)
}

/// Propagate the winner of `match_id` into the match it feeds.
///
/// Preliminary winners land in the open main-round slot the bracket layout
/// assigns to their match; later rounds halve. Returns the match that was
/// filled, or `None` when there is nothing to do (undecided, group stage, final).
pub fn advance_winner(store: &mut Store, match_id: MatchId) -> Result<Option<MatchId>, TournamentError> {
    let m = store.game(match_id)?;
    let Some(winner) = m.winning_team() else {
        return Ok(None);
    };
    let modality_id = m.modality_id;

    let (round, order, side) = match m.phase {
        Phase::GroupStage | Phase::Final => return Ok(None),
        Phase::PreliminaryRound => {
            let qualifiers = store.groups_of(modality_id).len() * 2;
            let open = BracketLayout::new(qualifiers).open_slots();
            let slot = (m.match_order as usize)
                .checked_sub(1)
                .and_then(|i| open.get(i));
            let Some(&(order, side)) = slot else {
                log::warn!(
                    "Preliminary match {} has no main-round slot in a {}-qualifier bracket",
                    match_id,
                    qualifiers
                );
                return Ok(None);
            };
            (MAIN_ROUND, order, side)
        }
        _ => next_position(m.round_order, m.match_order),
    };

    let target = store
        .matches_of(modality_id)
        .into_iter()
        .find(|t| {
            t.phase.is_knockout()
                && t.phase != Phase::PreliminaryRound
                && t.round_order == round
                && t.match_order == order
        })
        .map(|t| t.id);
    let Some(target_id) = target else {
        log::warn!(
            "No round {} match {} to receive the winner of {}",
            round,
            order,
            match_id
        );
        return Ok(None);
    };

    store.game_mut(target_id)?.set_side(side, winner);
    log::info!(
        "Advanced {} from match {} to round {} match {} side {:?}",
        winner,
        match_id,
        round,
        order,
        side
    );
    Ok(Some(target_id))
}
