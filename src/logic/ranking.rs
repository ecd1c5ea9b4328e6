//! Ranking ledgers: per-player CITY and NATIONAL rows per modality kind and
//! category, updated on every result and paid out after each final.

use crate::models::{
    FinalStage, GameMatch, MatchId, ModalityId, ModalityKind, Phase, PlayerId, Ranking,
    RegistrationId, Scope, TournamentError, TournamentStatus,
};
use crate::store::Store;
use std::collections::{HashMap, HashSet};

/// A player's NATIONAL points in `kind`/`category`, 0 without a row.
pub fn prior_points(store: &Store, player_id: PlayerId, kind: ModalityKind, category: &str) -> i64 {
    store
        .rankings
        .iter()
        .find(|r| {
            r.player_id == player_id
                && r.kind == kind
                && r.category == category
                && r.scope == Scope::National
        })
        .map(|r| r.points)
        .unwrap_or(0)
}

/// The ranking row for the key, created empty if absent.
pub fn ranking_row<'a>(
    store: &'a mut Store,
    player_id: PlayerId,
    kind: ModalityKind,
    category: &str,
    scope: Scope,
) -> &'a mut Ranking {
    let position = store.rankings.iter().position(|r| {
        r.player_id == player_id && r.kind == kind && r.category == category && r.scope == scope
    });
    let index = match position {
        Some(i) => i,
        None => {
            let association = store.players.get(&player_id).and_then(|p| p.association_id);
            store
                .rankings
                .push(Ranking::new(player_id, kind, category, scope, association));
            store.rankings.len() - 1
        }
    };
    &mut store.rankings[index]
}

/// Apply `f` to both scope rows of every player of `registration`.
fn update_pair(
    store: &mut Store,
    registration: RegistrationId,
    kind: ModalityKind,
    category: &str,
    f: impl Fn(&mut Ranking),
) -> Result<(), TournamentError> {
    let players = store.registration(registration)?.players();
    for player in players {
        for scope in Scope::ALL {
            f(ranking_row(store, player, kind, category, scope));
        }
    }
    Ok(())
}

/// Count a decided match as played, won and lost for its four players.
pub fn apply_match_result(store: &mut Store, match_id: MatchId) -> Result<(), TournamentError> {
    let m = store.game(match_id)?;
    let (Some(winner), Some(loser)) = (m.winning_team(), m.losing_team()) else {
        return Ok(());
    };
    let modality = store.modality(m.modality_id)?;
    let (kind, category) = (modality.kind, modality.category.clone());

    update_pair(store, winner, kind, &category, |r| {
        r.played += 1;
        r.wins += 1;
    })?;
    update_pair(store, loser, kind, &category, |r| {
        r.played += 1;
        r.losses += 1;
    })?;
    Ok(())
}

/// Furthest stage reached by every pair of a modality whose final is decided.
///
/// Knockout losers are graded by how many rounds before the final they fell;
/// everyone else who played the group stage is a group-stage participant.
/// Returns an empty map while the final is undecided.
pub fn final_stages(
    store: &Store,
    modality_id: ModalityId,
) -> Result<HashMap<RegistrationId, FinalStage>, TournamentError> {
    store.modality(modality_id)?;
    let matches = store.matches_of(modality_id);
    let Some(last) = matches
        .iter()
        .find(|m| m.phase == Phase::Final && m.winner.is_decided())
    else {
        return Ok(HashMap::new());
    };
    let final_round = last.round_order;

    let mut stages = HashMap::new();
    let mut awarded: HashSet<RegistrationId> = HashSet::new();
    if let Some(champion) = last.winning_team() {
        stages.insert(champion, FinalStage::Champion);
        awarded.insert(champion);
    }

    let mut knockout: Vec<&GameMatch> = matches
        .iter()
        .copied()
        .filter(|m| m.phase.is_knockout() && m.winner.is_decided())
        .collect();
    knockout.sort_by(|a, b| b.round_order.cmp(&a.round_order));
    for m in knockout {
        let Some(loser) = m.losing_team() else {
            continue;
        };
        if awarded.insert(loser) {
            let back = final_round.saturating_sub(m.round_order);
            stages.insert(loser, FinalStage::eliminated_rounds_back(back));
        }
    }

    for group in store.groups_of(modality_id) {
        for p in store.placements_of(group.id) {
            if awarded.insert(p.registration_id) {
                stages.insert(p.registration_id, FinalStage::GroupStage);
            }
        }
    }
    Ok(stages)
}

/// Pay out final-stage ranking points for a modality, at most once.
///
/// Returns false when the final is undecided or points were already paid.
pub fn award_final_points(store: &mut Store, modality_id: ModalityId) -> Result<bool, TournamentError> {
    let modality = store.modality(modality_id)?;
    if modality.points_awarded {
        return Ok(false);
    }
    let (kind, category, point_category) = (
        modality.kind,
        modality.category.clone(),
        modality.point_category.clone(),
    );
    let stages = final_stages(store, modality_id)?;
    if stages.is_empty() {
        return Ok(false);
    }

    for (registration, stage) in &stages {
        let points = store.config.points_table.points(&point_category, *stage);
        if let Some(r) = store.registrations.get_mut(registration) {
            r.final_stage = Some(*stage);
        }
        update_pair(store, *registration, kind, &category, |r| r.points += points)?;
    }
    store.modality_mut(modality_id)?.points_awarded = true;

    log::info!(
        "Awarded {} ranking points to {} pairs of modality {}",
        point_category,
        stages.len(),
        modality_id
    );
    Ok(true)
}

/// Rebuild every ranking row from completed tournaments.
///
/// Zeroes all rows, replays decided matches chronologically and re-runs the
/// final-stage payout of every modality with a decided final.
pub fn recalculate_all_rankings(store: &mut Store) -> Result<(), TournamentError> {
    for row in store.rankings.iter_mut() {
        row.reset();
    }

    let mut completed: Vec<_> = store
        .tournaments
        .values()
        .filter(|t| t.status == TournamentStatus::Completed)
        .map(|t| (t.start_date, t.id))
        .collect();
    completed.sort();

    let mut replayed = 0;
    let mut modalities = Vec::new();
    for (_, tournament_id) in completed {
        let mut decided: Vec<&GameMatch> = store
            .matches_of_tournament(tournament_id)
            .into_iter()
            .filter(|m| m.winner.is_decided())
            .collect();
        // Unscheduled matches keep their bracket order after scheduled ones.
        decided.sort_by_key(|m| (m.scheduled_at.is_none(), m.scheduled_at));
        let ids: Vec<MatchId> = decided.iter().map(|m| m.id).collect();
        for id in ids {
            apply_match_result(store, id)?;
            replayed += 1;
        }
        modalities.extend(store.modalities_of(tournament_id).iter().map(|m| m.id));
    }

    let mut paid = 0;
    for modality_id in modalities {
        store.modality_mut(modality_id)?.points_awarded = false;
        if award_final_points(store, modality_id)? {
            paid += 1;
        }
    }
    log::info!(
        "Recalculated rankings: {} matches replayed, {} modalities paid out",
        replayed,
        paid
    );
    Ok(())
}
