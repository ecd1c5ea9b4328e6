//! Group standings: won/lost, sets, games and points from recorded results.

use crate::models::{
    GameMatch, Group, GroupId, GroupPlacement, ModalityId, RegistrationId, TournamentError, Winner,
};
use crate::store::Store;
use serde::Serialize;

/// One group's table, best first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupStandings {
    pub group: Group,
    pub standings: Vec<GroupPlacement>,
}

fn sort_key(p: &GroupPlacement) -> (u32, i64, i64) {
    (p.points, p.set_difference(), p.game_difference())
}

/// Winner between two registrations among `matches`, if they met.
fn head_to_head(
    matches: &[&GameMatch],
    a: RegistrationId,
    b: RegistrationId,
) -> Option<RegistrationId> {
    matches
        .iter()
        .find(|m| m.involves(a) && m.involves(b))
        .and_then(|m| m.winning_team())
}

/// Compute a group's standings without persisting them.
///
/// Order: points, set difference, game difference; a tie between exactly two
/// pairs is settled by their head-to-head result. Wider ties stay in seed order.
pub fn compute_group_standings(
    store: &Store,
    group_id: GroupId,
) -> Result<Vec<GroupPlacement>, TournamentError> {
    let group = store.group(group_id)?;
    let points_per_win = store.config.points_per_win;

    let mut table: Vec<GroupPlacement> = store
        .placements_of(group_id)
        .into_iter()
        .cloned()
        .map(|mut p| {
            p.reset();
            p
        })
        .collect();

    let matches: Vec<&GameMatch> = store
        .matches_of(group.modality_id)
        .into_iter()
        .filter(|m| m.group_id == Some(group_id) && m.winner.is_decided())
        .collect();

    for m in &matches {
        let (Some(team_a), Some(team_b)) = (m.team_a, m.team_b) else {
            continue;
        };
        let mut sets = (0, 0);
        let mut games = (0, 0);
        for set in &m.sets {
            games.0 += set.team_a;
            games.1 += set.team_b;
            match set.winner() {
                Winner::TeamA => sets.0 += 1,
                Winner::TeamB => sets.1 += 1,
                Winner::None => {}
            }
        }
        for p in table.iter_mut() {
            let (own_sets, other_sets, own_games, other_games, won) = if p.registration_id == team_a {
                (sets.0, sets.1, games.0, games.1, m.winner == Winner::TeamA)
            } else if p.registration_id == team_b {
                (sets.1, sets.0, games.1, games.0, m.winner == Winner::TeamB)
            } else {
                continue;
            };
            p.played += 1;
            p.sets_won += own_sets;
            p.sets_lost += other_sets;
            p.games_won += own_games;
            p.games_lost += other_games;
            if won {
                p.won += 1;
                p.points += points_per_win;
            } else {
                p.lost += 1;
            }
        }
    }

    let seed_of = |id: &RegistrationId| {
        store
            .registrations
            .get(id)
            .and_then(|r| r.seed)
            .unwrap_or(u32::MAX)
    };
    table.sort_by_key(|p| seed_of(&p.registration_id));
    table.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)));

    let mut i = 0;
    while i < table.len() {
        let mut j = i + 1;
        while j < table.len() && sort_key(&table[j]) == sort_key(&table[i]) {
            j += 1;
        }
        if j - i == 2 {
            let (a, b) = (table[i].registration_id, table[i + 1].registration_id);
            if head_to_head(&matches, a, b) == Some(b) {
                table.swap(i, i + 1);
            }
        }
        i = j;
    }

    for (i, p) in table.iter_mut().enumerate() {
        p.position = Some(i as u32 + 1);
    }
    Ok(table)
}

/// Compute a group's standings and write them onto its placements.
pub fn calculate_group_standings(
    store: &mut Store,
    group_id: GroupId,
) -> Result<Vec<GroupPlacement>, TournamentError> {
    let table = compute_group_standings(store, group_id)?;
    for row in &table {
        if let Some(p) = store
            .placements
            .iter_mut()
            .find(|p| p.group_id == group_id && p.registration_id == row.registration_id)
        {
            *p = row.clone();
        }
    }
    Ok(table)
}

/// Standings of every group of a modality, in group order.
pub fn calculate_modality_standings(
    store: &mut Store,
    modality_id: ModalityId,
) -> Result<Vec<GroupStandings>, TournamentError> {
    store.modality(modality_id)?;
    let groups: Vec<Group> = store.groups_of(modality_id).into_iter().cloned().collect();
    let mut all = Vec::with_capacity(groups.len());
    for group in groups {
        let standings = calculate_group_standings(store, group.id)?;
        all.push(GroupStandings { group, standings });
    }
    log::debug!("Computed standings for {} groups of modality {}", all.len(), modality_id);
    Ok(all)
}
