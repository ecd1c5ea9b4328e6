//! Group stage: splitting a modality's pairs into round-robin groups and
//! generating the group matches.

use crate::logic::ranking::prior_points;
use crate::models::{
    group_name, GameMatch, Group, GroupPlacement, ModalityId, Phase, RegistrationId,
    TournamentError, TournamentId, TournamentStatus,
};
use crate::store::Store;
use std::collections::HashSet;
use uuid::Uuid;

/// Group sizes for `n` pairs: groups of 3, with one group of 4 when
/// `n % 3 == 1` and two when `n % 3 == 2`. Groups of 4 come first.
pub fn group_sizes(n: usize) -> Result<Vec<usize>, TournamentError> {
    let fours = n % 3;
    if n < 3 || n < 4 * fours {
        return Err(TournamentError::ImpossibleGroupSplit(n));
    }
    let threes = (n - 4 * fours) / 3;
    let mut sizes = vec![4; fours];
    sizes.extend(std::iter::repeat(3).take(threes));
    Ok(sizes)
}

/// Distribute `ranked` (best first) over groups of the given sizes.
///
/// The first `sizes.len()` pairs head one group each; the rest are dealt in
/// snake order (forward, then backward) skipping groups that are full.
pub fn distribute_snake<T: Copy>(ranked: &[T], sizes: &[usize]) -> Vec<Vec<T>> {
    let mut groups: Vec<Vec<T>> = sizes.iter().map(|s| Vec::with_capacity(*s)).collect();
    let (heads, rest) = ranked.split_at(sizes.len().min(ranked.len()));
    for (group, head) in groups.iter_mut().zip(heads) {
        group.push(*head);
    }

    let mut rest = rest.iter();
    let mut forward = true;
    let mut remaining = rest.len();
    while remaining > 0 {
        let pass: Vec<usize> = if forward {
            (0..sizes.len()).collect()
        } else {
            (0..sizes.len()).rev().collect()
        };
        let mut placed_any = false;
        for gi in pass {
            if groups[gi].len() >= sizes[gi] {
                continue;
            }
            match rest.next() {
                Some(r) => {
                    groups[gi].push(*r);
                    remaining -= 1;
                    placed_any = true;
                }
                None => break,
            }
        }
        if !placed_any {
            break;
        }
        forward = !forward;
    }
    groups
}

/// A computed replacement for a modality's groups, not yet applied.
#[derive(Clone, Debug)]
pub struct GroupPlan {
    pub tournament_id: TournamentId,
    pub modality_id: ModalityId,
    pub generation: u64,
    /// Registrations best first with their seed and ranking score.
    pub seeds: Vec<(RegistrationId, u32, i64)>,
    pub groups: Vec<(Group, Vec<RegistrationId>)>,
}

/// Compute groups for a modality from its pending and confirmed registrations.
pub fn plan_groups(store: &Store, modality_id: ModalityId) -> Result<GroupPlan, TournamentError> {
    let modality = store.modality(modality_id)?;
    let tournament = store.tournament(modality.tournament_id)?;
    tournament.ensure_status(
        "generate groups",
        &[TournamentStatus::Closed, TournamentStatus::Generated],
    )?;

    if store
        .matches_of(modality_id)
        .iter()
        .any(|m| m.winner.is_decided())
    {
        return Err(TournamentError::ResultsAlreadyRecorded {
            modality: modality.name.clone(),
        });
    }

    let registrations: Vec<_> = store
        .registrations_of(modality_id)
        .into_iter()
        .filter(|r| r.is_active())
        .collect();
    if registrations.len() < modality.min_pairs {
        return Err(TournamentError::NotEnoughRegistrations {
            required: modality.min_pairs,
            found: registrations.len(),
        });
    }
    if registrations.len() > modality.max_pairs {
        return Err(TournamentError::TooManyRegistrations {
            allowed: modality.max_pairs,
            found: registrations.len(),
        });
    }
    let sizes = group_sizes(registrations.len())?;

    let mut scored: Vec<_> = registrations
        .iter()
        .map(|r| {
            let score = r
                .players()
                .iter()
                .map(|p| prior_points(store, *p, modality.kind, &modality.category))
                .sum::<i64>();
            (r.id, score, r.registered_at)
        })
        .collect();
    // Stable: equal scores keep registration order.
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

    let seeds: Vec<(RegistrationId, u32, i64)> = scored
        .iter()
        .enumerate()
        .map(|(i, (id, score, _))| (*id, i as u32 + 1, *score))
        .collect();
    let ranked: Vec<RegistrationId> = seeds.iter().map(|(id, _, _)| *id).collect();

    let groups = distribute_snake(&ranked, &sizes)
        .into_iter()
        .enumerate()
        .map(|(i, members)| {
            let group = Group {
                id: Uuid::new_v4(),
                modality_id,
                name: group_name(i),
                size: members.len(),
                order: i as u32 + 1,
            };
            (group, members)
        })
        .collect();

    Ok(GroupPlan {
        tournament_id: tournament.id,
        modality_id,
        generation: tournament.generation,
        seeds,
        groups,
    })
}

/// Replace the modality's groups, placements and matches with `plan`.
pub fn commit_groups(store: &mut Store, plan: GroupPlan) -> Result<Vec<Group>, TournamentError> {
    store.check_generation(plan.tournament_id, plan.generation)?;

    let old_groups: HashSet<_> = store
        .groups_of(plan.modality_id)
        .iter()
        .map(|g| g.id)
        .collect();
    store.groups.retain(|id, _| !old_groups.contains(id));
    store.placements.retain(|p| !old_groups.contains(&p.group_id));
    let removed = store.remove_matches(|m| m.modality_id == plan.modality_id);

    for (id, seed, score) in &plan.seeds {
        if let Some(r) = store.registrations.get_mut(id) {
            r.seed = Some(*seed);
            r.ranking_score = *score;
        }
    }

    let mut created = Vec::with_capacity(plan.groups.len());
    for (group, members) in plan.groups {
        for registration_id in members {
            store
                .placements
                .push(GroupPlacement::new(group.id, registration_id));
        }
        store.groups.insert(group.id, group.clone());
        created.push(group);
    }
    store.bump_generation(plan.tournament_id)?;

    log::info!(
        "Generated {} groups for modality {} ({} pairs, {} old groups and {} matches removed)",
        created.len(),
        plan.modality_id,
        plan.seeds.len(),
        old_groups.len(),
        removed
    );
    Ok(created)
}

/// Split a modality's registrations into seeded round-robin groups.
pub fn generate_groups(store: &mut Store, modality_id: ModalityId) -> Result<Vec<Group>, TournamentError> {
    let plan = plan_groups(store, modality_id)?;
    commit_groups(store, plan)
}

/// Circle-method rounds for `n` entrants: every unordered pair exactly once,
/// nobody twice in a round. Indices are positions in the input.
pub fn round_robin_rounds(n: usize) -> Vec<Vec<(usize, usize)>> {
    if n < 2 {
        return Vec::new();
    }
    // Odd counts get a phantom entrant whose opponent sits the round out.
    let m = if n % 2 == 0 { n } else { n + 1 };
    let mut ring: Vec<usize> = (0..m).collect();
    let mut rounds = Vec::with_capacity(m - 1);
    for _ in 0..m - 1 {
        let mut round = Vec::with_capacity(m / 2);
        for i in 0..m / 2 {
            let (a, b) = (ring[i], ring[m - 1 - i]);
            if a < n && b < n {
                round.push((a.min(b), a.max(b)));
            }
        }
        rounds.push(round);
        ring[1..].rotate_right(1);
    }
    rounds
}

/// Fresh group-stage matches for a modality, interleaving groups round by
/// round. Pairs listed in `played` already have a decided match and are skipped.
pub fn group_stage_matches(
    store: &Store,
    modality_id: ModalityId,
    played: &HashSet<(RegistrationId, RegistrationId)>,
) -> Vec<GameMatch> {
    let groups: Vec<_> = store
        .groups_of(modality_id)
        .into_iter()
        .map(|g| {
            let mut members: Vec<RegistrationId> = store
                .placements_of(g.id)
                .iter()
                .map(|p| p.registration_id)
                .collect();
            members.sort_by_key(|id| {
                store
                    .registrations
                    .get(id)
                    .and_then(|r| r.seed)
                    .unwrap_or(u32::MAX)
            });
            let rounds = round_robin_rounds(members.len());
            (g, members, rounds)
        })
        .collect();

    let max_rounds = groups.iter().map(|(_, _, r)| r.len()).max().unwrap_or(0);
    let mut matches = Vec::new();
    let mut match_order = 0;
    for round in 0..max_rounds {
        for (group, members, rounds) in &groups {
            let Some(pairings) = rounds.get(round) else {
                continue;
            };
            for &(a, b) in pairings {
                let (ra, rb) = (members[a], members[b]);
                if played.contains(&pair_key(ra, rb)) {
                    continue;
                }
                match_order += 1;
                let mut m = GameMatch::new(
                    modality_id,
                    Phase::GroupStage,
                    format!("Group {} - Round {}", group.name, round + 1),
                    round as u32 + 1,
                    match_order,
                )
                .with_teams(Some(ra), Some(rb));
                m.group_id = Some(group.id);
                matches.push(m);
            }
        }
    }
    matches
}

/// Order-independent key for a pairing.
pub fn pair_key(a: RegistrationId, b: RegistrationId) -> (RegistrationId, RegistrationId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
