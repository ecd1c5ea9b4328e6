//! Knockout stage: seeded single-elimination bracket built from group results.

use crate::logic::standings::compute_group_standings;
use crate::models::{
    GameMatch, GroupId, GroupPlacement, ModalityId, Phase, PlayerId, RegistrationId, Side,
    TournamentError, TournamentId, TournamentStatus,
};
use crate::store::Store;
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

/// Where a main-round position gets its pair from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Entry {
    /// The n-th bye holder (0 = best).
    Bye(usize),
    /// The winner of the n-th preliminary match (0-based match order).
    Open(usize),
}

/// Shape of a bracket for a given number of qualifiers.
///
/// Pure function of the qualifier count, shared by bracket generation and
/// winner advancement so both agree on where preliminary winners land.
#[derive(Clone, Debug, PartialEq)]
pub struct BracketLayout {
    pub qualifiers: usize,
    /// Largest power of two not above `qualifiers`.
    pub bracket_size: usize,
    pub preliminary_matches: usize,
    pub byes: usize,
    /// Main-round matches as `[side A, side B]`.
    pub main_round: Vec<[Entry; 2]>,
}

impl BracketLayout {
    pub fn new(qualifiers: usize) -> Self {
        if qualifiers < 2 {
            return Self {
                qualifiers,
                bracket_size: qualifiers,
                preliminary_matches: 0,
                byes: qualifiers,
                main_round: Vec::new(),
            };
        }
        let bracket_size = 1usize << (usize::BITS - 1 - qualifiers.leading_zeros());
        let preliminary_matches = qualifiers - bracket_size;
        let byes = bracket_size - preliminary_matches;
        let main_matches = bracket_size / 2;

        let mut sides: Vec<[Option<usize>; 2]> = vec![[None, None]; main_matches];
        // Byes take side A of the earliest matches; any overflow then takes
        // side B, again from the first match on.
        for bye in 0..byes {
            if bye < main_matches {
                sides[bye][0] = Some(bye);
            } else {
                sides[bye - main_matches][1] = Some(bye);
            }
        }

        let mut open = 0;
        let main_round = sides
            .into_iter()
            .map(|pair| {
                pair.map(|side| match side {
                    Some(bye) => Entry::Bye(bye),
                    None => {
                        open += 1;
                        Entry::Open(open - 1)
                    }
                })
            })
            .collect();

        Self {
            qualifiers,
            bracket_size,
            preliminary_matches,
            byes,
            main_round,
        }
    }

    /// Main-round target `(1-based match order, side)` for each preliminary
    /// match, indexed by its 0-based match order.
    pub fn open_slots(&self) -> Vec<(u32, Side)> {
        let mut slots = vec![(0, Side::A); self.preliminary_matches];
        for (i, pair) in self.main_round.iter().enumerate() {
            for (entry, side) in pair.iter().zip([Side::A, Side::B]) {
                if let Entry::Open(n) = entry {
                    slots[*n] = (i as u32 + 1, side);
                }
            }
        }
        slots
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QualifyingPlace {
    First,
    Second,
}

/// A pair that made it out of its group.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Qualifier {
    pub registration_id: RegistrationId,
    pub group_order: u32,
    pub place: QualifyingPlace,
    pub ranking_score: i64,
}

/// Group winners by ascending group order interleaved with runners-up by
/// descending group order: A1, Z2, B1, Y2, ...
pub fn mirror_seed(qualifiers: &[Qualifier]) -> Vec<Qualifier> {
    let mut firsts: Vec<_> = qualifiers
        .iter()
        .filter(|q| q.place == QualifyingPlace::First)
        .copied()
        .collect();
    let mut seconds: Vec<_> = qualifiers
        .iter()
        .filter(|q| q.place == QualifyingPlace::Second)
        .copied()
        .collect();
    firsts.sort_by_key(|q| q.group_order);
    seconds.sort_by_key(|q| std::cmp::Reverse(q.group_order));

    let mut seeded = Vec::with_capacity(qualifiers.len());
    let mut firsts = firsts.into_iter();
    let mut seconds = seconds.into_iter();
    loop {
        match (firsts.next(), seconds.next()) {
            (None, None) => break,
            (a, b) => seeded.extend(a.into_iter().chain(b)),
        }
    }
    seeded
}

/// Result of a bracket generation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BracketSummary {
    pub total_qualified: usize,
    pub preliminary_matches: usize,
    pub byes: usize,
    pub main_round: String,
    pub main_match_count: usize,
}

/// A computed replacement for a modality's knockout matches.
#[derive(Clone, Debug)]
pub struct BracketPlan {
    pub tournament_id: TournamentId,
    pub modality_id: ModalityId,
    pub generation: u64,
    pub actor_id: PlayerId,
    pub generated_at: NaiveDateTime,
    pub standings: Vec<(GroupId, Vec<GroupPlacement>)>,
    pub matches: Vec<GameMatch>,
    pub summary: BracketSummary,
}

/// Compute the bracket for a modality from its group standings.
pub fn plan_bracket(
    store: &Store,
    tournament_id: TournamentId,
    modality_id: ModalityId,
    actor_id: PlayerId,
) -> Result<BracketPlan, TournamentError> {
    let tournament = store.tournament(tournament_id)?;
    let modality = store.modality(modality_id)?;
    if modality.tournament_id != tournament_id {
        return Err(TournamentError::ModalityNotFound(modality_id));
    }
    tournament.ensure_status(
        "generate the bracket",
        &[TournamentStatus::InProgress, TournamentStatus::Eliminations],
    )?;

    let groups = store.groups_of(modality_id);
    if groups.is_empty() {
        return Err(TournamentError::NoGroups);
    }
    if store
        .matches_of(modality_id)
        .iter()
        .any(|m| m.phase.is_knockout() && m.winner.is_decided())
    {
        return Err(TournamentError::ResultsAlreadyRecorded {
            modality: modality.name.clone(),
        });
    }

    let mut standings = Vec::with_capacity(groups.len());
    let mut qualifiers = Vec::with_capacity(groups.len() * 2);
    for group in &groups {
        let table = compute_group_standings(store, group.id)?;
        if table.len() < 2 {
            return Err(TournamentError::IncompleteStandings {
                group: group.name.clone(),
            });
        }
        for (row, place) in table.iter().zip([QualifyingPlace::First, QualifyingPlace::Second]) {
            qualifiers.push(Qualifier {
                registration_id: row.registration_id,
                group_order: group.order,
                place,
                ranking_score: store.registration(row.registration_id)?.ranking_score,
            });
        }
        standings.push((group.id, table));
    }

    let layout = BracketLayout::new(qualifiers.len());
    if layout.main_round.is_empty() {
        return Err(TournamentError::NotEnoughQualifiers(qualifiers.len()));
    }

    // Best ranking score first; equal scores keep mirror order.
    let mut ranked = mirror_seed(&qualifiers);
    ranked.sort_by(|a, b| b.ranking_score.cmp(&a.ranking_score));
    let (bye_holders, rest) = ranked.split_at(layout.byes);

    let mut matches = Vec::new();
    for i in 0..layout.preliminary_matches {
        let best = rest[i].registration_id;
        let worst = rest[rest.len() - 1 - i].registration_id;
        matches.push(
            GameMatch::new(
                modality_id,
                Phase::PreliminaryRound,
                Phase::PreliminaryRound.round_name(rest.len()),
                1,
                i as u32 + 1,
            )
            .with_teams(Some(best), Some(worst)),
        );
    }

    let mut round_size = layout.bracket_size;
    let mut round_order = 2;
    let main_phase = Phase::for_round_size(round_size);
    while round_size >= 2 {
        let phase = Phase::for_round_size(round_size);
        for k in 0..round_size / 2 {
            let mut m = GameMatch::new(
                modality_id,
                phase,
                phase.round_name(round_size),
                round_order,
                k as u32 + 1,
            );
            if round_order == 2 {
                for (entry, side) in layout.main_round[k].iter().zip([Side::A, Side::B]) {
                    if let Entry::Bye(n) = entry {
                        m.set_side(side, bye_holders[*n].registration_id);
                    }
                }
            }
            matches.push(m);
        }
        round_size /= 2;
        round_order += 1;
    }

    let summary = BracketSummary {
        total_qualified: layout.qualifiers,
        preliminary_matches: layout.preliminary_matches,
        byes: layout.byes,
        main_round: main_phase.round_name(layout.bracket_size),
        main_match_count: layout.main_round.len(),
    };

    Ok(BracketPlan {
        tournament_id,
        modality_id,
        generation: tournament.generation,
        actor_id,
        generated_at: Utc::now().naive_utc(),
        standings,
        matches,
        summary,
    })
}

/// Replace the modality's knockout matches with `plan` and persist the
/// standings it was built from.
pub fn commit_bracket(store: &mut Store, plan: BracketPlan) -> Result<BracketSummary, TournamentError> {
    store.check_generation(plan.tournament_id, plan.generation)?;

    let modality_id = plan.modality_id;
    let removed = store.remove_matches(|m| m.modality_id == modality_id && m.phase.is_knockout());
    for (group_id, table) in &plan.standings {
        for row in table {
            if let Some(p) = store
                .placements
                .iter_mut()
                .find(|p| p.group_id == *group_id && p.registration_id == row.registration_id)
            {
                *p = row.clone();
            }
        }
    }
    for m in plan.matches {
        store.matches.insert(m.id, m);
    }
    let modality = store.modality_mut(modality_id)?;
    modality.bracket_generated_by = Some(plan.actor_id);
    modality.bracket_generated_at = Some(plan.generated_at);
    store.bump_generation(plan.tournament_id)?;

    log::info!(
        "Bracket for modality {} generated by {}: {} qualified, {} preliminary, {} byes, {} ({} knockout matches replaced)",
        modality_id,
        plan.actor_id,
        plan.summary.total_qualified,
        plan.summary.preliminary_matches,
        plan.summary.byes,
        plan.summary.main_round,
        removed
    );
    Ok(plan.summary)
}

/// Build a modality's knockout bracket from its group standings.
pub fn generate_bracket(
    store: &mut Store,
    tournament_id: TournamentId,
    modality_id: ModalityId,
    actor_id: PlayerId,
) -> Result<BracketSummary, TournamentError> {
    let plan = plan_bracket(store, tournament_id, modality_id, actor_id)?;
    commit_bracket(store, plan)
}
