//! Group-stage scheduling: greedy assignment of round-robin matches to
//! court slots under double-booking and rest constraints.

use crate::logic::group_play::{group_stage_matches, pair_key};
use crate::logic::time::{at, TimeRange};
use crate::models::{
    GameMatch, MatchId, Phase, PlayerId, RegistrationId, SlotId, SlotStatus, TournamentError,
    TournamentId, TournamentStatus,
};
use crate::store::Store;
use chrono::Duration;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Outcome of a scheduling pass. Unscheduled matches are a soft shortfall:
/// add courts or hours and run again.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ScheduleReport {
    pub total_matches: usize,
    pub scheduled: usize,
    pub unscheduled: usize,
    pub unscheduled_ids: Vec<MatchId>,
}

/// Intervals already booked per player and per pair.
///
/// A new booking is refused when it overlaps an existing one or starts less
/// than `rest` after it ends (so back-to-back slots clash too).
#[derive(Clone, Debug)]
pub struct ClashIndex {
    rest: Duration,
    players: HashMap<PlayerId, Vec<TimeRange>>,
    pairs: HashMap<RegistrationId, Vec<TimeRange>>,
}

impl ClashIndex {
    pub fn new(rest: Duration) -> Self {
        Self {
            rest,
            players: HashMap::new(),
            pairs: HashMap::new(),
        }
    }

    fn clashes(&self, booked: Option<&Vec<TimeRange>>, range: &TimeRange) -> bool {
        booked.is_some_and(|list| list.iter().any(|b| b.clashes(range, self.rest)))
    }

    pub fn is_free(&self, players: &[PlayerId], pairs: &[RegistrationId], range: &TimeRange) -> bool {
        !players
            .iter()
            .any(|p| self.clashes(self.players.get(p), range))
            && !pairs.iter().any(|r| self.clashes(self.pairs.get(r), range))
    }

    pub fn book(&mut self, players: &[PlayerId], pairs: &[RegistrationId], range: TimeRange) {
        for p in players {
            self.players.entry(*p).or_default().push(range);
        }
        for r in pairs {
            self.pairs.entry(*r).or_default().push(range);
        }
    }
}

/// A computed schedule for a tournament's group stage, not yet applied.
#[derive(Clone, Debug)]
pub struct SchedulePlan {
    pub tournament_id: TournamentId,
    pub generation: u64,
    /// Undecided group matches to delete (their slots return to the pool).
    pub removed: Vec<MatchId>,
    /// Replacement matches, scheduled where a slot was found.
    pub matches: Vec<GameMatch>,
    pub report: ScheduleReport,
}

fn participants(store: &Store, m: &GameMatch) -> (Vec<PlayerId>, Vec<RegistrationId>) {
    let pairs: Vec<RegistrationId> = m.teams().collect();
    let players = pairs
        .iter()
        .filter_map(|id| store.registrations.get(id))
        .flat_map(|r| r.players())
        .collect();
    (players, pairs)
}

/// Rebuild and schedule every modality's round-robin matches.
///
/// Group matches that already have a winner are kept as fixed history, as are
/// matches of other phases holding slots.
pub fn plan_schedule(store: &Store, tournament_id: TournamentId) -> Result<SchedulePlan, TournamentError> {
    use TournamentStatus::*;
    let tournament = store.tournament(tournament_id)?;
    tournament.ensure_status("schedule group matches", &[Closed, Generated, InProgress])?;
    if tournament.match_duration_minutes <= 0 {
        return Err(TournamentError::InvalidMatchDuration(
            tournament.match_duration_minutes,
        ));
    }
    let rest = Duration::minutes(tournament.match_duration_minutes);

    let existing = store.matches_of_tournament(tournament_id);
    let removed: Vec<&GameMatch> = existing
        .iter()
        .copied()
        .filter(|m| m.phase == Phase::GroupStage && !m.winner.is_decided())
        .collect();
    let removed_ids: HashSet<MatchId> = removed.iter().map(|m| m.id).collect();
    let freed: HashSet<SlotId> = removed.iter().filter_map(|m| m.slot_id).collect();

    let mut index = ClashIndex::new(rest);
    for m in existing.iter().filter(|m| !removed_ids.contains(&m.id)) {
        let Some(slot) = m.slot_id.and_then(|id| store.slots.get(&id)) else {
            continue;
        };
        let (players, pairs) = participants(store, m);
        index.book(&players, &pairs, TimeRange::on(slot.date, slot.start, slot.end));
    }

    let slots: Vec<_> = store
        .slots_of(tournament_id)
        .into_iter()
        .filter(|s| s.status == SlotStatus::Available || freed.contains(&s.id))
        .collect();
    let mut used: HashSet<SlotId> = HashSet::new();

    let mut matches = Vec::new();
    let mut report = ScheduleReport::default();
    for modality in store.modalities_of(tournament_id) {
        let decided: HashSet<_> = store
            .matches_of(modality.id)
            .iter()
            .filter(|m| m.phase == Phase::GroupStage && m.winner.is_decided())
            .filter_map(|m| Some(pair_key(m.team_a?, m.team_b?)))
            .collect();

        for mut m in group_stage_matches(store, modality.id, &decided) {
            report.total_matches += 1;
            let (players, pairs) = participants(store, &m);
            let found = slots.iter().find(|s| {
                !used.contains(&s.id)
                    && index.is_free(&players, &pairs, &TimeRange::on(s.date, s.start, s.end))
            });
            match found {
                Some(slot) => {
                    used.insert(slot.id);
                    index.book(&players, &pairs, TimeRange::on(slot.date, slot.start, slot.end));
                    m.slot_id = Some(slot.id);
                    m.scheduled_at = Some(at(slot.date, slot.start));
                    m.court_label = Some(store.court_name(slot.court_id).to_string());
                    report.scheduled += 1;
                }
                None => {
                    report.unscheduled += 1;
                    report.unscheduled_ids.push(m.id);
                }
            }
            matches.push(m);
        }
    }

    Ok(SchedulePlan {
        tournament_id,
        generation: tournament.generation,
        removed: removed_ids.into_iter().collect(),
        matches,
        report,
    })
}

/// Replace undecided group matches with the planned ones and book their slots.
pub fn commit_schedule(store: &mut Store, plan: SchedulePlan) -> Result<ScheduleReport, TournamentError> {
    store.check_generation(plan.tournament_id, plan.generation)?;

    let removed: HashSet<MatchId> = plan.removed.into_iter().collect();
    store.remove_matches(|m| removed.contains(&m.id));
    for m in plan.matches {
        if let Some(slot) = m.slot_id.and_then(|id| store.slots.get_mut(&id)) {
            slot.status = SlotStatus::Assigned;
        }
        store.matches.insert(m.id, m);
    }
    store.bump_generation(plan.tournament_id)?;

    let report = plan.report;
    if report.unscheduled > 0 {
        log::warn!(
            "{} of {} group matches in tournament {} found no valid slot",
            report.unscheduled,
            report.total_matches,
            plan.tournament_id
        );
    }
    log::info!(
        "Scheduled {} of {} group matches for tournament {}",
        report.scheduled,
        report.total_matches,
        plan.tournament_id
    );
    Ok(report)
}

/// Regenerate and schedule the group stage of every modality.
pub fn schedule_group_matches(
    store: &mut Store,
    tournament_id: TournamentId,
) -> Result<ScheduleReport, TournamentError> {
    let plan = plan_schedule(store, tournament_id)?;
    commit_schedule(store, plan)
}
