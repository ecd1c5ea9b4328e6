//! Slot generation: court opening windows become fixed-length bookable slots.

use crate::logic::time::{at, TimeRange};
use crate::models::{Slot, SlotStatus, TournamentError, TournamentId, TournamentStatus};
use crate::store::Store;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counts of the slots created by one generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SlotSummary {
    pub total: usize,
    /// Keyed by court name.
    pub per_court: BTreeMap<String, usize>,
    pub per_date: BTreeMap<NaiveDate, usize>,
}

/// Back-to-back `[start, end)` pieces of `duration` inside one window.
/// A trailing piece that would run past `close` is dropped.
pub fn window_slots(
    date: NaiveDate,
    open: NaiveTime,
    close: NaiveTime,
    duration: Duration,
) -> Vec<(NaiveTime, NaiveTime)> {
    let mut pieces = Vec::new();
    if duration <= Duration::zero() {
        return pieces;
    }
    let end = at(date, close);
    let mut cursor = at(date, open);
    while cursor + duration <= end {
        let next = cursor + duration;
        pieces.push((cursor.time(), next.time()));
        cursor = next;
    }
    pieces
}

/// A computed replacement for a tournament's AVAILABLE slots.
#[derive(Clone, Debug)]
pub struct SlotPlan {
    pub tournament_id: TournamentId,
    pub generation: u64,
    pub slots: Vec<Slot>,
}

/// Expand every court's availability over the tournament's date range.
pub fn plan_slots(store: &Store, tournament_id: TournamentId) -> Result<SlotPlan, TournamentError> {
    use TournamentStatus::*;
    let tournament = store.tournament(tournament_id)?;
    tournament.ensure_status("generate slots", &[Draft, Open, Closed, Generated])?;

    if tournament.end_date < tournament.start_date {
        return Err(TournamentError::InvalidDateRange {
            start: tournament.start_date,
            end: tournament.end_date,
        });
    }
    if tournament.match_duration_minutes <= 0 {
        return Err(TournamentError::InvalidMatchDuration(
            tournament.match_duration_minutes,
        ));
    }
    let courts = store.courts_of(tournament_id);
    if courts.is_empty() {
        return Err(TournamentError::NoCourts);
    }
    let duration = Duration::minutes(tournament.match_duration_minutes);

    // Slots the generator must not touch; new slots may not overlap them.
    let kept: Vec<_> = store
        .slots_of(tournament_id)
        .into_iter()
        .filter(|s| s.status != SlotStatus::Available)
        .collect();

    let mut slots = Vec::new();
    for date in tournament.start_date.iter_days() {
        if date > tournament.end_date {
            break;
        }
        for court in &courts {
            for window in court.availability.iter().filter(|w| w.applies_to(date)) {
                if window.close <= window.open {
                    log::warn!(
                        "Skipping window {}-{} on court {}: closes before it opens",
                        window.open,
                        window.close,
                        court.name
                    );
                    continue;
                }
                for (start, end) in window_slots(date, window.open, window.close, duration) {
                    let range = TimeRange::on(date, start, end);
                    let taken = kept.iter().any(|s| {
                        s.court_id == court.id
                            && TimeRange::on(s.date, s.start, s.end).overlaps(&range)
                    });
                    if taken {
                        continue;
                    }
                    slots.push(Slot::new(tournament_id, court.id, date, start, end));
                }
            }
        }
    }

    Ok(SlotPlan {
        tournament_id,
        generation: tournament.generation,
        slots,
    })
}

/// Drop the tournament's AVAILABLE slots and insert the planned ones.
pub fn commit_slots(store: &mut Store, plan: SlotPlan) -> Result<SlotSummary, TournamentError> {
    store.check_generation(plan.tournament_id, plan.generation)?;

    let before = store.slots.len();
    store
        .slots
        .retain(|_, s| s.tournament_id != plan.tournament_id || s.status != SlotStatus::Available);
    let removed = before - store.slots.len();

    let mut summary = SlotSummary::default();
    for slot in plan.slots {
        summary.total += 1;
        *summary
            .per_court
            .entry(store.court_name(slot.court_id).to_string())
            .or_default() += 1;
        *summary.per_date.entry(slot.date).or_default() += 1;
        store.add_slot(slot);
    }
    store.bump_generation(plan.tournament_id)?;

    log::info!(
        "Generated {} slots for tournament {} ({} available slots replaced)",
        summary.total,
        plan.tournament_id,
        removed
    );
    Ok(summary)
}

/// Regenerate a tournament's bookable slots.
pub fn generate_slots(store: &mut Store, tournament_id: TournamentId) -> Result<SlotSummary, TournamentError> {
    let plan = plan_slots(store, tournament_id)?;
    commit_slots(store, plan)
}
