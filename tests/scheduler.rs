//! Integration tests for group-stage scheduling.

mod common;

use chrono::Duration;
use common::{add_courts, add_pairs, add_tournament, start_date, time, win_for_a, Fixture};
use padel_tournament_engine::logic::time::TimeRange;
use padel_tournament_engine::{
    generate_groups, generate_slots, schedule_group_matches, EngineConfig, Modality, ModalityKind,
    SlotStatus, Store, TournamentError, TournamentStatus,
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

fn prepared(days: i64, courts: usize, pairs: usize) -> Fixture {
    let mut f = Fixture::new(days, courts, pairs);
    f.set_status(TournamentStatus::Closed);
    generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    f
}

/// Booked ranges per player across every scheduled match of the store.
fn player_bookings(store: &Store) -> HashMap<Uuid, Vec<TimeRange>> {
    let mut booked: HashMap<Uuid, Vec<TimeRange>> = HashMap::new();
    for m in store.matches.values() {
        let Some(slot) = m.slot_id.map(|id| &store.slots[&id]) else {
            continue;
        };
        let range = TimeRange::on(slot.date, slot.start, slot.end);
        for r in m.teams() {
            for p in store.registration(r).unwrap().players() {
                booked.entry(p).or_default().push(range);
            }
        }
    }
    booked
}

#[test]
fn schedules_every_match_without_sharing_slots() {
    let mut f = prepared(2, 2, 9);
    let report = schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.total_matches, 9);
    assert_eq!(report.scheduled, 9);
    assert_eq!(report.unscheduled, 0);

    let mut used = HashSet::new();
    for m in f.store.matches.values() {
        let slot_id = m.slot_id.unwrap();
        assert!(used.insert(slot_id), "slot {} used twice", slot_id);
        let slot = &f.store.slots[&slot_id];
        assert_eq!(slot.status, SlotStatus::Assigned);
        assert_eq!(m.scheduled_at, Some(slot.date.and_time(slot.start)));
        assert_eq!(m.court_label.as_deref(), Some(f.store.court_name(slot.court_id)));
    }
}

#[test]
fn players_never_play_back_to_back() {
    let mut f = prepared(2, 3, 12);
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();

    for (player, mut ranges) in player_bookings(&f.store) {
        ranges.sort_by_key(|r| r.start);
        for pair in ranges.windows(2) {
            assert!(
                pair[1].start >= pair[0].end + Duration::minutes(60),
                "player {} booked at {} and again at {}",
                player,
                pair[0].start,
                pair[1].start
            );
        }
    }
}

#[test]
fn a_player_in_two_modalities_is_not_double_booked() {
    let mut f = Fixture::new(1, 2, 3);
    let other = f.store.add_modality(Modality::new(
        f.tournament_id,
        "Mixed B",
        ModalityKind::MixedDoubles,
        "B",
        "P500",
    ));
    let others = add_pairs(&mut f.store, other, 3);
    // The first player of the first pair also plays in the second modality.
    let shared = f.players_of(f.registrations[0])[0];
    f.store.registrations.get_mut(&others[0]).unwrap().player_a = shared;

    f.set_status(TournamentStatus::Closed);
    generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_groups(&mut f.store, other).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    let report = schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.total_matches, 6);

    let mut ranges = player_bookings(&f.store).remove(&shared).unwrap();
    assert_eq!(ranges.len(), 4);
    ranges.sort_by_key(|r| r.start);
    for pair in ranges.windows(2) {
        assert!(!pair[0].overlaps(&pair[1]));
        assert!(pair[0].end < pair[1].start);
    }
}

#[test]
fn reports_matches_that_found_no_slot() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 1, 60);
    add_courts(&mut store, tid, 1, time(8, 0), time(10, 0));
    let modality = store.add_modality(Modality::new(
        tid,
        "Mixed C",
        ModalityKind::MixedDoubles,
        "C",
        "P500",
    ));
    add_pairs(&mut store, modality, 7);
    store.tournaments.get_mut(&tid).unwrap().status = TournamentStatus::Closed;
    generate_groups(&mut store, modality).unwrap();
    generate_slots(&mut store, tid).unwrap();

    let report = schedule_group_matches(&mut store, tid).unwrap();
    assert_eq!(report.total_matches, 9);
    assert_eq!(report.scheduled, 2);
    assert_eq!(report.unscheduled, 7);
    assert_eq!(report.unscheduled_ids.len(), 7);
    for id in &report.unscheduled_ids {
        assert!(!store.game(*id).unwrap().is_scheduled());
    }
}

#[test]
fn rescheduling_keeps_decided_matches_in_place() {
    let mut f = prepared(2, 2, 9);
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    f.set_status(TournamentStatus::Generated);
    let decided = f.store.matches_of(f.modality_id)[0].clone();
    win_for_a(&mut f.store, decided.id);

    let report = schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    assert_eq!(report.total_matches, 8);
    assert_eq!(f.store.matches.len(), 9);
    let kept = f.store.game(decided.id).unwrap();
    assert_eq!(kept.slot_id, decided.slot_id);
    assert!(kept.winner.is_decided());

    let pairing = (decided.team_a.unwrap(), decided.team_b.unwrap());
    let meetings = f
        .store
        .matches
        .values()
        .filter(|m| m.involves(pairing.0) && m.involves(pairing.1))
        .count();
    assert_eq!(meetings, 1);

    let assigned = f
        .store
        .slots
        .values()
        .filter(|s| s.status == SlotStatus::Assigned)
        .count();
    assert_eq!(assigned, 9);
}

#[test]
fn scheduling_is_refused_during_eliminations() {
    let mut f = prepared(1, 1, 6);
    f.set_status(TournamentStatus::Eliminations);
    assert!(matches!(
        schedule_group_matches(&mut f.store, f.tournament_id),
        Err(TournamentError::InvalidState { .. })
    ));
}
