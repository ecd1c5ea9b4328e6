//! Integration tests for court slot generation.

mod common;

use common::{add_courts, add_tournament, date, start_date, time};
use padel_tournament_engine::{
    generate_slots, AvailabilityDay, Court, EngineConfig, SlotStatus, Store, TournamentError,
    TournamentStatus,
};

#[test]
fn two_courts_over_three_mornings_give_24_slots() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 3, 60);
    add_courts(&mut store, tid, 2, time(8, 0), time(12, 0));

    let summary = generate_slots(&mut store, tid).unwrap();
    assert_eq!(summary.total, 24);
    assert_eq!(summary.per_court["Court 1"], 12);
    assert_eq!(summary.per_court["Court 2"], 12);
    assert_eq!(summary.per_date.len(), 3);
    assert!(summary.per_date.values().all(|n| *n == 8));
    assert_eq!(store.slots.len(), 24);

    let slots = store.slots_of(tid);
    assert_eq!((slots[0].start, slots[0].end), (time(8, 0), time(9, 0)));
    assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[test]
fn a_partial_trailing_slot_is_dropped() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 1, 60);
    add_courts(&mut store, tid, 1, time(8, 0), time(10, 30));
    assert_eq!(generate_slots(&mut store, tid).unwrap().total, 2);
}

#[test]
fn date_windows_only_apply_on_their_date() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 3, 90);
    store.add_court(Court::new(tid, "Centre").open_on(
        AvailabilityDay::Date(date(2026, 5, 2)),
        time(18, 0),
        time(21, 0),
    ));

    let summary = generate_slots(&mut store, tid).unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.per_date.keys().copied().collect::<Vec<_>>(), vec![date(2026, 5, 2)]);
}

#[test]
fn regeneration_keeps_held_slots_and_does_not_overlap_them() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 3, 60);
    add_courts(&mut store, tid, 2, time(8, 0), time(12, 0));
    generate_slots(&mut store, tid).unwrap();
    let held = store.slots_of(tid)[0].id;
    store.slots.get_mut(&held).unwrap().status = SlotStatus::Reserved;

    let summary = generate_slots(&mut store, tid).unwrap();
    assert_eq!(summary.total, 23);
    assert_eq!(store.slots.len(), 24);
    assert_eq!(store.slots[&held].status, SlotStatus::Reserved);
}

#[test]
fn rejects_bad_configuration() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 2, 60);
    assert_eq!(generate_slots(&mut store, tid), Err(TournamentError::NoCourts));

    add_courts(&mut store, tid, 1, time(8, 0), time(12, 0));
    store.tournaments.get_mut(&tid).unwrap().match_duration_minutes = 0;
    assert_eq!(
        generate_slots(&mut store, tid),
        Err(TournamentError::InvalidMatchDuration(0))
    );

    let t = store.tournaments.get_mut(&tid).unwrap();
    t.match_duration_minutes = 60;
    t.end_date = date(2026, 4, 30);
    assert!(matches!(
        generate_slots(&mut store, tid),
        Err(TournamentError::InvalidDateRange { .. })
    ));
    assert!(store.slots.is_empty());
}

#[test]
fn slots_are_frozen_once_play_starts() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 1, 60);
    add_courts(&mut store, tid, 1, time(8, 0), time(12, 0));
    store.tournaments.get_mut(&tid).unwrap().status = TournamentStatus::InProgress;
    assert!(matches!(
        generate_slots(&mut store, tid),
        Err(TournamentError::InvalidState { .. })
    ));
}
