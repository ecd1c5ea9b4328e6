//! Integration tests for the tournament status machine.

mod common;

use common::{add_tournament, play_out, start_date, win_for_a, Fixture};
use padel_tournament_engine::{
    generate_bracket, generate_groups, generate_slots, schedule_group_matches,
    transition_tournament, validate_transition, EngineConfig, Store, TournamentStatus,
};
use uuid::Uuid;

use TournamentStatus::*;

#[test]
fn draft_cannot_skip_to_closed() {
    let mut f = Fixture::new(1, 1, 3);
    let outcome = transition_tournament(&mut f.store, f.tournament_id, Closed).unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.new_status, Draft);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(f.status(), Draft);
}

#[test]
fn opening_needs_courts_and_modalities() {
    let mut store = Store::new(EngineConfig::default());
    let tid = add_tournament(&mut store, start_date(), 1, 60);

    let check = validate_transition(&store, tid, Open).unwrap();
    assert!(!check.valid);
    assert_eq!(check.errors.len(), 2);
    assert!(check.errors[0].contains("court"));

    let outcome = transition_tournament(&mut store, tid, Open).unwrap();
    assert!(!outcome.success);
    assert_eq!(store.tournament(tid).unwrap().status, Draft);
}

#[test]
fn a_configured_draft_opens() {
    let mut f = Fixture::new(1, 1, 3);
    assert!(validate_transition(&f.store, f.tournament_id, Open).unwrap().valid);
    let outcome = transition_tournament(&mut f.store, f.tournament_id, Open).unwrap();
    assert!(outcome.success);
    assert!(outcome.errors.is_empty());
    assert_eq!(outcome.new_status, Open);
    assert_eq!(f.status(), Open);
}

#[test]
fn publishing_needs_groups_and_a_scheduled_match() {
    let mut f = Fixture::new(2, 2, 6);
    f.set_status(Closed);
    let check = validate_transition(&f.store, f.tournament_id, Generated).unwrap();
    assert_eq!(check.errors.len(), 2);

    generate_groups(&mut f.store, f.modality_id).unwrap();
    let check = validate_transition(&f.store, f.tournament_id, Generated).unwrap();
    assert_eq!(check.errors.len(), 1);

    generate_slots(&mut f.store, f.tournament_id).unwrap();
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    assert!(transition_tournament(&mut f.store, f.tournament_id, Generated)
        .unwrap()
        .success);
}

#[test]
fn play_phases_wait_for_results() {
    let mut f = Fixture::new(2, 2, 6);
    f.set_status(Closed);
    generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    f.set_status(Generated);

    assert!(!validate_transition(&f.store, f.tournament_id, InProgress).unwrap().valid);
    let first = f.store.matches_of(f.modality_id)[0].id;
    win_for_a(&mut f.store, first);
    assert!(transition_tournament(&mut f.store, f.tournament_id, InProgress)
        .unwrap()
        .success);

    let check = validate_transition(&f.store, f.tournament_id, Eliminations).unwrap();
    assert!(!check.valid);
    assert!(check.errors[0].starts_with("5 group matches"));

    play_out(&mut f.store, f.modality_id);
    assert!(transition_tournament(&mut f.store, f.tournament_id, Eliminations)
        .unwrap()
        .success);

    generate_bracket(&mut f.store, f.tournament_id, f.modality_id, Uuid::new_v4()).unwrap();
    assert!(!validate_transition(&f.store, f.tournament_id, Completed).unwrap().valid);
    play_out(&mut f.store, f.modality_id);
    assert!(transition_tournament(&mut f.store, f.tournament_id, Completed)
        .unwrap()
        .success);
}

#[test]
fn any_open_tournament_can_be_cancelled() {
    for status in [Draft, Open, Closed, Generated, InProgress, Eliminations] {
        let mut f = Fixture::new(1, 1, 3);
        f.set_status(status);
        let outcome = transition_tournament(&mut f.store, f.tournament_id, Cancelled).unwrap();
        assert!(outcome.success, "cancel from {}", status);
        assert_eq!(f.status(), Cancelled);
    }
}

#[test]
fn terminal_statuses_are_final() {
    for status in [Completed, Cancelled] {
        let mut f = Fixture::new(1, 1, 3);
        f.set_status(status);
        for target in [Draft, Open, Cancelled, Completed] {
            let outcome = transition_tournament(&mut f.store, f.tournament_id, target).unwrap();
            assert!(!outcome.success);
            assert!(outcome.errors[0].contains("no further transitions"));
            assert_eq!(f.status(), status);
        }
    }
}

#[test]
fn steps_cannot_go_backwards() {
    let mut f = Fixture::new(1, 1, 3);
    f.set_status(Generated);
    let outcome = transition_tournament(&mut f.store, f.tournament_id, Closed).unwrap();
    assert!(!outcome.success);
    assert_eq!(f.status(), Generated);
}
