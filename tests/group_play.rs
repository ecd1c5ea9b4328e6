//! Integration tests for group formation and round-robin match generation.

mod common;

use common::{win_for_a, Fixture};
use padel_tournament_engine::logic::group_play::{commit_groups, group_sizes, plan_groups};
use padel_tournament_engine::{
    generate_groups, generate_slots, schedule_group_matches, ModalityKind, Phase, Ranking, Scope,
    SlotStatus, TournamentError, TournamentStatus,
};
use std::collections::HashSet;

#[test]
fn group_sizes_use_threes_and_fours_only() {
    assert_eq!(group_sizes(3).unwrap(), vec![3]);
    assert_eq!(group_sizes(4).unwrap(), vec![4]);
    assert_eq!(group_sizes(7).unwrap(), vec![4, 3]);
    assert_eq!(group_sizes(8).unwrap(), vec![4, 4]);
    assert_eq!(group_sizes(11).unwrap(), vec![4, 4, 3]);
    for n in [6, 9, 10, 12, 13, 14, 20, 31] {
        let sizes = group_sizes(n).unwrap();
        assert_eq!(sizes.iter().sum::<usize>(), n);
        assert!(sizes.iter().all(|s| *s == 3 || *s == 4));
        assert!(sizes.iter().filter(|s| **s == 4).count() <= 2);
    }
}

#[test]
fn impossible_counts_are_rejected() {
    for n in [0, 1, 2, 5] {
        assert_eq!(group_sizes(n), Err(TournamentError::ImpossibleGroupSplit(n)));
    }
}

#[test]
fn seven_pairs_make_a_group_of_four_and_a_group_of_three() {
    let mut f = Fixture::new(1, 1, 7);
    f.set_status(TournamentStatus::Closed);
    let groups = generate_groups(&mut f.store, f.modality_id).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!((groups[0].name.as_str(), groups[0].size), ("A", 4));
    assert_eq!((groups[1].name.as_str(), groups[1].size), ("B", 3));
    assert_eq!(f.store.placements.len(), 7);
    let placed: HashSet<_> = f.store.placements.iter().map(|p| p.registration_id).collect();
    assert_eq!(placed.len(), 7);
}

#[test]
fn seeds_follow_prior_national_points() {
    let mut f = Fixture::new(1, 1, 7);
    f.set_status(TournamentStatus::Closed);
    let strongest = f.registrations[6];
    for player in f.players_of(strongest) {
        let mut row = Ranking::new(player, ModalityKind::MixedDoubles, "C", Scope::National, None);
        row.points = 100;
        f.store.rankings.push(row);
    }

    let groups = generate_groups(&mut f.store, f.modality_id).unwrap();
    let registration = f.store.registration(strongest).unwrap();
    assert_eq!(registration.seed, Some(1));
    assert_eq!(registration.ranking_score, 200);
    // Equal scores keep registration order.
    assert_eq!(f.store.registration(f.registrations[0]).unwrap().seed, Some(2));
    assert_eq!(
        f.store.placements_of(groups[0].id)[0].registration_id,
        strongest
    );
}

#[test]
fn groups_need_the_modality_minimum() {
    let mut f = Fixture::new(1, 1, 4);
    f.set_status(TournamentStatus::Closed);
    f.store.modality_mut(f.modality_id).unwrap().min_pairs = 6;
    assert_eq!(
        generate_groups(&mut f.store, f.modality_id),
        Err(TournamentError::NotEnoughRegistrations {
            required: 6,
            found: 4
        })
    );
}

#[test]
fn groups_respect_the_modality_maximum() {
    let mut f = Fixture::new(1, 1, 7);
    f.set_status(TournamentStatus::Closed);
    f.store.modality_mut(f.modality_id).unwrap().max_pairs = 6;
    assert_eq!(
        generate_groups(&mut f.store, f.modality_id),
        Err(TournamentError::TooManyRegistrations {
            allowed: 6,
            found: 7
        })
    );
    assert!(f.store.groups_of(f.modality_id).is_empty());
}

#[test]
fn groups_cannot_be_generated_while_registrations_are_open() {
    let mut f = Fixture::new(1, 1, 6);
    f.set_status(TournamentStatus::Open);
    assert!(matches!(
        generate_groups(&mut f.store, f.modality_id),
        Err(TournamentError::InvalidState { .. })
    ));
    assert!(f.store.groups.is_empty());
}

#[test]
fn every_pair_in_a_group_meets_exactly_once() {
    let mut f = Fixture::new(2, 2, 7);
    f.set_status(TournamentStatus::Closed);
    let groups = generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();

    for (group, expected) in groups.iter().zip([6, 3]) {
        let matches: Vec<_> = f
            .store
            .matches_of(f.modality_id)
            .into_iter()
            .filter(|m| m.group_id == Some(group.id))
            .collect();
        assert_eq!(matches.len(), expected);
        let mut seen = HashSet::new();
        for m in &matches {
            assert_eq!(m.phase, Phase::GroupStage);
            assert!(m.name.starts_with(&format!("Group {} - Round", group.name)));
            let (a, b) = (m.team_a.unwrap(), m.team_b.unwrap());
            assert_ne!(a, b);
            assert!(seen.insert(if a < b { (a, b) } else { (b, a) }));
        }
    }
}

#[test]
fn regenerating_groups_replaces_matches_and_frees_slots() {
    let mut f = Fixture::new(1, 2, 6);
    f.set_status(TournamentStatus::Closed);
    let first = generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    assert!(!f.store.matches.is_empty());

    let second = generate_groups(&mut f.store, f.modality_id).unwrap();
    assert_eq!(second.len(), first.len());
    assert!(first.iter().all(|g| !f.store.groups.contains_key(&g.id)));
    assert_eq!(f.store.placements.len(), 6);
    assert!(f.store.matches.is_empty());
    assert!(f
        .store
        .slots
        .values()
        .all(|s| s.status == SlotStatus::Available));
}

#[test]
fn groups_are_frozen_once_a_result_exists() {
    let mut f = Fixture::new(1, 2, 6);
    f.set_status(TournamentStatus::Closed);
    generate_groups(&mut f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();
    schedule_group_matches(&mut f.store, f.tournament_id).unwrap();
    f.set_status(TournamentStatus::Generated);
    let id = f.store.matches_of(f.modality_id)[0].id;
    win_for_a(&mut f.store, id);

    assert!(matches!(
        generate_groups(&mut f.store, f.modality_id),
        Err(TournamentError::ResultsAlreadyRecorded { .. })
    ));
}

#[test]
fn a_plan_from_an_old_snapshot_is_not_committed() {
    let mut f = Fixture::new(1, 1, 6);
    f.set_status(TournamentStatus::Closed);
    let plan = plan_groups(&f.store, f.modality_id).unwrap();
    generate_slots(&mut f.store, f.tournament_id).unwrap();

    assert_eq!(
        commit_groups(&mut f.store, plan).unwrap_err(),
        TournamentError::StaleGeneration {
            expected: 0,
            found: 1
        }
    );
    assert!(f.store.groups.is_empty());
}
