//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use padel_tournament_engine::{
    record_match_result, AvailabilityDay, Court, EngineConfig, MatchId, Modality, ModalityId,
    ModalityKind, Player, Registration, RegistrationId, SetScore, Store, Tournament,
    TournamentId, TournamentStatus, Winner,
};
use uuid::Uuid;

pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn start_date() -> NaiveDate {
    date(2026, 5, 1)
}

/// A tournament with `courts` courts, one modality and `pairs` registrations.
pub struct Fixture {
    pub store: Store,
    pub tournament_id: TournamentId,
    pub modality_id: ModalityId,
    pub registrations: Vec<RegistrationId>,
}

impl Fixture {
    /// `days` playing days from 2026-05-01, 60-minute matches, courts open 08:00-20:00
    /// every day, a "Mixed C" modality paying P500 and `pairs` pairs registered.
    pub fn new(days: i64, courts: usize, pairs: usize) -> Self {
        let mut store = Store::new(EngineConfig::default());
        let tournament_id = add_tournament(&mut store, start_date(), days, 60);
        add_courts(&mut store, tournament_id, courts, time(8, 0), time(20, 0));
        let modality_id = store.add_modality(Modality::new(
            tournament_id,
            "Mixed C",
            ModalityKind::MixedDoubles,
            "C",
            "P500",
        ));
        let registrations = add_pairs(&mut store, modality_id, pairs);
        Self {
            store,
            tournament_id,
            modality_id,
            registrations,
        }
    }

    pub fn set_status(&mut self, status: TournamentStatus) {
        self.store
            .tournaments
            .get_mut(&self.tournament_id)
            .unwrap()
            .status = status;
    }

    pub fn status(&self) -> TournamentStatus {
        self.store.tournament(self.tournament_id).unwrap().status
    }

    /// Both players of a registration.
    pub fn players_of(&self, registration: RegistrationId) -> [Uuid; 2] {
        self.store.registration(registration).unwrap().players()
    }
}

pub fn add_tournament(store: &mut Store, start: NaiveDate, days: i64, duration: i64) -> TournamentId {
    let end = start + Duration::days(days - 1);
    store.add_tournament(Tournament::new("Club Open", Uuid::new_v4(), start, end, duration))
}

/// Courts "Court 1".."Court n" open every weekday between `open` and `close`.
pub fn add_courts(store: &mut Store, tournament_id: TournamentId, n: usize, open: NaiveTime, close: NaiveTime) {
    for i in 0..n {
        let court = WEEK.iter().fold(
            Court::new(tournament_id, format!("Court {}", i + 1)),
            |c, day| c.open_on(AvailabilityDay::Weekday(*day), open, close),
        );
        store.add_court(court);
    }
}

pub fn registered_at(i: usize) -> NaiveDateTime {
    date(2026, 4, 1).and_time(time(9, 0)) + Duration::minutes(i as i64)
}

/// Register `n` fresh pairs, one minute apart, all in mixed category C.
pub fn add_pairs(store: &mut Store, modality_id: ModalityId, n: usize) -> Vec<RegistrationId> {
    (0..n)
        .map(|i| {
            let a = store.add_player(
                Player::new(format!("P{}a", i)).with_category(ModalityKind::MixedDoubles, "C"),
            );
            let b = store.add_player(
                Player::new(format!("P{}b", i)).with_category(ModalityKind::MixedDoubles, "C"),
            );
            store.add_registration(Registration::new(modality_id, a, b, registered_at(i)))
        })
        .collect()
}

/// The match between two registrations.
pub fn match_between(store: &Store, a: RegistrationId, b: RegistrationId) -> MatchId {
    store
        .matches
        .values()
        .find(|m| m.involves(a) && m.involves(b))
        .map(|m| m.id)
        .unwrap()
}

/// Record the match between `a` and `b` with set scores given from `a`'s side.
pub fn play(store: &mut Store, a: RegistrationId, b: RegistrationId, sets_for_a: &[(u32, u32)]) {
    let id = match_between(store, a, b);
    let a_is_team_a = store.game(id).unwrap().team_a == Some(a);
    let sets: Vec<SetScore> = sets_for_a
        .iter()
        .map(|&(x, y)| if a_is_team_a { SetScore::new(x, y) } else { SetScore::new(y, x) })
        .collect();
    let a_sets = sets_for_a.iter().filter(|(x, y)| x > y).count();
    let a_won = a_sets * 2 > sets_for_a.len();
    let winner = match (a_won, a_is_team_a) {
        (true, true) | (false, false) => Winner::TeamA,
        _ => Winner::TeamB,
    };
    record_match_result(store, id, winner, sets).unwrap();
}

/// Side A wins 6-3 6-3.
pub fn win_for_a(store: &mut Store, id: MatchId) {
    record_match_result(
        store,
        id,
        Winner::TeamA,
        vec![SetScore::new(6, 3), SetScore::new(6, 3)],
    )
    .unwrap();
}

/// Play every match that has both sides and no result, side A winning, until
/// nothing is left (knockout winners feed later rounds).
pub fn play_out(store: &mut Store, modality_id: ModalityId) {
    loop {
        let ready: Vec<MatchId> = store
            .matches_of(modality_id)
            .into_iter()
            .filter(|m| !m.winner.is_decided() && m.team_a.is_some() && m.team_b.is_some())
            .map(|m| m.id)
            .collect();
        if ready.is_empty() {
            break;
        }
        for id in ready {
            win_for_a(store, id);
        }
    }
}
