//! Play a whole demo tournament with random scores and log every step.
//! Run with: cargo run --bin simulate
//! PAIRS (default 10) sets the number of registered pairs; RUST_LOG controls verbosity.

use chrono::{Duration, NaiveDate, NaiveTime, Weekday};
use padel_tournament_engine::{
    calculate_modality_standings, generate_bracket, generate_groups, generate_slots,
    record_match_result, schedule_group_matches, transition_tournament, AvailabilityDay, Court,
    EngineConfig, MatchId, Modality, ModalityId, ModalityKind, Player, Registration, SetScore,
    Store, Tournament, TournamentError, TournamentId, TournamentStatus, Winner,
};
use rand::Rng;
use uuid::Uuid;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn set_won_by(a_wins: bool, rng: &mut impl Rng) -> SetScore {
    let loser_games = rng.gen_range(0..=4);
    if a_wins {
        SetScore::new(6, loser_games)
    } else {
        SetScore::new(loser_games, 6)
    }
}

/// A best-of-three score won by a random side.
fn random_score(rng: &mut impl Rng) -> (Winner, Vec<SetScore>) {
    let a_wins = rng.gen_bool(0.5);
    let mut sets = Vec::with_capacity(3);
    if rng.gen_bool(0.3) {
        sets.push(set_won_by(!a_wins, rng));
    }
    sets.push(set_won_by(a_wins, rng));
    sets.push(set_won_by(a_wins, rng));
    let winner = if a_wins { Winner::TeamA } else { Winner::TeamB };
    (winner, sets)
}

fn transition(store: &mut Store, id: TournamentId, target: TournamentStatus) -> Result<(), TournamentError> {
    let outcome = transition_tournament(store, id, target)?;
    if !outcome.success {
        log::error!("Could not move to {}: {}", target, outcome.errors.join("; "));
        return Err(TournamentError::InvalidState {
            operation: "advance the simulated tournament",
            status: outcome.new_status,
        });
    }
    Ok(())
}

/// Matches with both pairs known and no result yet.
fn playable(store: &Store, modality_id: ModalityId) -> Vec<MatchId> {
    store
        .matches_of(modality_id)
        .into_iter()
        .filter(|m| !m.winner.is_decided() && m.team_a.is_some() && m.team_b.is_some())
        .map(|m| m.id)
        .collect()
}

fn play(store: &mut Store, ids: Vec<MatchId>, rng: &mut impl Rng) -> Result<usize, TournamentError> {
    let count = ids.len();
    for id in ids {
        let (winner, sets) = random_score(rng);
        record_match_result(store, id, winner, sets)?;
    }
    Ok(count)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let pairs: usize = std::env::var("PAIRS")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(10);
    let mut rng = rand::thread_rng();
    let mut store = Store::new(EngineConfig::default());

    let start = NaiveDate::from_ymd_opt(2026, 5, 1).ok_or("invalid start date")?;
    let end = start + Duration::days(2);
    let tournament = Tournament::new("Spring Open", Uuid::new_v4(), start, end, 60);
    let tid = store.add_tournament(tournament);

    let (open, close) = (
        NaiveTime::from_hms_opt(8, 0, 0).ok_or("invalid opening time")?,
        NaiveTime::from_hms_opt(22, 0, 0).ok_or("invalid closing time")?,
    );
    for name in ["Court 1", "Court 2", "Court 3"] {
        let court = WEEK.iter().fold(Court::new(tid, name), |c, day| {
            c.open_on(AvailabilityDay::Weekday(*day), open, close)
        });
        store.add_court(court);
    }
    let modality_id = store.add_modality(Modality::new(
        tid,
        "Mixed C",
        ModalityKind::MixedDoubles,
        "C",
        "P500",
    ));

    transition(&mut store, tid, TournamentStatus::Open)?;
    let opened = start.and_time(open) - Duration::days(30);
    for i in 0..pairs {
        let a = store.add_player(
            Player::new(format!("Player {}A", i + 1)).with_category(ModalityKind::MixedDoubles, "C"),
        );
        let b = store.add_player(
            Player::new(format!("Player {}B", i + 1)).with_category(ModalityKind::MixedDoubles, "C"),
        );
        store.add_registration(Registration::new(
            modality_id,
            a,
            b,
            opened + Duration::minutes(i as i64),
        ));
    }
    transition(&mut store, tid, TournamentStatus::Closed)?;

    let groups = generate_groups(&mut store, modality_id)?;
    let slots = generate_slots(&mut store, tid)?;
    let report = schedule_group_matches(&mut store, tid)?;
    log::info!(
        "{} groups, {} slots, {}/{} group matches scheduled",
        groups.len(),
        slots.total,
        report.scheduled,
        report.total_matches
    );
    transition(&mut store, tid, TournamentStatus::Generated)?;

    let group_matches = playable(&store, modality_id);
    let played = play(&mut store, group_matches, &mut rng)?;
    log::info!("Played {} group matches", played);
    transition(&mut store, tid, TournamentStatus::InProgress)?;
    transition(&mut store, tid, TournamentStatus::Eliminations)?;

    for table in calculate_modality_standings(&mut store, modality_id)? {
        for row in &table.standings {
            log::info!(
                "Group {} #{}: {} pts, sets {:+}, games {:+}",
                table.group.name,
                row.position.unwrap_or(0),
                row.points,
                row.set_difference(),
                row.game_difference()
            );
        }
    }

    let summary = generate_bracket(&mut store, tid, modality_id, Uuid::new_v4())?;
    log::info!(
        "Bracket: {} qualified, {} preliminary matches, {} byes, main round {}",
        summary.total_qualified,
        summary.preliminary_matches,
        summary.byes,
        summary.main_round
    );
    loop {
        let ready = playable(&store, modality_id);
        if ready.is_empty() {
            break;
        }
        play(&mut store, ready, &mut rng)?;
    }
    transition(&mut store, tid, TournamentStatus::Completed)?;

    let mut podium: Vec<_> = store
        .registrations_of(modality_id)
        .into_iter()
        .filter_map(|r| Some((r.final_stage?, r)))
        .collect();
    podium.sort_by(|a, b| b.0.cmp(&a.0));
    for (stage, registration) in podium.iter().take(4) {
        let names: Vec<&str> = registration
            .players()
            .iter()
            .filter_map(|p| store.players.get(p).map(|p| p.name.as_str()))
            .collect();
        log::info!("{:?}: {}", stage, names.join(" / "));
    }
    for change in &store.category_changes {
        log::info!(
            "Category change for {}: {} -> {} ({})",
            change.player_id,
            change.from_category,
            change.to_category,
            change.reason
        );
    }
    Ok(())
}
