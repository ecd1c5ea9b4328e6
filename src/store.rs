//! In-memory persistence for every engine entity.
//!
//! Operations in [`crate::logic`] read a borrowed snapshot of the store, compute,
//! and write their results back through the helpers here.

use crate::config::EngineConfig;
use crate::models::{
    CategoryChange, Court, CourtId, GameMatch, Group, GroupId, GroupPlacement, MatchId, Modality,
    ModalityId, Player, PlayerId, Ranking, Registration, RegistrationId, Slot, SlotId, SlotStatus,
    Tournament, TournamentError, TournamentId,
};
use std::collections::HashMap;

/// Every persisted entity, keyed by id.
#[derive(Clone, Debug, Default)]
pub struct Store {
    pub config: EngineConfig,
    pub tournaments: HashMap<TournamentId, Tournament>,
    pub modalities: HashMap<ModalityId, Modality>,
    pub players: HashMap<PlayerId, Player>,
    pub registrations: HashMap<RegistrationId, Registration>,
    pub courts: HashMap<CourtId, Court>,
    pub slots: HashMap<SlotId, Slot>,
    pub groups: HashMap<GroupId, Group>,
    pub placements: Vec<GroupPlacement>,
    pub matches: HashMap<MatchId, GameMatch>,
    pub rankings: Vec<Ranking>,
    pub category_changes: Vec<CategoryChange>,
}

impl Store {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    pub fn add_tournament(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn add_modality(&mut self, modality: Modality) -> ModalityId {
        let id = modality.id;
        self.modalities.insert(id, modality);
        id
    }

    pub fn add_player(&mut self, player: Player) -> PlayerId {
        let id = player.id;
        self.players.insert(id, player);
        id
    }

    pub fn add_registration(&mut self, registration: Registration) -> RegistrationId {
        let id = registration.id;
        self.registrations.insert(id, registration);
        id
    }

    pub fn add_court(&mut self, court: Court) -> CourtId {
        let id = court.id;
        self.courts.insert(id, court);
        id
    }

    pub fn add_slot(&mut self, slot: Slot) -> SlotId {
        let id = slot.id;
        self.slots.insert(id, slot);
        id
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament, TournamentError> {
        self.tournaments
            .get(&id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn tournament_mut(&mut self, id: TournamentId) -> Result<&mut Tournament, TournamentError> {
        self.tournaments
            .get_mut(&id)
            .ok_or(TournamentError::TournamentNotFound(id))
    }

    pub fn modality(&self, id: ModalityId) -> Result<&Modality, TournamentError> {
        self.modalities
            .get(&id)
            .ok_or(TournamentError::ModalityNotFound(id))
    }

    pub fn modality_mut(&mut self, id: ModalityId) -> Result<&mut Modality, TournamentError> {
        self.modalities
            .get_mut(&id)
            .ok_or(TournamentError::ModalityNotFound(id))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, TournamentError> {
        self.players.get(&id).ok_or(TournamentError::PlayerNotFound(id))
    }

    pub fn registration(&self, id: RegistrationId) -> Result<&Registration, TournamentError> {
        self.registrations
            .get(&id)
            .ok_or(TournamentError::RegistrationNotFound(id))
    }

    pub fn group(&self, id: GroupId) -> Result<&Group, TournamentError> {
        self.groups.get(&id).ok_or(TournamentError::GroupNotFound(id))
    }

    pub fn game(&self, id: MatchId) -> Result<&GameMatch, TournamentError> {
        self.matches.get(&id).ok_or(TournamentError::MatchNotFound(id))
    }

    pub fn game_mut(&mut self, id: MatchId) -> Result<&mut GameMatch, TournamentError> {
        self.matches
            .get_mut(&id)
            .ok_or(TournamentError::MatchNotFound(id))
    }

    /// The tournament owning a modality.
    pub fn tournament_of(&self, modality_id: ModalityId) -> Result<&Tournament, TournamentError> {
        let modality = self.modality(modality_id)?;
        self.tournament(modality.tournament_id)
    }

    /// Modalities of a tournament in processing order.
    pub fn modalities_of(&self, tournament_id: TournamentId) -> Vec<&Modality> {
        let mut list: Vec<_> = self
            .modalities
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .collect();
        list.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        list
    }

    /// Registrations of a modality, oldest first.
    pub fn registrations_of(&self, modality_id: ModalityId) -> Vec<&Registration> {
        let mut list: Vec<_> = self
            .registrations
            .values()
            .filter(|r| r.modality_id == modality_id)
            .collect();
        list.sort_by(|a, b| {
            a.registered_at
                .cmp(&b.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    /// Courts of a tournament ordered by name.
    pub fn courts_of(&self, tournament_id: TournamentId) -> Vec<&Court> {
        let mut list: Vec<_> = self
            .courts
            .values()
            .filter(|c| c.tournament_id == tournament_id)
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        list
    }

    /// Slots of a tournament in chronological order (date, start, court name).
    pub fn slots_of(&self, tournament_id: TournamentId) -> Vec<&Slot> {
        let mut list: Vec<_> = self
            .slots
            .values()
            .filter(|s| s.tournament_id == tournament_id)
            .collect();
        list.sort_by(|a, b| {
            (a.date, a.start)
                .cmp(&(b.date, b.start))
                .then_with(|| self.court_name(a.court_id).cmp(self.court_name(b.court_id)))
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    pub fn court_name(&self, court_id: CourtId) -> &str {
        self.courts.get(&court_id).map(|c| c.name.as_str()).unwrap_or("")
    }

    /// Groups of a modality in display order.
    pub fn groups_of(&self, modality_id: ModalityId) -> Vec<&Group> {
        let mut list: Vec<_> = self
            .groups
            .values()
            .filter(|g| g.modality_id == modality_id)
            .collect();
        list.sort_by_key(|g| g.order);
        list
    }

    pub fn placements_of(&self, group_id: GroupId) -> Vec<&GroupPlacement> {
        self.placements
            .iter()
            .filter(|p| p.group_id == group_id)
            .collect()
    }

    /// Matches of a modality ordered by round, then position in the round.
    pub fn matches_of(&self, modality_id: ModalityId) -> Vec<&GameMatch> {
        let mut list: Vec<_> = self
            .matches
            .values()
            .filter(|m| m.modality_id == modality_id)
            .collect();
        sort_matches(&mut list);
        list
    }

    /// Matches of every modality of a tournament, in modality order.
    pub fn matches_of_tournament(&self, tournament_id: TournamentId) -> Vec<&GameMatch> {
        self.modalities_of(tournament_id)
            .into_iter()
            .flat_map(|m| self.matches_of(m.id))
            .collect()
    }

    /// Put an assigned slot back into the pool.
    pub fn release_slot(&mut self, slot_id: SlotId) {
        if let Some(slot) = self.slots.get_mut(&slot_id) {
            if slot.status == SlotStatus::Assigned {
                slot.status = SlotStatus::Available;
            }
        }
    }

    /// Delete every match matching `predicate`, releasing the slots they held.
    /// Returns how many were removed.
    pub fn remove_matches(&mut self, predicate: impl Fn(&GameMatch) -> bool) -> usize {
        let doomed: Vec<(MatchId, Option<SlotId>)> = self
            .matches
            .values()
            .filter(|m| predicate(m))
            .map(|m| (m.id, m.slot_id))
            .collect();
        for (id, slot) in &doomed {
            self.matches.remove(id);
            if let Some(slot) = slot {
                self.release_slot(*slot);
            }
        }
        doomed.len()
    }

    /// Fail if the tournament moved past `expected` since a plan was computed.
    pub fn check_generation(
        &self,
        tournament_id: TournamentId,
        expected: u64,
    ) -> Result<(), TournamentError> {
        let found = self.tournament(tournament_id)?.generation;
        if found != expected {
            return Err(TournamentError::StaleGeneration { expected, found });
        }
        Ok(())
    }

    pub fn bump_generation(&mut self, tournament_id: TournamentId) -> Result<u64, TournamentError> {
        let t = self.tournament_mut(tournament_id)?;
        t.generation += 1;
        Ok(t.generation)
    }
}

pub(crate) fn sort_matches(list: &mut [&GameMatch]) {
    list.sort_by(|a, b| {
        a.phase
            .is_knockout()
            .cmp(&b.phase.is_knockout())
            .then_with(|| a.round_order.cmp(&b.round_order))
            .then_with(|| a.match_order.cmp(&b.match_order))
            .then_with(|| a.id.cmp(&b.id))
    });
}
