//! Data structures for the tournament engine: the persisted entity set.

mod court;
mod game;
mod group;
mod modality;
mod player;
mod ranking;
mod tournament;

pub use court::{Availability, AvailabilityDay, Court, CourtId, Slot, SlotId, SlotStatus};
pub use game::{FinalStage, GameMatch, MatchId, Phase, SetScore, Side, Winner};
pub use group::{group_name, Group, GroupId, GroupPlacement};
pub use modality::{Modality, ModalityId, ModalityKind};
pub use player::{
    AssociationId, PaymentStatus, Player, PlayerId, Registration, RegistrationId,
    RegistrationStatus,
};
pub use ranking::{
    CategoryChange, CategoryChangeId, ChangeStatus, ChangeType, Ranking, RankingId, Scope,
};
pub use tournament::{ClubId, Tournament, TournamentError, TournamentId, TournamentStatus};
