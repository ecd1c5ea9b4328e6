//! Round-robin groups and each registration's placement within one.

use crate::models::modality::ModalityId;
use crate::models::player::RegistrationId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type GroupId = Uuid;

/// A named group (A, B, C, ...) of 3 or 4 registrations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub modality_id: ModalityId,
    pub name: String,
    pub size: usize,
    /// 1-based display order; drives mirror seeding of the bracket.
    pub order: u32,
}

/// A registration's membership in a group plus its computed standing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupPlacement {
    pub group_id: GroupId,
    pub registration_id: RegistrationId,
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub games_won: u32,
    pub games_lost: u32,
    pub points: u32,
    /// 1-based final position, once standings have been computed.
    pub position: Option<u32>,
}

impl GroupPlacement {
    pub fn new(group_id: GroupId, registration_id: RegistrationId) -> Self {
        Self {
            group_id,
            registration_id,
            ..Default::default()
        }
    }

    pub fn set_difference(&self) -> i64 {
        self.sets_won as i64 - self.sets_lost as i64
    }

    pub fn game_difference(&self) -> i64 {
        self.games_won as i64 - self.games_lost as i64
    }

    /// Zero every computed statistic, keeping membership.
    pub fn reset(&mut self) {
        *self = Self::new(self.group_id, self.registration_id);
    }
}

/// Spreadsheet-style group name for a 0-based index: A..Z, AA, AB, ...
pub fn group_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::group_name;

    #[test]
    fn names_follow_letters() {
        assert_eq!(group_name(0), "A");
        assert_eq!(group_name(25), "Z");
        assert_eq!(group_name(26), "AA");
    }
}
