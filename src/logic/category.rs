//! Category changes: rule-based ascension after a final, committee approval
//! and manual requests.

use crate::config::EngineConfig;
use crate::logic::ranking::ranking_row;
use crate::models::{
    CategoryChange, CategoryChangeId, ChangeStatus, ChangeType, FinalStage, ModalityId,
    ModalityKind, Phase, PlayerId, Scope, TournamentError,
};
use crate::store::Store;
use chrono::Utc;
use uuid::Uuid;

/// Which ascension rule fired.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AscensionRule {
    /// Won a tournament in the sample.
    TournamentWin,
    /// Reached the final in consecutive tournaments.
    ConsecutiveFinals,
    /// Enough semifinal-or-better results over a full sample.
    SemifinalRecord,
}

impl AscensionRule {
    /// Only the semifinal record needs a committee decision.
    pub fn auto_approved(self) -> bool {
        !matches!(self, AscensionRule::SemifinalRecord)
    }

    pub fn reason(self, config: &EngineConfig) -> String {
        match self {
            AscensionRule::TournamentWin => "Won a tournament in the category".to_string(),
            AscensionRule::ConsecutiveFinals => format!(
                "Reached the final in {} consecutive tournaments",
                config.consecutive_finals
            ),
            AscensionRule::SemifinalRecord => format!(
                "Reached at least the semifinal in {} of the last {} tournaments",
                config.semifinals_for_review, config.ascension_sample
            ),
        }
    }
}

/// Evaluate the ascension rules, in priority order, over a player's most
/// recent results (most recent first, at most `ascension_sample` long).
pub fn evaluate_ascension(history: &[FinalStage], config: &EngineConfig) -> Option<AscensionRule> {
    let sample = &history[..history.len().min(config.ascension_sample)];

    if sample.contains(&FinalStage::Champion) {
        return Some(AscensionRule::TournamentWin);
    }

    let mut streak = 0;
    let mut longest = 0;
    for stage in sample {
        if stage.reached_final() {
            streak += 1;
            longest = longest.max(streak);
        } else {
            streak = 0;
        }
    }
    if longest >= config.consecutive_finals {
        return Some(AscensionRule::ConsecutiveFinals);
    }

    let semis = sample.iter().filter(|s| s.semifinal_or_better()).count();
    if sample.len() == config.ascension_sample && semis >= config.semifinals_for_review {
        return Some(AscensionRule::SemifinalRecord);
    }
    None
}

/// A player's most recent final stages in `kind`/`category`, newest first.
pub fn player_history(
    store: &Store,
    player_id: PlayerId,
    kind: ModalityKind,
    category: &str,
    limit: usize,
) -> Vec<FinalStage> {
    let mut results: Vec<_> = store
        .registrations
        .values()
        .filter(|r| r.players().contains(&player_id))
        .filter_map(|r| {
            let stage = r.final_stage?;
            let modality = store.modalities.get(&r.modality_id)?;
            if modality.kind != kind || modality.category != category {
                return None;
            }
            let start = store.tournaments.get(&modality.tournament_id)?.start_date;
            Some(((start, r.registered_at), stage))
        })
        .collect();
    results.sort_by(|a, b| b.0.cmp(&a.0));
    results.into_iter().take(limit).map(|(_, s)| s).collect()
}

fn has_pending(store: &Store, player_id: PlayerId, kind: ModalityKind) -> bool {
    store.category_changes.iter().any(|c| {
        c.player_id == player_id && c.kind == kind && c.status == ChangeStatus::Pending
    })
}

/// Move a player to `category` and start its ranking rows from zero.
fn apply_category(store: &mut Store, player_id: PlayerId, kind: ModalityKind, category: &str) {
    if let Some(player) = store.players.get_mut(&player_id) {
        player.categories.insert(kind, category.to_string());
    }
    for scope in Scope::ALL {
        ranking_row(store, player_id, kind, category, scope).reset();
    }
}

/// Run the ascension rules for one player and record the resulting change.
///
/// Returns `None` when no rule fires, the player is already at the top of
/// the ladder, or a pending change already exists.
pub fn evaluate_player_ascension(
    store: &mut Store,
    player_id: PlayerId,
    kind: ModalityKind,
    category: &str,
) -> Result<Option<CategoryChange>, TournamentError> {
    let player = store.player(player_id)?;
    let current = player.category(kind).unwrap_or(category).to_string();
    let Some(target) = kind.category_above(&current) else {
        log::debug!("Player {} cannot ascend above {}", player_id, current);
        return Ok(None);
    };
    if has_pending(store, player_id, kind) {
        log::debug!("Player {} already has a pending category change", player_id);
        return Ok(None);
    }

    let history = player_history(store, player_id, kind, category, store.config.ascension_sample);
    let Some(rule) = evaluate_ascension(&history, &store.config) else {
        return Ok(None);
    };

    let auto = rule.auto_approved();
    let change = CategoryChange {
        id: Uuid::new_v4(),
        player_id,
        kind,
        from_category: current,
        to_category: target.to_string(),
        change_type: ChangeType::Ascension,
        status: if auto {
            ChangeStatus::Approved
        } else {
            ChangeStatus::Pending
        },
        reason: rule.reason(&store.config),
        auto_approved: auto,
        created_at: Utc::now().naive_utc(),
    };
    if auto {
        apply_category(store, player_id, kind, target);
    }
    store.category_changes.push(change.clone());

    log::info!(
        "Player {} ascension {} -> {} ({:?}, {})",
        player_id,
        change.from_category,
        change.to_category,
        rule,
        if auto { "auto-approved" } else { "pending review" }
    );
    Ok(Some(change))
}

/// Evaluate ascension for both players of a modality's champion pair.
pub fn evaluate_after_final(
    store: &mut Store,
    modality_id: ModalityId,
) -> Result<Vec<CategoryChange>, TournamentError> {
    let modality = store.modality(modality_id)?;
    let (kind, category) = (modality.kind, modality.category.clone());
    let champion = store
        .matches_of(modality_id)
        .into_iter()
        .find(|m| m.phase == Phase::Final)
        .and_then(|m| m.winning_team());
    let Some(champion) = champion else {
        return Ok(Vec::new());
    };

    let players = store.registration(champion)?.players();
    let mut changes = Vec::new();
    for player in players {
        if let Some(change) = evaluate_player_ascension(store, player, kind, &category)? {
            changes.push(change);
        }
    }
    Ok(changes)
}

/// Committee approval of a pending change.
pub fn approve_category_change(
    store: &mut Store,
    change_id: CategoryChangeId,
) -> Result<CategoryChange, TournamentError> {
    let change = store
        .category_changes
        .iter_mut()
        .find(|c| c.id == change_id)
        .ok_or(TournamentError::CategoryChangeNotFound(change_id))?;
    if change.status != ChangeStatus::Pending {
        return Err(TournamentError::CategoryChangeNotPending(change_id));
    }
    change.status = ChangeStatus::Approved;
    let change = change.clone();
    apply_category(store, change.player_id, change.kind, &change.to_category);
    log::info!(
        "Approved category change {} for player {}: {} -> {}",
        change.id,
        change.player_id,
        change.from_category,
        change.to_category
    );
    Ok(change)
}

/// Open a pending promotion or demotion by hand.
pub fn request_category_change(
    store: &mut Store,
    player_id: PlayerId,
    kind: ModalityKind,
    to_category: &str,
    reason: impl Into<String>,
) -> Result<CategoryChange, TournamentError> {
    let player = store.player(player_id)?;
    let from = player
        .category(kind)
        .ok_or_else(|| TournamentError::InvalidCategory(format!("player has no {:?} category", kind)))?
        .to_string();
    let (Some(from_rank), Some(to_rank)) = (kind.rank_of(&from), kind.rank_of(to_category)) else {
        return Err(TournamentError::InvalidCategory(format!(
            "{} -> {} is not on the {:?} ladder",
            from, to_category, kind
        )));
    };
    let change_type = match to_rank.cmp(&from_rank) {
        std::cmp::Ordering::Greater => ChangeType::Ascension,
        std::cmp::Ordering::Less => ChangeType::Descent,
        std::cmp::Ordering::Equal => {
            return Err(TournamentError::InvalidCategory(format!(
                "player is already in {}",
                from
            )))
        }
    };
    if has_pending(store, player_id, kind) {
        return Err(TournamentError::PendingCategoryChange(player_id));
    }

    let change = CategoryChange {
        id: Uuid::new_v4(),
        player_id,
        kind,
        from_category: from,
        to_category: kind.ladder()[to_rank].to_string(),
        change_type,
        status: ChangeStatus::Pending,
        reason: reason.into(),
        auto_approved: false,
        created_at: Utc::now().naive_utc(),
    };
    store.category_changes.push(change.clone());
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use FinalStage::*;

    #[test]
    fn rules_fire_in_priority_order() {
        let config = EngineConfig::default();
        assert_eq!(
            evaluate_ascension(&[RunnerUp, Champion], &config),
            Some(AscensionRule::TournamentWin)
        );
        assert_eq!(
            evaluate_ascension(&[RunnerUp, RunnerUp, GroupStage], &config),
            Some(AscensionRule::ConsecutiveFinals)
        );
        assert_eq!(
            evaluate_ascension(&[RunnerUp, Semifinalist, RunnerUp], &config),
            None
        );
    }

    #[test]
    fn semifinal_record_needs_a_full_sample() {
        let config = EngineConfig::default();
        let four = [Semifinalist, Semifinalist, RunnerUp, GroupStage];
        assert_eq!(evaluate_ascension(&four, &config), None);
        let five = [Semifinalist, Semifinalist, RunnerUp, GroupStage, Quarterfinalist];
        let rule = evaluate_ascension(&five, &config);
        assert_eq!(rule, Some(AscensionRule::SemifinalRecord));
        assert!(!AscensionRule::SemifinalRecord.auto_approved());
    }

    #[test]
    fn only_the_last_five_count() {
        let config = EngineConfig::default();
        let history = [GroupStage, GroupStage, GroupStage, GroupStage, GroupStage, Champion];
        assert_eq!(evaluate_ascension(&history, &config), None);
    }
}
