//! Visibility & broadcast policy.
//!
//! The single place where "who sees what" is decided. The policy is also the
//! only writer of the session history: connection handling never mutates the
//! store directly.

use crate::history::{HistoryEntry, SessionHistory};
use crate::roll::RollResult;

/// The three forms a resolved roll is published in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    /// What the requester receives. Always the full result.
    pub to_requester: HistoryEntry,
    /// What every other participant receives.
    pub to_others: HistoryEntry,
    /// What was recorded in the session history.
    pub stored: HistoryEntry,
}

/// Publish a resolved roll: record the storable form in history and return
/// each audience's view.
///
/// A visible roll is stored and broadcast in full, to everyone. A hidden
/// roll is revealed only to its requester; other participants and the
/// history get the redacted acknowledgment.
pub fn publish(result: RollResult, history: &mut SessionHistory) -> Publication {
    if result.hidden {
        let redacted = HistoryEntry::Redacted(result.redacted());
        history.record(redacted.clone());
        Publication {
            to_requester: HistoryEntry::Roll(result),
            to_others: redacted.clone(),
            stored: redacted,
        }
    } else {
        let full = HistoryEntry::Roll(result);
        history.record(full.clone());
        Publication {
            to_requester: full.clone(),
            to_others: full.clone(),
            stored: full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use crate::request::SanitizedRollRequest;
    use crate::roll::resolve;

    fn rolled(hidden: bool) -> RollResult {
        let req = SanitizedRollRequest {
            player_name: "Gracz".to_string(),
            dice_count: 2,
            difficulty: 6,
            auto_succ: 0,
            reroll_explode: false,
            mitigate_ones: 0,
            hidden,
            damage_mode: false,
        };
        resolve(&req, &ScriptedDice::new(vec![8, 3]))
    }

    #[test]
    fn test_visible_roll_is_full_everywhere() {
        let mut history = SessionHistory::new();
        let publication = publish(rolled(false), &mut history);

        assert_eq!(publication.to_requester, publication.to_others);
        assert_eq!(publication.to_others, publication.stored);
        assert!(matches!(publication.stored, HistoryEntry::Roll(_)));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_hidden_roll_redacts_for_others_and_history() {
        let mut history = SessionHistory::new();
        let publication = publish(rolled(true), &mut history);

        assert!(matches!(publication.to_requester, HistoryEntry::Roll(_)));
        assert!(matches!(publication.to_others, HistoryEntry::Redacted(_)));
        assert_eq!(publication.to_others, publication.stored);
        assert_eq!(history.snapshot()[0], publication.stored);
    }

    #[test]
    fn test_requester_view_keeps_base_results_for_hidden_rolls() {
        let mut history = SessionHistory::new();
        let publication = publish(rolled(true), &mut history);

        let requester_json =
            serde_json::to_value(&publication.to_requester).expect("serializes");
        let others_json = serde_json::to_value(&publication.to_others).expect("serializes");

        assert_eq!(requester_json["baseResults"], serde_json::json!([8, 3]));
        assert!(others_json.get("baseResults").is_none());
        assert_eq!(others_json["redacted"], true);
    }
}
