use std::collections::BTreeSet;

use crate::intent::ActionKind;
use crate::phrases::ATTEMPTED_ACTION_PATTERNS;
use crate::text::{contains_any, normalize};

/// Troubleshooting steps the customer says they already tried.
///
/// Exact phrase-list membership only, case-insensitive. No stemming and no
/// partial credit.
pub fn detect_attempted_actions(text: &str) -> BTreeSet<ActionKind> {
    let text = normalize(text);
    ATTEMPTED_ACTION_PATTERNS
        .iter()
        .filter(|(_, patterns)| contains_any(&text, patterns))
        .map(|(kind, _)| *kind)
        .collect()
}

/// Union of attempted actions across several texts (latest message plus
/// earlier customer turns).
pub fn detect_across<'a>(texts: impl IntoIterator<Item = &'a str>) -> BTreeSet<ActionKind> {
    texts
        .into_iter()
        .flat_map(detect_attempted_actions)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_empty_set() {
        assert!(detect_attempted_actions("").is_empty());
        assert!(detect_attempted_actions("My miner is great").is_empty());
    }

    #[test]
    fn detects_each_kind_once() {
        let found = detect_attempted_actions(
            "I already tried restarting, tried updating firmware and changed pools. \
             Also I restarted again.",
        );
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec![
                ActionKind::Restart,
                ActionKind::FirmwareUpdate,
                ActionKind::PoolChange
            ]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let found = detect_attempted_actions("CHECKED LOGS already");
        assert!(found.contains(&ActionKind::CheckLogs));
    }

    #[test]
    fn no_stemming() {
        // "restart" alone is not an already-tried phrase.
        assert!(detect_attempted_actions("should I restart it?").is_empty());
    }

    #[test]
    fn detect_across_unions_sets() {
        let found = detect_across(["i restarted it", "then looked at logs"]);
        assert_eq!(found.len(), 2);
    }
}
