use serde::Serialize;

use crate::intent::{ConfidenceLabel, Intent, SafetyMode};
use crate::scoring::IntentScoreBoard;

/// Top-two gap at or below which the classification is ambiguous.
pub const AMBIGUITY_MARGIN: f64 = 1.0;
const MARGIN_EPSILON: f64 = 1e-9;

pub const HIGH_CONFIDENCE_MIN: f64 = 0.85;
pub const MEDIUM_CONFIDENCE_MIN: f64 = 0.70;
pub const LOW_CONFIDENCE_MIN: f64 = 0.50;

/// Top score at which signal strength stops adding confidence
/// (one trigger phrase, one weak signal and a structural bonus).
pub const STRENGTH_SATURATION: f64 = 6.0;
/// Top-two gap at which separation stops adding confidence.
pub const SEPARATION_SATURATION: f64 = 4.0;
pub const STRENGTH_WEIGHT: f64 = 0.4;
pub const SEPARATION_WEIGHT: f64 = 0.6;

pub const MAX_SECONDARY_INTENTS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub primary_intent: Intent,
    pub secondary_intents: Vec<Intent>,
    pub confidence_overall: f64,
    pub confidence_label: ConfidenceLabel,
    pub ambiguity_detected: bool,
    pub safety_mode: SafetyMode,
}

impl Resolution {
    fn no_signal() -> Self {
        Self {
            primary_intent: Intent::UnknownVague,
            secondary_intents: Vec::new(),
            confidence_overall: 0.0,
            confidence_label: ConfidenceLabel::VeryLow,
            ambiguity_detected: false,
            safety_mode: SafetyMode::Safe,
        }
    }
}

/// Confidence in [0, 1] from the winning score and its lead over the
/// runner-up. Non-decreasing in both arguments; rounded to two decimals so
/// threshold comparisons are exact.
pub fn confidence_from_scores(top: f64, runner_up: f64) -> f64 {
    let top = top.max(0.0);
    let gap = (top - runner_up.max(0.0)).max(0.0);
    let strength = (top / STRENGTH_SATURATION).min(1.0);
    let separation = (gap / SEPARATION_SATURATION).min(1.0);
    let raw = STRENGTH_WEIGHT * strength + SEPARATION_WEIGHT * separation;
    ((raw * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

pub fn confidence_label(confidence: f64) -> ConfidenceLabel {
    if confidence >= HIGH_CONFIDENCE_MIN {
        ConfidenceLabel::High
    } else if confidence >= MEDIUM_CONFIDENCE_MIN {
        ConfidenceLabel::Medium
    } else if confidence >= LOW_CONFIDENCE_MIN {
        ConfidenceLabel::Low
    } else {
        ConfidenceLabel::VeryLow
    }
}

pub fn resolve(board: &IntentScoreBoard) -> Resolution {
    if board.is_empty() {
        return Resolution::no_signal();
    }

    let ranked = board.ranked();
    let (leader, top) = ranked[0];
    let runner_up = ranked.get(1).map(|(_, s)| *s).unwrap_or(0.0);

    // Only intents with actual evidence can take part in a tie.
    let tied: Vec<Intent> = ranked
        .iter()
        .filter(|(_, score)| *score > 0.0 && top - *score <= AMBIGUITY_MARGIN + MARGIN_EPSILON)
        .map(|(intent, _)| *intent)
        .collect();
    let ambiguity_detected = tied.len() > 1;

    let primary_intent = if ambiguity_detected {
        tied.iter()
            .copied()
            .min_by_key(|intent| intent.priority_rank())
            .unwrap_or(leader)
    } else {
        leader
    };

    let secondary_intents = ranked
        .iter()
        .filter(|(intent, score)| *score > 0.0 && *intent != primary_intent)
        .map(|(intent, _)| *intent)
        .take(MAX_SECONDARY_INTENTS)
        .collect();

    let confidence_overall = confidence_from_scores(top, runner_up);

    Resolution {
        primary_intent,
        secondary_intents,
        confidence_overall,
        confidence_label: confidence_label(confidence_overall),
        ambiguity_detected,
        safety_mode: primary_intent.safety_mode(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(entries: &[(Intent, f64)]) -> IntentScoreBoard {
        let mut board = IntentScoreBoard::new();
        for (intent, score) in entries {
            board.add(*intent, *score);
        }
        board
    }

    #[test]
    fn empty_board_is_unknown_vague_and_safe() {
        let res = resolve(&IntentScoreBoard::new());
        assert_eq!(res.primary_intent, Intent::UnknownVague);
        assert_eq!(res.safety_mode, SafetyMode::Safe);
        assert_eq!(res.confidence_label, ConfidenceLabel::VeryLow);
        assert_eq!(res.confidence_overall, 0.0);
        assert!(!res.ambiguity_detected);
        assert!(res.secondary_intents.is_empty());
    }

    #[test]
    fn clear_winner_is_primary() {
        let res = resolve(&board(&[
            (Intent::NotHashing, 6.9),
            (Intent::SyncDelay, 2.3),
        ]));
        assert_eq!(res.primary_intent, Intent::NotHashing);
        assert_eq!(res.safety_mode, SafetyMode::Unsafe);
        assert!(!res.ambiguity_detected);
        assert_eq!(res.secondary_intents, vec![Intent::SyncDelay]);
    }

    #[test]
    fn near_tie_resolves_by_priority_not_score() {
        // general_question leads by 0.9 but shipping_status is earlier in priority.
        let res = resolve(&board(&[
            (Intent::GeneralQuestion, 5.0),
            (Intent::ShippingStatus, 4.1),
        ]));
        assert!(res.ambiguity_detected);
        assert_eq!(res.primary_intent, Intent::ShippingStatus);
        assert_eq!(res.secondary_intents, vec![Intent::GeneralQuestion]);
    }

    #[test]
    fn gap_of_exactly_one_is_ambiguous() {
        let res = resolve(&board(&[
            (Intent::SetupHelp, 4.0),
            (Intent::FirmwareIssue, 3.0),
        ]));
        assert!(res.ambiguity_detected);
        assert_eq!(res.primary_intent, Intent::FirmwareIssue);
    }

    #[test]
    fn gap_above_one_is_not_ambiguous() {
        let res = resolve(&board(&[
            (Intent::SetupHelp, 4.0),
            (Intent::FirmwareIssue, 2.9),
        ]));
        assert!(!res.ambiguity_detected);
        assert_eq!(res.primary_intent, Intent::SetupHelp);
    }

    #[test]
    fn zero_scores_never_join_a_tie() {
        let res = resolve(&board(&[(Intent::GeneralQuestion, 0.8)]));
        assert_eq!(res.primary_intent, Intent::GeneralQuestion);
        assert!(!res.ambiguity_detected);
    }

    #[test]
    fn tie_includes_all_intents_within_margin_of_top() {
        let res = resolve(&board(&[
            (Intent::PerformanceIssue, 5.0),
            (Intent::SyncDelay, 4.5),
            (Intent::WarrantyRma, 4.0),
            (Intent::ShippingStatus, 3.5),
        ]));
        assert_eq!(res.primary_intent, Intent::WarrantyRma);
        assert_eq!(
            res.secondary_intents,
            vec![Intent::PerformanceIssue, Intent::SyncDelay]
        );
    }

    #[test]
    fn confidence_is_monotonic_in_gap_and_strength() {
        let mut last = -1.0;
        for gap in 0..=10 {
            let c = confidence_from_scores(6.0, 6.0 - f64::from(gap) * 0.5);
            assert!(c >= last);
            last = c;
        }
        assert!(confidence_from_scores(3.0, 0.0) <= confidence_from_scores(5.0, 0.0));
        assert_eq!(confidence_from_scores(20.0, 0.0), 1.0);
        assert_eq!(confidence_from_scores(0.0, 0.0), 0.0);
    }

    #[test]
    fn confidence_of_exactly_085_is_high() {
        // full strength, gap 3.0 of 4.0 saturation: 0.4 + 0.45
        let c = confidence_from_scores(6.0, 3.0);
        assert_eq!(c, 0.85);
        assert_eq!(confidence_label(c), ConfidenceLabel::High);
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(confidence_label(0.84), ConfidenceLabel::Medium);
        assert_eq!(confidence_label(0.70), ConfidenceLabel::Medium);
        assert_eq!(confidence_label(0.69), ConfidenceLabel::Low);
        assert_eq!(confidence_label(0.50), ConfidenceLabel::Low);
        assert_eq!(confidence_label(0.49), ConfidenceLabel::VeryLow);
    }

    #[test]
    fn ambiguous_results_never_reach_high_confidence() {
        let res = resolve(&board(&[
            (Intent::ShippingStatus, 30.0),
            (Intent::WarrantyRma, 29.5),
        ]));
        assert!(res.ambiguity_detected);
        assert!(res.confidence_overall < HIGH_CONFIDENCE_MIN);
    }
}
