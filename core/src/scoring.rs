use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::intent::Intent;
use crate::phrases::{
    DEVICE_BEHAVIOR_PHRASES, INTENT_PHRASES, STRONG_WEIGHT, TRIGGER_WEIGHT, WEAK_WEIGHT,
};
use crate::text::{contains_any, count_matches};

pub const ORDER_NUMBER_BONUS: f64 = 2.0;
pub const ATTACHMENT_BONUS: f64 = 2.0;
pub const DEVICE_BEHAVIOR_TECHNICAL_FACTOR: f64 = 1.15;
pub const DEVICE_BEHAVIOR_INFORMATIONAL_FACTOR: f64 = 0.85;
pub const REPEATED_ATTEMPTS_MIN: usize = 2;
pub const REPEATED_ATTEMPTS_DIAGNOSTIC_FACTOR: f64 = 1.10;
pub const REPEATED_ATTEMPTS_SETUP_FACTOR: f64 = 0.85;

/// Accumulated score per intent for a single classification pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScoreBoard {
    scores: [f64; 9],
}

impl Default for IntentScoreBoard {
    fn default() -> Self {
        Self { scores: [0.0; 9] }
    }
}

impl IntentScoreBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, intent: Intent) -> f64 {
        self.scores[intent.priority_rank()]
    }

    /// Negative deltas are ignored; scores only grow.
    pub fn add(&mut self, intent: Intent, delta: f64) {
        if delta > 0.0 {
            self.scores[intent.priority_rank()] += delta;
        }
    }

    pub fn scale(&mut self, intent: Intent, factor: f64) {
        let slot = &mut self.scores[intent.priority_rank()];
        *slot = (*slot * factor).max(0.0);
    }

    pub fn is_empty(&self) -> bool {
        self.scores.iter().all(|s| *s <= 0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Intent, f64)> + '_ {
        Intent::PRIORITY
            .iter()
            .map(|intent| (*intent, self.get(*intent)))
    }

    /// Intents by descending score; equal scores keep priority order.
    pub fn ranked(&self) -> Vec<(Intent, f64)> {
        let mut out: Vec<(Intent, f64)> = self.iter().collect();
        out.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        out
    }

    /// Rounded view for responses and logs.
    pub fn breakdown(&self) -> BTreeMap<Intent, f64> {
        self.iter()
            .map(|(intent, score)| (intent, round_score(score)))
            .collect()
    }
}

pub fn round_score(score: f64) -> f64 {
    (score * 100.0).round() / 100.0
}

/// Everything the scorer reads. `text` must already be normalized.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInputs<'a> {
    pub text: &'a str,
    pub has_order_number: bool,
    pub attachment_count: usize,
    pub attempted_action_count: usize,
    pub device_behavior_detected: bool,
}

pub fn detect_device_behavior(normalized_text: &str) -> bool {
    contains_any(normalized_text, DEVICE_BEHAVIOR_PHRASES)
}

/// Phrase weights first, then the four structural modifiers, each applied
/// exactly once in fixed order.
pub fn score_signals(inputs: &ScoringInputs<'_>) -> IntentScoreBoard {
    let mut board = IntentScoreBoard::new();

    for table in INTENT_PHRASES {
        let score = count_matches(inputs.text, table.triggers) as f64 * TRIGGER_WEIGHT
            + count_matches(inputs.text, table.strong) as f64 * STRONG_WEIGHT
            + count_matches(inputs.text, table.weak) as f64 * WEAK_WEIGHT;
        board.add(table.intent, score);
    }

    // (a) order number
    if inputs.has_order_number {
        board.add(Intent::ShippingStatus, ORDER_NUMBER_BONUS);
    }

    // (b) attachments
    if inputs.attachment_count > 0 {
        for intent in Intent::PRIORITY.into_iter().filter(|i| i.is_diagnostic()) {
            board.add(intent, ATTACHMENT_BONUS);
        }
    }

    // (c) device behavior
    if inputs.device_behavior_detected {
        for intent in Intent::PRIORITY {
            if intent.is_diagnostic() {
                board.scale(intent, DEVICE_BEHAVIOR_TECHNICAL_FACTOR);
            } else if intent.is_informational() {
                board.scale(intent, DEVICE_BEHAVIOR_INFORMATIONAL_FACTOR);
            }
        }
    }

    // (d) repeated troubleshooting
    if inputs.attempted_action_count >= REPEATED_ATTEMPTS_MIN {
        for intent in Intent::PRIORITY.into_iter().filter(|i| i.is_diagnostic()) {
            board.scale(intent, REPEATED_ATTEMPTS_DIAGNOSTIC_FACTOR);
        }
        board.scale(Intent::SetupHelp, REPEATED_ATTEMPTS_SETUP_FACTOR);
    }

    board
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(text: &str) -> ScoringInputs<'_> {
        ScoringInputs {
            text,
            has_order_number: false,
            attachment_count: 0,
            attempted_action_count: 0,
            device_behavior_detected: false,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn no_matches_leaves_board_empty() {
        let board = score_signals(&inputs("hello there"));
        assert!(board.is_empty());
    }

    #[test]
    fn trigger_strong_and_weak_weights() {
        // trigger "where is my order" + weak "order"
        let board = score_signals(&inputs("where is my order"));
        assert!(approx(board.get(Intent::ShippingStatus), 4.0));

        // trigger "return policy" + strong "return" + weak "policy"
        let board = score_signals(&inputs("return policy"));
        assert!(approx(board.get(Intent::WarrantyRma), 3.0 + 2.0 + 1.0));
    }

    #[test]
    fn order_number_boosts_shipping_only() {
        let mut input = inputs("hello");
        input.has_order_number = true;
        let board = score_signals(&input);
        assert!(approx(board.get(Intent::ShippingStatus), ORDER_NUMBER_BONUS));
        assert_eq!(board.iter().filter(|(_, s)| *s > 0.0).count(), 1);
    }

    #[test]
    fn attachments_boost_every_diagnostic_intent() {
        let mut input = inputs("hello");
        input.attachment_count = 1;
        let board = score_signals(&input);
        for (intent, score) in board.iter() {
            if intent.is_diagnostic() {
                assert!(approx(score, ATTACHMENT_BONUS), "{intent}");
            } else {
                assert!(approx(score, 0.0), "{intent}");
            }
        }
    }

    #[test]
    fn device_behavior_applies_after_additive_bonuses() {
        let mut input = inputs("hello");
        input.attachment_count = 2;
        input.has_order_number = true;
        input.device_behavior_detected = true;
        let board = score_signals(&input);
        assert!(approx(board.get(Intent::NotHashing), 2.0 * 1.15));
        assert!(approx(board.get(Intent::ShippingStatus), 2.0 * 0.85));
    }

    #[test]
    fn repeated_attempts_shift_setup_toward_diagnostics() {
        let mut input = inputs("how do i set up my pool settings");
        input.attempted_action_count = 2;
        let base = score_signals(&inputs("how do i set up my pool settings"));
        let board = score_signals(&input);
        assert!(approx(
            board.get(Intent::SetupHelp),
            base.get(Intent::SetupHelp) * 0.85
        ));

        let mut one = inputs("how do i set up my pool settings");
        one.attempted_action_count = 1;
        assert_eq!(score_signals(&one), base);
    }

    #[test]
    fn repeated_attempts_amplify_diagnostic_scores() {
        let base = score_signals(&inputs("not hashing"));
        assert!(approx(base.get(Intent::NotHashing), 3.0));

        let mut input = inputs("not hashing");
        input.attempted_action_count = 2;
        let board = score_signals(&input);
        assert!(approx(board.get(Intent::NotHashing), 3.0 * 1.10));
        assert!(approx(board.get(Intent::NotHashing), 3.3));
    }

    #[test]
    fn device_behavior_damps_informational_and_spares_setup() {
        let text = "what is a pool? how do i set up my pool";
        let base = score_signals(&inputs(text));
        assert!(base.get(Intent::GeneralQuestion) > 0.0);
        assert!(base.get(Intent::SetupHelp) > 0.0);

        let mut input = inputs(text);
        input.device_behavior_detected = true;
        let board = score_signals(&input);
        assert!(approx(
            board.get(Intent::GeneralQuestion),
            base.get(Intent::GeneralQuestion) * 0.85
        ));
        assert!(approx(board.get(Intent::SetupHelp), base.get(Intent::SetupHelp)));
    }

    #[test]
    fn scale_never_goes_negative() {
        let mut board = IntentScoreBoard::new();
        board.add(Intent::SyncDelay, -5.0);
        board.scale(Intent::SyncDelay, -1.0);
        assert!(approx(board.get(Intent::SyncDelay), 0.0));
    }

    #[test]
    fn ranked_breaks_equal_scores_by_priority() {
        let mut board = IntentScoreBoard::new();
        board.add(Intent::GeneralQuestion, 3.0);
        board.add(Intent::WarrantyRma, 3.0);
        let ranked = board.ranked();
        assert_eq!(ranked[0].0, Intent::WarrantyRma);
        assert_eq!(ranked[1].0, Intent::GeneralQuestion);
    }

    #[test]
    fn device_behavior_phrases() {
        assert!(detect_device_behavior("it is stuck at boot"));
        assert!(!detect_device_behavior("where is my order"));
    }
}
