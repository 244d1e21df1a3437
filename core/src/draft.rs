//! Template-based draft responses.
//!
//! A draft is assembled as a list of paragraphs. The template is picked by
//! draft type and intent, then the acknowledgment and panic-reassurance
//! paragraphs are inserted after the greeting.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

use crate::intent::{ActionKind, DraftType, Intent, SafetyMode, Tone};
use crate::phrases::{
    CLOSING_CUES, DEFAULT_DEVICE_NAME, DEVICE_NAMES, EMPATHY_PHRASES, EXPLANATORY_CONNECTIVES,
    GREETING_CUES, NUMBER_QUALIFIERS,
};
use crate::text::contains_any;

/// Attempted-action count at which a draft escalates instead of asking for
/// more of the same troubleshooting.
pub const ESCALATION_MIN_ATTEMPTS: usize = 3;

const GREETING_WINDOW_CHARS: usize = 50;
const BODY_MIN_CHARS: usize = 100;

/// Numbers with a time unit ("3 days", "2-4 weeks") or calendar dates.
static SPECIFIC_CLAIM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+(?:\s*-\s*\d+)?\s*(?:business\s+)?(?:minutes?|hours?|days?|weeks?|months?|years?)\b|\b\d{4}-\d{2}-\d{2}\b|\b(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d{1,2}\b",
    )
    .expect("valid specific claim regex")
});

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct QualityMetrics {
    /// Greeting, body and closing present (0.33 / 0.34 / 0.33)
    pub structure_score: f64,
    /// Always 0.0 until drafts cite knowledge-base sources
    pub source_grounding: f64,
    pub reasoning_clarity: f64,
    pub tone_appropriateness: f64,
    /// 0.30 when the draft states unqualified numbers or dates
    pub hallucination_risk: f64,
    pub already_tried_avoidance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DraftResult {
    pub draft_type: DraftType,
    pub response_text: String,
    pub quality_metrics: QualityMetrics,
}

/// Everything a template can draw on.
#[derive(Debug, Clone)]
pub struct DraftContext<'a> {
    pub intent: Intent,
    pub safety_mode: SafetyMode,
    pub tone: Tone,
    pub attempted_actions: &'a BTreeSet<ActionKind>,
    pub customer_name: Option<&'a str>,
    pub product: Option<&'a str>,
    pub order_number: Option<&'a str>,
}

pub fn select_draft_type(intent: Intent, safety_mode: SafetyMode, attempted: usize) -> DraftType {
    if attempted >= ESCALATION_MIN_ATTEMPTS {
        DraftType::Escalation
    } else if safety_mode == SafetyMode::Unsafe || intent == Intent::UnknownVague {
        DraftType::ClarificationOnly
    } else {
        DraftType::Full
    }
}

pub fn generate_draft(ctx: &DraftContext<'_>) -> DraftResult {
    let draft_type = select_draft_type(ctx.intent, ctx.safety_mode, ctx.attempted_actions.len());

    let mut paragraphs = match draft_type {
        DraftType::Escalation => escalation_draft(ctx),
        _ if ctx.intent == Intent::UnknownVague => clarification_draft(ctx),
        DraftType::ClarificationOnly => diagnostic_draft(ctx),
        DraftType::Full => safe_draft(ctx),
    };

    // Escalation drafts already open with the attempted steps.
    if draft_type != DraftType::Escalation && !ctx.attempted_actions.is_empty() {
        let list = format_actions(ctx.attempted_actions);
        insert_after_greeting(
            &mut paragraphs,
            format!("I see you've already tried {list}, which is good troubleshooting."),
        );
    }
    if ctx.tone == Tone::Panic {
        insert_after_greeting(&mut paragraphs, panic_reassurance(ctx.customer_name));
    }

    let response_text = paragraphs.join("\n\n");
    let quality_metrics = quality_metrics(&response_text);
    DraftResult {
        draft_type,
        response_text,
        quality_metrics,
    }
}

/// Display name for the customer's device from the storefront product string.
pub fn device_name(product: Option<&str>) -> &'static str {
    let Some(product) = product.map(str::to_lowercase) else {
        return DEFAULT_DEVICE_NAME;
    };
    DEVICE_NAMES
        .iter()
        .find(|(needles, _)| contains_any(&product, needles))
        .map(|(_, name)| *name)
        .unwrap_or(DEFAULT_DEVICE_NAME)
}

/// "a", "a and b", "a, b, and c"
pub fn format_actions(actions: &BTreeSet<ActionKind>) -> String {
    let names: Vec<&str> = actions.iter().map(|a| a.readable()).collect();
    match names.as_slice() {
        [] => String::new(),
        [one] => (*one).to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

pub fn quality_metrics(text: &str) -> QualityMetrics {
    let lower = text.to_lowercase();
    let opening: String = lower.chars().take(GREETING_WINDOW_CHARS).collect();

    let mut structure = 0.0;
    if contains_any(&opening, GREETING_CUES) {
        structure += 0.33;
    }
    if text.chars().count() > BODY_MIN_CHARS {
        structure += 0.34;
    }
    if contains_any(&lower, CLOSING_CUES) {
        structure += 0.33;
    }

    QualityMetrics {
        structure_score: (structure * 100.0_f64).round() / 100.0,
        source_grounding: 0.0,
        reasoning_clarity: if contains_any(&lower, EXPLANATORY_CONNECTIVES) {
            0.80
        } else {
            0.60
        },
        tone_appropriateness: if contains_any(&lower, EMPATHY_PHRASES) {
            0.90
        } else {
            0.70
        },
        hallucination_risk: if has_unqualified_claim(&lower) {
            0.30
        } else {
            0.05
        },
        already_tried_avoidance: 1.0,
    }
}

fn has_unqualified_claim(lower: &str) -> bool {
    lower
        .split(['.', '!', '?', '\n'])
        .any(|sentence| {
            SPECIFIC_CLAIM_RE.is_match(sentence) && !contains_any(sentence, NUMBER_QUALIFIERS)
        })
}

fn insert_after_greeting(paragraphs: &mut Vec<String>, paragraph: String) {
    let at = paragraphs.len().min(1);
    paragraphs.insert(at, paragraph);
}

fn greeting(base: &str, name: Option<&str>, separator: &str) -> String {
    match name {
        Some(name) => format!("{base}{separator}{name}"),
        None => base.to_string(),
    }
}

fn panic_reassurance(name: Option<&str>) -> String {
    match name {
        Some(name) => format!("{name}, I understand this is urgent and you need help right away."),
        None => "I understand this is urgent and you need help right away.".to_string(),
    }
}

fn issue_description(intent: Intent) -> &'static str {
    match intent {
        Intent::NotHashing => "isn't hashing",
        Intent::SyncDelay => "is having sync issues",
        Intent::FirmwareIssue => "is having firmware issues",
        Intent::PerformanceIssue => "is having performance issues",
        _ => "is having issues",
    }
}

/// Data the agent needs before troubleshooting, as bullet lines.
fn diagnostic_items(intent: Intent) -> &'static str {
    match intent {
        Intent::NotHashing => {
            "• Your debug.log file (Settings → Logs → Download)\n\
             • Output from: bitcoin-cli getblockchaininfo"
        }
        Intent::SyncDelay => {
            "• Output from: bitcoin-cli getblockchaininfo\n\
             • The block number you currently see"
        }
        Intent::FirmwareIssue => {
            "• The firmware version you're currently on (if accessible)\n\
             • Any error messages you're seeing\n\
             • What you were doing when the issue started"
        }
        Intent::PerformanceIssue => {
            "• How often the restarts or slowdowns are happening\n\
             • Your debug.log file (Settings → Logs → Download)\n\
             • Any pattern you've noticed (time of day, specific actions)"
        }
        _ => {
            "• Your debug.log file\n\
             • A description of what you were doing when the issue started"
        }
    }
}

fn diagnostic_draft(ctx: &DraftContext<'_>) -> Vec<String> {
    let device = device_name(ctx.product);
    vec![
        format!(
            "{}. I understand your {device} {}, and that's definitely something we need to resolve.",
            greeting("Thanks for reaching out", ctx.customer_name, ", "),
            issue_description(ctx.intent),
        ),
        "To help diagnose this, can you provide:".to_string(),
        diagnostic_items(ctx.intent).to_string(),
        "An agent will review these details and provide specific troubleshooting steps within 4 hours."
            .to_string(),
    ]
}

fn escalation_draft(ctx: &DraftContext<'_>) -> Vec<String> {
    let list = format_actions(ctx.attempted_actions);
    vec![
        format!(
            "{}.",
            greeting("Thanks for the detailed information", ctx.customer_name, ", ")
        ),
        format!(
            "I can see you've already tried {list}. That's thorough troubleshooting, and it shows this issue needs deeper investigation."
        ),
        "Since the problem persists after these steps, can you provide:".to_string(),
        diagnostic_items(ctx.intent).to_string(),
        "An agent will analyze these so we can skip straight to the cause rather than more trial and error."
            .to_string(),
    ]
}

fn clarification_draft(ctx: &DraftContext<'_>) -> Vec<String> {
    let device = device_name(ctx.product);
    vec![
        format!(
            "{}.",
            greeting("Thanks for reaching out", ctx.customer_name, ", ")
        ),
        "I want to make sure I understand your situation correctly.".to_string(),
        "Can you tell me which of these describes what's happening:".to_string(),
        format!(
            "• Your {device} isn't powering on at all\n\
             • It's powered on but showing 0 H/s (not mining)\n\
             • It's mining but slower than expected\n\
             • Something else"
        ),
        "Once I know which category this fits, I can give you the right next steps.".to_string(),
    ]
}

fn safe_draft(ctx: &DraftContext<'_>) -> Vec<String> {
    let name = ctx.customer_name;
    match ctx.intent {
        Intent::ShippingStatus => match ctx.order_number {
            Some(order) => vec![
                format!("{},", greeting("Hi", name, " ")),
                format!(
                    "I'll need to look up your order details to give you an accurate status. An agent will check order #{} and respond with tracking information within 2 hours.",
                    order.trim_start_matches('#')
                ),
                "In the meantime, typical Apollo shipping timeframes are 3-5 business days from the order date."
                    .to_string(),
            ],
            None => vec![
                format!("{},", greeting("Hi", name, " ")),
                "I can help you track your order. To look up your shipping status, I'll need your order number (it starts with \"FBT-\" and was in your confirmation email)."
                    .to_string(),
                "Once you provide that, an agent will give you the exact tracking information and delivery timeline."
                    .to_string(),
            ],
        },
        Intent::SetupHelp => vec![
            format!("{}.", greeting("Thanks for reaching out", name, ", ")),
            format!(
                "For setting up your {}, I'll need to know a bit more about what you're trying to configure:",
                device_name(ctx.product)
            ),
            "• Are you setting up for solo mining or pool mining?\n\
             • Do you have a specific pool in mind, or do you need recommendations?"
                .to_string(),
            "Once I know this, I can provide the exact steps for your setup.".to_string(),
        ],
        Intent::GeneralQuestion => vec![
            format!("{}.", greeting("Great question", name, ", ")),
            "To give you the most helpful answer, could you clarify which aspect you're most interested in? For example:"
                .to_string(),
            "• How the technology works\n\
             • Which option is better for your situation\n\
             • What the practical differences are"
                .to_string(),
            "This will help me tailor the explanation to what you need.".to_string(),
        ],
        Intent::WarrantyRma => vec![
            format!("{}.", greeting("Thanks for reaching out", name, ", ")),
            "I understand you're having issues with your device. To help you with warranty coverage or a potential RMA:"
                .to_string(),
            "• Can you describe what's happening with the device?\n\
             • When did you receive it?\n\
             • Have you tried any troubleshooting steps?"
                .to_string(),
            "An agent will review your specific situation and explain your options within 4 hours."
                .to_string(),
        ],
        _ => vec![
            format!("{}.", greeting("Thank you for contacting us", name, ", ")),
            "An agent will review your message and respond with the information you need within 4 hours."
                .to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(intent: Intent, attempted: &'a BTreeSet<ActionKind>) -> DraftContext<'a> {
        DraftContext {
            intent,
            safety_mode: intent.safety_mode(),
            tone: Tone::Neutral,
            attempted_actions: attempted,
            customer_name: None,
            product: None,
            order_number: None,
        }
    }

    #[test]
    fn draft_type_rules() {
        assert_eq!(
            select_draft_type(Intent::ShippingStatus, SafetyMode::Safe, 0),
            DraftType::Full
        );
        assert_eq!(
            select_draft_type(Intent::NotHashing, SafetyMode::Unsafe, 2),
            DraftType::ClarificationOnly
        );
        assert_eq!(
            select_draft_type(Intent::UnknownVague, SafetyMode::Safe, 0),
            DraftType::ClarificationOnly
        );
        assert_eq!(
            select_draft_type(Intent::ShippingStatus, SafetyMode::Safe, 3),
            DraftType::Escalation
        );
        assert_eq!(
            select_draft_type(Intent::NotHashing, SafetyMode::Unsafe, 4),
            DraftType::Escalation
        );
    }

    #[test]
    fn device_name_from_product() {
        assert_eq!(device_name(None), "Apollo");
        assert_eq!(device_name(Some("Apollo II Full Package")), "Apollo II");
        assert_eq!(device_name(Some("apollo3 node")), "Apollo III");
        assert_eq!(device_name(Some("Apollo III")), "Apollo III");
        assert_eq!(device_name(Some("Solo Node")), "Solo Node");
        assert_eq!(device_name(Some("Hoodie")), "Apollo");
    }

    #[test]
    fn actions_are_listed_readably() {
        let mut actions = BTreeSet::from([ActionKind::Restart]);
        assert_eq!(format_actions(&actions), "restarting");
        actions.insert(ActionKind::CheckLogs);
        assert_eq!(format_actions(&actions), "restarting and checking logs");
        actions.insert(ActionKind::PoolChange);
        assert_eq!(
            format_actions(&actions),
            "restarting, changing pools, and checking logs"
        );
    }

    #[test]
    fn shipping_draft_uses_order_number_and_name() {
        let none = BTreeSet::new();
        let mut c = ctx(Intent::ShippingStatus, &none);
        c.customer_name = Some("Dana");
        c.order_number = Some("FBT-2024-1234");
        let draft = generate_draft(&c);
        assert_eq!(draft.draft_type, DraftType::Full);
        assert!(draft.response_text.starts_with("Hi Dana,"));
        assert!(draft.response_text.contains("#FBT-2024-1234"));
        assert_eq!(draft.quality_metrics.hallucination_risk, 0.05);
        assert_eq!(draft.quality_metrics.structure_score, 1.0);
    }

    #[test]
    fn shipping_draft_without_order_asks_for_it() {
        let none = BTreeSet::new();
        let draft = generate_draft(&ctx(Intent::ShippingStatus, &none));
        assert!(draft.response_text.contains("I'll need your order number"));
    }

    #[test]
    fn diagnostic_draft_acknowledges_attempts() {
        let tried = BTreeSet::from([ActionKind::Restart]);
        let mut c = ctx(Intent::NotHashing, &tried);
        c.product = Some("Apollo II");
        let draft = generate_draft(&c);
        assert_eq!(draft.draft_type, DraftType::ClarificationOnly);
        assert!(draft.response_text.contains("Apollo II isn't hashing"));
        assert!(draft.response_text.contains("already tried restarting"));
        assert!(draft.response_text.contains("debug.log"));
    }

    #[test]
    fn escalation_draft_lists_every_attempt() {
        let tried = BTreeSet::from([
            ActionKind::Restart,
            ActionKind::FirmwareUpdate,
            ActionKind::PoolChange,
        ]);
        let draft = generate_draft(&ctx(Intent::ShippingStatus, &tried));
        assert_eq!(draft.draft_type, DraftType::Escalation);
        assert!(draft
            .response_text
            .contains("restarting, updating firmware, and changing pools"));
        assert_eq!(draft.response_text.matches("already tried").count(), 1);
    }

    #[test]
    fn unknown_vague_gets_clarification_menu() {
        let none = BTreeSet::new();
        let mut c = ctx(Intent::UnknownVague, &none);
        c.safety_mode = SafetyMode::Safe;
        let draft = generate_draft(&c);
        assert_eq!(draft.draft_type, DraftType::ClarificationOnly);
        assert!(draft.response_text.contains("Something else"));
    }

    #[test]
    fn panic_reassurance_follows_greeting() {
        let none = BTreeSet::new();
        let mut c = ctx(Intent::WarrantyRma, &none);
        c.tone = Tone::Panic;
        c.customer_name = Some("Sam");
        let draft = generate_draft(&c);
        let paragraphs: Vec<&str> = draft.response_text.split("\n\n").collect();
        assert_eq!(paragraphs[0], "Thanks for reaching out, Sam.");
        assert_eq!(
            paragraphs[1],
            "Sam, I understand this is urgent and you need help right away."
        );
    }

    #[test]
    fn hallucination_risk_flags_unqualified_numbers() {
        assert_eq!(
            quality_metrics("Your unit ships in 3 days.").hallucination_risk,
            0.30
        );
        assert_eq!(
            quality_metrics("Your unit usually ships in 3 days.").hallucination_risk,
            0.05
        );
        assert_eq!(
            quality_metrics("It arrives on 2024-05-01.").hallucination_risk,
            0.30
        );
        assert_eq!(quality_metrics("No numbers here.").hallucination_risk, 0.05);
    }

    #[test]
    fn quality_metric_cues() {
        let m = quality_metrics("Hi. To help, I understand.");
        assert_eq!(m.reasoning_clarity, 0.80);
        assert_eq!(m.tone_appropriateness, 0.90);
        assert_eq!(m.structure_score, 0.33);
        assert_eq!(m.source_grounding, 0.0);
        assert_eq!(m.already_tried_avoidance, 1.0);
    }
}
