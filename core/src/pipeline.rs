//! The full decision: classify, draft, gate.
//!
//! Each stage reads only the output of the stages before it, so the same
//! ticket always produces the same result.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::attempted::detect_across;
use crate::draft::{DraftContext, DraftResult, generate_draft};
use crate::guidance::{AgentGuidance, GateInputs, build_guidance};
use crate::intent::{ActionKind, ConfidenceLabel, Intent, SafetyMode, Tone};
use crate::resolver::resolve;
use crate::scoring::{ScoringInputs, detect_device_behavior, score_signals};
use crate::text::combined;
use crate::ticket::TicketRequest;
use crate::tone::detect_tone;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassificationResult {
    pub primary_intent: Intent,
    /// Other intents with a positive score, highest first (at most two)
    pub secondary_intents: Vec<Intent>,
    pub confidence_overall: f64,
    pub confidence_label: ConfidenceLabel,
    pub ambiguity_detected: bool,
    pub safety_mode: SafetyMode,
    pub tone: Tone,
    pub device_behavior_detected: bool,
    pub attempted_actions: Vec<ActionKind>,
    /// Final score per intent, rounded to two decimals
    #[schema(value_type = Object)]
    pub signal_breakdown: BTreeMap<Intent, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TicketAnalysis {
    pub intent_classification: ClassificationResult,
    pub draft: DraftResult,
    pub agent_guidance: AgentGuidance,
}

pub fn classify(ticket: &TicketRequest) -> ClassificationResult {
    let text = combined(&ticket.subject, &ticket.latest_message);
    let attempted = detect_across(
        std::iter::once(ticket.latest_message.as_str()).chain(ticket.customer_turns()),
    );
    let device_behavior_detected = detect_device_behavior(&text);

    let board = score_signals(&ScoringInputs {
        text: &text,
        has_order_number: ticket.metadata.order_number().is_some(),
        attachment_count: ticket.metadata.attachment_count(),
        attempted_action_count: attempted.len(),
        device_behavior_detected,
    });
    let resolution = resolve(&board);

    ClassificationResult {
        primary_intent: resolution.primary_intent,
        secondary_intents: resolution.secondary_intents,
        confidence_overall: resolution.confidence_overall,
        confidence_label: resolution.confidence_label,
        ambiguity_detected: resolution.ambiguity_detected,
        safety_mode: resolution.safety_mode,
        tone: detect_tone(&text),
        device_behavior_detected,
        attempted_actions: attempted.into_iter().collect(),
        signal_breakdown: board.breakdown(),
    }
}

pub fn analyze(ticket: &TicketRequest) -> TicketAnalysis {
    let classification = classify(ticket);
    let attempted = classification.attempted_actions.iter().copied().collect();

    let draft = generate_draft(&DraftContext {
        intent: classification.primary_intent,
        safety_mode: classification.safety_mode,
        tone: classification.tone,
        attempted_actions: &attempted,
        customer_name: ticket.customer_name(),
        product: ticket.metadata.product.as_deref(),
        order_number: ticket.metadata.order_number(),
    });

    let agent_guidance = build_guidance(&GateInputs {
        primary_intent: classification.primary_intent,
        confidence_overall: classification.confidence_overall,
        draft_type: draft.draft_type,
        attachment_count: ticket.metadata.attachment_count(),
        safety_mode: classification.safety_mode,
        ambiguity_detected: classification.ambiguity_detected,
    });

    TicketAnalysis {
        intent_classification: classification,
        draft,
        agent_guidance,
    }
}
