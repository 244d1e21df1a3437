//! Auto-send gate and agent-facing guidance.

use serde::Serialize;
use utoipa::ToSchema;

use crate::intent::{DraftType, Intent, SafetyMode};
use crate::resolver::HIGH_CONFIDENCE_MIN;

/// The six conditions a ticket must meet to be sent without review, in the
/// order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AutoSendCriterion {
    IntentNotShippingStatus,
    ConfidenceBelowThreshold,
    DraftNotFull,
    HasAttachments,
    UnsafeSafetyMode,
    AmbiguityDetected,
}

impl AutoSendCriterion {
    pub const ORDER: [AutoSendCriterion; 6] = [
        AutoSendCriterion::IntentNotShippingStatus,
        AutoSendCriterion::ConfidenceBelowThreshold,
        AutoSendCriterion::DraftNotFull,
        AutoSendCriterion::HasAttachments,
        AutoSendCriterion::UnsafeSafetyMode,
        AutoSendCriterion::AmbiguityDetected,
    ];

    pub fn code(self) -> &'static str {
        match self {
            AutoSendCriterion::IntentNotShippingStatus => "intent_not_shipping_status",
            AutoSendCriterion::ConfidenceBelowThreshold => "confidence_below_threshold",
            AutoSendCriterion::DraftNotFull => "draft_not_full",
            AutoSendCriterion::HasAttachments => "has_attachments",
            AutoSendCriterion::UnsafeSafetyMode => "unsafe_safety_mode",
            AutoSendCriterion::AmbiguityDetected => "ambiguity_detected",
        }
    }

    fn fails(self, inputs: &GateInputs) -> bool {
        match self {
            AutoSendCriterion::IntentNotShippingStatus => {
                inputs.primary_intent != Intent::ShippingStatus
            }
            AutoSendCriterion::ConfidenceBelowThreshold => {
                inputs.confidence_overall < HIGH_CONFIDENCE_MIN
            }
            AutoSendCriterion::DraftNotFull => inputs.draft_type != DraftType::Full,
            AutoSendCriterion::HasAttachments => inputs.attachment_count > 0,
            AutoSendCriterion::UnsafeSafetyMode => inputs.safety_mode != SafetyMode::Safe,
            AutoSendCriterion::AmbiguityDetected => inputs.ambiguity_detected,
        }
    }

    fn reason(self, inputs: &GateInputs) -> String {
        let intent = inputs.primary_intent;
        match self {
            AutoSendCriterion::IntentNotShippingStatus => format!(
                "Intent is {intent}; only shipping_status inquiries can be auto-sent. Manual review required."
            ),
            AutoSendCriterion::ConfidenceBelowThreshold => format!(
                "Intent is {intent} but confidence {:.2} is below the {HIGH_CONFIDENCE_MIN:.2} threshold. Manual review required.",
                inputs.confidence_overall
            ),
            AutoSendCriterion::DraftNotFull => format!(
                "Draft is {} rather than a full response. Manual review required.",
                inputs.draft_type.as_str()
            ),
            AutoSendCriterion::HasAttachments => format!(
                "Ticket has {} attachment(s) that an agent must inspect.",
                inputs.attachment_count
            ),
            AutoSendCriterion::UnsafeSafetyMode => format!(
                "Diagnostic issue detected ({intent}). Request data before troubleshooting."
            ),
            AutoSendCriterion::AmbiguityDetected => format!(
                "Intent is ambiguous; {intent} was chosen by tie-break. Manual review required."
            ),
        }
    }
}

/// Facts the gate looks at. Nothing else influences eligibility.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateInputs {
    pub primary_intent: Intent,
    pub confidence_overall: f64,
    pub draft_type: DraftType,
    pub attachment_count: usize,
    pub safety_mode: SafetyMode,
    pub ambiguity_detected: bool,
}

/// First failing criterion, or `None` when the ticket may be auto-sent.
pub fn evaluate_auto_send(inputs: &GateInputs) -> Option<AutoSendCriterion> {
    AutoSendCriterion::ORDER
        .into_iter()
        .find(|criterion| criterion.fails(inputs))
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CannedResponseSuggestion {
    pub category: String,
    pub reason: String,
    /// When the agent should reach for the canned response
    pub timing: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AgentGuidance {
    pub auto_send_eligible: bool,
    /// Always the negation of `auto_send_eligible`
    pub requires_review: bool,
    pub reason: String,
    pub recommendation: String,
    pub suggested_actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_criterion: Option<AutoSendCriterion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canned_response_suggestion: Option<CannedResponseSuggestion>,
}

pub fn build_guidance(inputs: &GateInputs) -> AgentGuidance {
    let failed_criterion = evaluate_auto_send(inputs);
    let auto_send_eligible = failed_criterion.is_none();
    let reason = match failed_criterion {
        None => format!(
            "High-confidence shipping inquiry ({}). Auto-send eligible.",
            inputs.primary_intent
        ),
        Some(criterion) => criterion.reason(inputs),
    };

    AgentGuidance {
        auto_send_eligible,
        requires_review: !auto_send_eligible,
        reason,
        recommendation: recommendation(inputs),
        suggested_actions: suggested_actions(inputs.primary_intent),
        failed_criterion,
        canned_response_suggestion: canned_response(inputs.primary_intent),
    }
}

fn recommendation(inputs: &GateInputs) -> String {
    let intent = inputs.primary_intent;
    if inputs.draft_type == DraftType::Escalation {
        return format!(
            "Customer has exhausted basic troubleshooting ({intent}). Escalate to a senior agent with the requested diagnostics."
        );
    }
    if inputs.safety_mode == SafetyMode::Unsafe {
        return format!("Diagnostic issue detected ({intent}). Request data before troubleshooting.");
    }
    if intent == Intent::UnknownVague {
        return "Intent unclear. Request clarification from customer.".to_string();
    }
    "Informational request. Provide accurate information from knowledge base.".to_string()
}

fn suggested_actions(intent: Intent) -> Vec<String> {
    let actions: &[&str] = match intent {
        Intent::NotHashing => &[
            "Request debug.log and getblockchaininfo output",
            "Review logs for error patterns",
            "Consider: Node Not Hashing Troubleshooting canned response",
        ],
        Intent::SyncDelay => &[
            "Request current block height from getblockchaininfo",
            "Compare against network tip to confirm progress",
            "Consider: Node Sync Troubleshooting canned response",
        ],
        Intent::FirmwareIssue => &[
            "Confirm current firmware version",
            "Collect exact error messages",
            "Consider: Firmware Update Instructions canned response",
        ],
        Intent::PerformanceIssue => &[
            "Ask how often restarts or slowdowns occur",
            "Review debug.log for thermal or memory warnings",
            "Consider: Performance Diagnostics canned response",
        ],
        Intent::ShippingStatus => &[
            "Look up order in admin system",
            "Provide accurate tracking information",
            "Set realistic delivery expectations",
        ],
        Intent::SetupHelp => &[
            "Confirm solo or pool mining setup",
            "Verify the customer can reach the dashboard",
        ],
        Intent::WarrantyRma => &[
            "Check order date against warranty period",
            "Collect a description of the fault before issuing an RMA",
        ],
        Intent::GeneralQuestion => &[
            "Provide educational explanation",
            "Use neutral, informative tone",
            "Reference documentation if available",
        ],
        Intent::UnknownVague => &["Review customer message", "Provide appropriate response"],
    };
    actions.iter().map(|s| s.to_string()).collect()
}

/// Canned responses are only suggested for diagnostic intents, and only
/// after the requested data has been reviewed.
fn canned_response(intent: Intent) -> Option<CannedResponseSuggestion> {
    let (category, detail) = match intent {
        Intent::NotHashing => (
            "Node Not Hashing Troubleshooting",
            "step-by-step troubleshooting",
        ),
        Intent::SyncDelay => ("Node Sync Troubleshooting", "sync troubleshooting steps"),
        Intent::FirmwareIssue => ("Firmware Update Instructions", "recovery procedures"),
        Intent::PerformanceIssue => ("Performance Diagnostics", "diagnostic procedures"),
        _ => return None,
    };
    Some(CannedResponseSuggestion {
        category: category.to_string(),
        reason: format!("Intent is {intent}. Canned response contains {detail}."),
        timing: "after_diagnostic_review".to_string(),
    })
}
