use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Why a customer contacted support. The taxonomy is closed: nine values,
/// no free-form intents.
///
/// Declaration order is the tie-break priority order, so `Ord` on this enum
/// is the priority order used by the resolver.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    WarrantyRma,
    ShippingStatus,
    FirmwareIssue,
    NotHashing,
    SyncDelay,
    PerformanceIssue,
    SetupHelp,
    GeneralQuestion,
    UnknownVague,
}

impl Intent {
    /// Fixed total-order priority list used to break near-ties.
    pub const PRIORITY: [Intent; 9] = [
        Intent::WarrantyRma,
        Intent::ShippingStatus,
        Intent::FirmwareIssue,
        Intent::NotHashing,
        Intent::SyncDelay,
        Intent::PerformanceIssue,
        Intent::SetupHelp,
        Intent::GeneralQuestion,
        Intent::UnknownVague,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::WarrantyRma => "warranty_rma",
            Intent::ShippingStatus => "shipping_status",
            Intent::FirmwareIssue => "firmware_issue",
            Intent::NotHashing => "not_hashing",
            Intent::SyncDelay => "sync_delay",
            Intent::PerformanceIssue => "performance_issue",
            Intent::SetupHelp => "setup_help",
            Intent::GeneralQuestion => "general_question",
            Intent::UnknownVague => "unknown_vague",
        }
    }

    /// Position in [`Intent::PRIORITY`]; lower wins a tie.
    pub fn priority_rank(self) -> usize {
        Self::PRIORITY
            .iter()
            .position(|candidate| *candidate == self)
            .unwrap_or(Self::PRIORITY.len())
    }

    /// Static safety lookup. Informational intents are safe; everything that
    /// needs diagnostic data before troubleshooting is unsafe.
    pub fn safety_mode(self) -> SafetyMode {
        match self {
            Intent::ShippingStatus
            | Intent::SetupHelp
            | Intent::GeneralQuestion
            | Intent::WarrantyRma => SafetyMode::Safe,
            Intent::NotHashing
            | Intent::SyncDelay
            | Intent::FirmwareIssue
            | Intent::PerformanceIssue
            | Intent::UnknownVague => SafetyMode::Unsafe,
        }
    }

    /// Device-symptom intents. These are the ones boosted by attachments,
    /// device-behavior phrases and repeated troubleshooting attempts.
    /// `unknown_vague` is unsafe but never accumulates score.
    pub fn is_diagnostic(self) -> bool {
        matches!(
            self,
            Intent::NotHashing
                | Intent::SyncDelay
                | Intent::FirmwareIssue
                | Intent::PerformanceIssue
        )
    }

    /// Intents damped when the customer describes device symptoms.
    pub fn is_informational(self) -> bool {
        matches!(self, Intent::GeneralQuestion | Intent::ShippingStatus)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SafetyMode {
    Safe,
    Unsafe,
}

impl SafetyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SafetyMode::Safe => "safe",
            SafetyMode::Unsafe => "unsafe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
    VeryLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Neutral,
    Panic,
    Frustration,
    Confusion,
}

/// Troubleshooting steps a customer reports having already tried.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Restart,
    FirmwareUpdate,
    PoolChange,
    CheckLogs,
}

impl ActionKind {
    /// Gerund used when acknowledging the attempt in a draft.
    pub fn readable(self) -> &'static str {
        match self {
            ActionKind::Restart => "restarting",
            ActionKind::FirmwareUpdate => "updating firmware",
            ActionKind::PoolChange => "changing pools",
            ActionKind::CheckLogs => "checking logs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DraftType {
    /// Complete answer.
    Full,
    /// Request diagnostic data or clarification before answering.
    ClarificationOnly,
    /// Acknowledge prior troubleshooting and request deeper diagnostics.
    Escalation,
}

impl DraftType {
    pub fn as_str(self) -> &'static str {
        match self {
            DraftType::Full => "full",
            DraftType::ClarificationOnly => "clarification_only",
            DraftType::Escalation => "escalation",
        }
    }
}
