//! Fixed phrase tables for the rule engine.
//!
//! Every table here is plain constant data. The scorer, detectors and draft
//! generator only read these tables; no matching logic lives in this module.
//! All phrases are lowercase and matched as substrings of normalized text.

use crate::intent::{ActionKind, Intent};

pub const TRIGGER_WEIGHT: f64 = 3.0;
pub const STRONG_WEIGHT: f64 = 2.0;
pub const WEAK_WEIGHT: f64 = 1.0;

/// Phrase weights for one intent.
#[derive(Debug)]
pub struct IntentPhrases {
    pub intent: Intent,
    /// Intent-defining phrases, +3.0 each.
    pub triggers: &'static [&'static str],
    /// +2.0 each.
    pub strong: &'static [&'static str],
    /// +1.0 each.
    pub weak: &'static [&'static str],
}

/// `unknown_vague` has no table; it is only ever the fallback.
pub const INTENT_PHRASES: &[IntentPhrases] = &[
    IntentPhrases {
        intent: Intent::ShippingStatus,
        triggers: &[
            "where is my order",
            "where's my order",
            "track my order",
            "shipping status",
            "delivery status",
            "when will it arrive",
            "when will it ship",
            "order hasn't arrived",
            "package hasn't arrived",
            "tracking number",
        ],
        strong: &[
            "shipment",
            "delivery",
            "tracking",
            "shipped",
            "fedex",
            "ups",
            "usps",
            "eta",
            "estimated delivery",
            "order status",
        ],
        weak: &["order", "package", "waiting", "arrived", "receive"],
    },
    IntentPhrases {
        intent: Intent::SetupHelp,
        triggers: &[
            "how do i set up",
            "how to set up",
            "how do i configure",
            "first time setup",
            "getting started",
            "can't access web interface",
            "can't connect to apollo.local",
            "pool configuration",
            "how do i connect to pool",
            "setup guide",
        ],
        strong: &[
            "setup",
            "configure",
            "configuration",
            "web interface",
            "apollo.local",
            "pool settings",
            "pool url",
            "worker name",
            "first time",
            "brand new",
        ],
        weak: &["how do i", "how to", "instructions", "guide", "tutorial"],
    },
    IntentPhrases {
        intent: Intent::NotHashing,
        triggers: &[
            "0 h/s",
            "zero hashrate",
            "not hashing",
            "stopped mining",
            "stopped hashing",
            "no hashrate",
            "hashrate is zero",
            "no shares accepted",
            "shares not submitting",
            "worker not found",
            "not mining",
        ],
        strong: &[
            "mining stopped",
            "no shares",
            "shares rejected",
            "hashrate dropped",
            "hashrate zero",
            "can't mine",
            "won't mine",
        ],
        weak: &["hashrate", "mining", "shares", "h/s"],
    },
    IntentPhrases {
        intent: Intent::SyncDelay,
        triggers: &[
            "stuck syncing",
            "stuck at block",
            "sync stuck",
            "not syncing",
            "sync stopped",
            "syncing slowly",
            "sync taking forever",
            "blockchain won't sync",
            "node stuck",
        ],
        strong: &[
            "sync",
            "syncing",
            "synchronizing",
            "blockchain",
            "block height",
            "downloading blocks",
            "verification",
            "blocks behind",
        ],
        weak: &["block", "progress", "loading"],
    },
    IntentPhrases {
        intent: Intent::FirmwareIssue,
        triggers: &[
            "firmware update failed",
            "firmware won't update",
            "ui won't load",
            "web interface won't load",
            "can't access interface",
            "device bricked",
            "screen is black",
            "won't boot",
            "stuck on boot",
        ],
        strong: &[
            "update failed",
            "ui frozen",
            "interface frozen",
            "unresponsive",
            "bricked",
            "won't start",
            "won't boot",
        ],
        weak: &["update", "interface", "ui", "screen", "load"],
    },
    IntentPhrases {
        intent: Intent::PerformanceIssue,
        triggers: &[
            "keeps restarting",
            "keeps rebooting",
            "keeps crashing",
            "overheating",
            "too hot",
            "fans are loud",
            "fans running full speed",
            "unstable",
            "intermittent",
        ],
        strong: &[
            "restarting",
            "rebooting",
            "crashing",
            "hot",
            "temperature",
            "fan noise",
            "loud fan",
            "random restarts",
            "disconnecting",
        ],
        weak: &["restart", "crash", "fan", "noise", "temperature"],
    },
    IntentPhrases {
        intent: Intent::WarrantyRma,
        triggers: &[
            "want a refund",
            "request refund",
            "return policy",
            "warranty claim",
            "rma request",
            "defective unit",
            "doesn't work at all",
            "broken on arrival",
            "dead on arrival",
            "doa",
        ],
        strong: &[
            "refund",
            "return",
            "warranty",
            "rma",
            "defective",
            "broken",
            "exchange",
            "replacement",
        ],
        weak: &["policy", "covered", "guarantee"],
    },
    IntentPhrases {
        intent: Intent::GeneralQuestion,
        triggers: &[
            "what is",
            "how does",
            "can you explain",
            "what's the difference between",
            "how do i know if",
            "is it normal",
            "should i",
        ],
        strong: &[
            "question about",
            "wondering",
            "curious",
            "understand",
            "explain",
            "difference",
            "mean",
        ],
        weak: &["how", "why", "what", "when"],
    },
];

/// Physical or operational symptoms. Any hit sets `device_behavior_detected`.
pub const DEVICE_BEHAVIOR_PHRASES: &[&str] = &[
    "0 h/s",
    "not hashing",
    "won't load",
    "won't boot",
    "crashing",
    "not working",
    "stopped",
    "stuck",
];

/// Already-tried phrases per action kind.
pub const ATTEMPTED_ACTION_PATTERNS: &[(ActionKind, &[&str])] = &[
    (
        ActionKind::Restart,
        &[
            "already tried restarting",
            "already restarted",
            "tried restarting",
            "i restarted",
            "already tried: restart",
            "tried: restart",
        ],
    ),
    (
        ActionKind::FirmwareUpdate,
        &[
            "already updated firmware",
            "updated firmware",
            "tried updating",
            "firmware update",
            "updating firmware",
            "tried: updating firmware",
        ],
    ),
    (
        ActionKind::PoolChange,
        &[
            "changed pools",
            "tried different pool",
            "switched pools",
            "changing pools",
            "tried: changing pools",
        ],
    ),
    (
        ActionKind::CheckLogs,
        &[
            "checked logs",
            "looked at logs",
            "reviewed logs",
            "tried: checking logs",
        ],
    ),
];

pub const PANIC_PHRASES: &[&str] = &["urgent", "asap", "emergency", "immediately", "losing money"];
/// Three or more exclamation marks also read as panic.
pub const PANIC_EXCLAMATION_MIN: usize = 3;
pub const FRUSTRATION_PHRASES: &[&str] =
    &["still not working", "again", "multiple times", "frustrated"];
pub const CONFUSION_PHRASES: &[&str] = &["confused", "don't understand", "unclear", "not sure"];

/// `metadata.product` substrings to display names, checked in order.
pub const DEVICE_NAMES: &[(&[&str], &str)] = &[
    (&["solo node"], "Solo Node"),
    (&["apollo iii", "apollo3"], "Apollo III"),
    (&["apollo ii", "apollo2"], "Apollo II"),
];
pub const DEFAULT_DEVICE_NAME: &str = "Apollo";

/// Draft-quality cue phrases.
pub const GREETING_CUES: &[&str] = &["thanks", "hi", "thank you", "great"];
pub const CLOSING_CUES: &[&str] = &["agent will", "once i know"];
pub const EXPLANATORY_CONNECTIVES: &[&str] = &["to help", "so we can", "this will"];
pub const EMPATHY_PHRASES: &[&str] = &["understand", "see you've", "i can see"];
/// Words that hedge a number in the same sentence ("within 2 hours").
pub const NUMBER_QUALIFIERS: &[&str] = &[
    "within",
    "typical",
    "typically",
    "usually",
    "about",
    "approximately",
    "up to",
];

pub fn phrases_for(intent: Intent) -> Option<&'static IntentPhrases> {
    INTENT_PHRASES.iter().find(|table| table.intent == intent)
}
