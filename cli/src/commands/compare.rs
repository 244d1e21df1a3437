use clap::Args;
use triage_core::edit_tracking::DraftEditTracker;

use crate::util::{emit, exit_error, read_text};

#[derive(Args, Clone, Debug)]
pub struct CompareArgs {
    /// File holding the generated draft
    #[arg(long)]
    pub draft: String,

    /// File holding the text the agent sent ("-" for stdin)
    #[arg(long = "final")]
    pub final_text: String,

    /// Print compact JSON
    #[arg(long)]
    pub raw: bool,
}

/// Print edit metrics between a generated draft and the sent reply.
pub fn run(args: CompareArgs) -> i32 {
    let draft = read_text(&args.draft).unwrap_or_else(|e| exit_error(&e, None));
    let final_text = read_text(&args.final_text).unwrap_or_else(|e| exit_error(&e, None));

    let mut tracker = DraftEditTracker::new();
    tracker.record(draft.trim_end());
    let Some(metrics) = tracker.measure(final_text.trim_end()) else {
        exit_error("No draft recorded", None);
    };

    match serde_json::to_value(&metrics) {
        Ok(value) => {
            emit(&value, args.raw, true);
            0
        }
        Err(e) => exit_error(&format!("Failed to serialize metrics: {e}"), None),
    }
}
