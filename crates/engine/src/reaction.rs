// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reaction message builder (spec.md §4.4) and the event-type -> reaction-key
//! mapping (spec.md §4.3.3).

use ao_core::EventType;

const MAX_FAILING_CHECKS: usize = 5;
const MAX_UNRESOLVED_COMMENTS: usize = 3;
const MAX_OUTPUT_CHARS: usize = 800;

/// Each event type maps to at most one reaction key; `ReactionTriggered` and
/// `ReactionEscalated` are meta-events about reactions themselves and are
/// never reaction keys.
pub fn reaction_key_for(event_type: EventType) -> Option<&'static str> {
    use EventType::*;
    Some(match event_type {
        SessionWorking => "working",
        VerifierPending => "verifier-pending",
        VerifierFailed => "verifier-failed",
        VerifierPassed => "pr-ready",
        ReviewerPending => "reviewer-pending",
        ReviewerFailed => "reviewer-failed",
        ReviewerPassed => "reviewer-passed",
        PrCreated => "pr-created",
        CiFailing => "ci-failed",
        ReviewPending => "review-pending",
        ReviewChangesRequested => "changes-requested",
        ReviewApproved => "approved",
        MergeReady => "mergeable",
        MergeCompleted => "merged",
        SessionNeedsInput => "needs-input",
        SessionStuck => "stuck",
        SessionErrored => "errored",
        SessionKilled => "killed",
        AutomatedReviewFound => "automated-review-found",
        SummaryAllComplete => "summary-all-complete",
        ReactionTriggered | ReactionEscalated => return None,
    })
}

/// Inputs the message builder draws from; any source may be empty or
/// missing (spec.md §4.4 "missing sources are silently omitted").
#[derive(Debug, Clone, Default)]
pub struct ReactionContext {
    pub failing_checks: Vec<String>,
    pub unresolved_comments: Vec<String>,
    pub recent_output: Option<String>,
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{truncated}\n...[truncated]")
    }
}

/// Compose a concise, human-readable message for a `send-to-agent` reaction.
pub fn build_message(reaction_key: &str, ctx: &ReactionContext) -> String {
    let mut out = format!("Reaction: {reaction_key}\n");

    if !ctx.failing_checks.is_empty() {
        out.push_str("Failing checks:\n");
        for check in ctx.failing_checks.iter().take(MAX_FAILING_CHECKS) {
            out.push_str("  - ");
            out.push_str(check);
            out.push('\n');
        }
        if ctx.failing_checks.len() > MAX_FAILING_CHECKS {
            out.push_str(&format!("  ...and {} more\n", ctx.failing_checks.len() - MAX_FAILING_CHECKS));
        }
    }

    if !ctx.unresolved_comments.is_empty() {
        out.push_str("Unresolved review comments:\n");
        for comment in ctx.unresolved_comments.iter().take(MAX_UNRESOLVED_COMMENTS) {
            out.push_str("  - ");
            out.push_str(&truncate_chars(comment, 200));
            out.push('\n');
        }
        if ctx.unresolved_comments.len() > MAX_UNRESOLVED_COMMENTS {
            out.push_str(&format!(
                "  ...and {} more\n",
                ctx.unresolved_comments.len() - MAX_UNRESOLVED_COMMENTS
            ));
        }
    }

    if let Some(output) = &ctx.recent_output {
        if !output.is_empty() {
            out.push_str("Recent terminal output:\n");
            out.push_str(&truncate_chars(output, MAX_OUTPUT_CHARS));
            out.push('\n');
        }
    }

    out.push_str("Recommended order: address failing checks first, then unresolved review comments.\n");
    out
}

#[cfg(test)]
#[path = "reaction_tests.rs"]
mod tests;
