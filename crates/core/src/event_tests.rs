// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    stuck = { EventType::SessionStuck, Priority::Urgent },
    needs_input = { EventType::SessionNeedsInput, Priority::Urgent },
    errored = { EventType::SessionErrored, Priority::Urgent },
    escalated = { EventType::ReactionEscalated, Priority::Urgent },
    approved = { EventType::ReviewApproved, Priority::Action },
    merged = { EventType::MergeCompleted, Priority::Action },
    ci_failing = { EventType::CiFailing, Priority::Warning },
    changes_requested = { EventType::ReviewChangesRequested, Priority::Warning },
    summary = { EventType::SummaryAllComplete, Priority::Info },
)]
fn priority_matches_spec_inference(event: EventType, expected: Priority) {
    assert_eq!(event.priority(), expected);
}

#[test]
fn dotted_strings_match_spec_glossary() {
    assert_eq!(EventType::CiFailing.as_str(), "ci.failing");
    assert_eq!(EventType::MergeCompleted.as_str(), "merge.completed");
    assert_eq!(EventType::SummaryAllComplete.as_str(), "summary.all_complete");
}

#[test]
fn for_target_status_maps_known_transitions() {
    assert_eq!(
        EventType::for_target_status(crate::SessionStatus::CiFailed),
        Some(EventType::CiFailing)
    );
    assert_eq!(
        EventType::for_target_status(crate::SessionStatus::Merged),
        Some(EventType::MergeCompleted)
    );
}

#[test]
fn for_target_status_none_for_untracked_statuses() {
    assert_eq!(EventType::for_target_status(crate::SessionStatus::Spawning), None);
    assert_eq!(EventType::for_target_status(crate::SessionStatus::Done), None);
}
