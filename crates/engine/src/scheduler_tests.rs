// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::Priority;

#[test]
fn admits_up_to_the_concurrency_cap() {
    let mut s = Scheduler::new(2);
    s.submit("a", "one", Priority::Info);
    s.submit("a", "two", Priority::Info);
    s.submit("a", "three", Priority::Info);

    let admitted = s.admit();
    assert_eq!(admitted.len(), 2);
    assert_eq!(s.in_flight(), 2);
    assert!(!s.has_slack());
}

#[test]
fn higher_priority_bands_are_admitted_first() {
    let mut s = Scheduler::new(1);
    s.submit("a", "low", Priority::Info);
    s.submit("a", "urgent", Priority::Urgent);

    let admitted = s.admit();
    assert_eq!(admitted, vec!["urgent"]);
}

#[test]
fn lanes_are_served_round_robin_within_a_band() {
    let mut s = Scheduler::new(1);
    s.submit("project-a", "a1", Priority::Action);
    s.submit("project-a", "a2", Priority::Action);
    s.submit("project-b", "b1", Priority::Action);

    let first = s.admit();
    assert_eq!(first, vec!["a1"]);
    s.complete();

    let second = s.admit();
    assert_eq!(second, vec!["b1"]);
    s.complete();

    let third = s.admit();
    assert_eq!(third, vec!["a2"]);
}

#[test]
fn completing_frees_a_slot_for_the_next_admit() {
    let mut s = Scheduler::new(1);
    s.submit("a", "one", Priority::Info);
    s.submit("a", "two", Priority::Info);

    assert_eq!(s.admit(), vec!["one"]);
    assert!(s.admit().is_empty(), "no slack until completion");

    s.complete();
    assert_eq!(s.admit(), vec!["two"]);
}

#[test]
fn stale_low_priority_tickets_are_promoted_so_they_are_not_starved() {
    let mut s = Scheduler::<&str>::new(1).with_max_age(2);
    s.submit("a", "low", Priority::Info);

    // Every tick a fresh urgent item arrives and wins the single slot,
    // so "low" ages instead of being admitted.
    for _ in 0..3 {
        s.submit("a", "urgent-filler", Priority::Urgent);
        let admitted = s.admit();
        assert_eq!(admitted, vec!["urgent-filler"]);
        s.complete();
    }

    // After ageing past max_age it should have been promoted a band (or
    // more), so it now competes for the slot instead of losing forever.
    let admitted = s.admit();
    assert_eq!(admitted, vec!["low"]);
}

#[test]
fn is_empty_reflects_queue_state() {
    let mut s = Scheduler::new(4);
    assert!(s.is_empty());
    s.submit("a", "x", Priority::Warning);
    assert!(!s.is_empty());
    s.admit();
    assert!(s.is_empty());
}
