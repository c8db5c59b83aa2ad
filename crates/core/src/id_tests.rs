// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

define_id! {
    pub struct TestId;
}

#[test]
fn round_trips_through_string() {
    let id = TestId::new("app-1");
    assert_eq!(id.as_str(), "app-1");
    assert_eq!(id.to_string(), "app-1");
    assert_eq!(id, "app-1");
}

#[test]
fn short_truncates_but_not_past_len() {
    let id = TestId::new("abcdef");
    assert_eq!(id.short(3), "abc");
    assert_eq!(id.short(100), "abcdef");
}

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("verifier");
    assert_eq!(gen.next(), "verifier-1");
    assert_eq!(gen.next(), "verifier-2");
}

#[yare::parameterized(
    empty       = { vec![], 1 },
    no_gaps     = { vec![1, 2, 3], 4 },
    one_gap     = { vec![1, 3, 4], 2 },
    unsorted    = { vec![3, 1, 4], 2 },
    duplicates  = { vec![1, 1, 2], 3 },
    starts_at_2 = { vec![2, 3], 1 },
)]
fn smallest_unused_fills_gaps(used: Vec<u64>, expected: u64) {
    assert_eq!(smallest_unused("app", used), expected);
}
