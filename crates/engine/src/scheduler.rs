// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission scheduler (spec.md §2: "Scheduler (admission)").
//!
//! Batch spawn paths and `cleanup` can produce more ready work than the
//! configured concurrency cap allows to run at once. The scheduler picks
//! which ready items get to run this tick: highest priority first,
//! round-robin within a priority band so one project can't starve the
//! others, and an aging boost so a request stuck behind higher-priority
//! traffic eventually gets admitted anyway.

use ao_core::Priority;
use std::collections::{BTreeMap, VecDeque};

/// Something waiting for a concurrency slot.
#[derive(Debug, Clone)]
pub struct Ticket<T> {
    pub item: T,
    pub priority: Priority,
    /// Number of ticks this ticket has been passed over. Used for aging.
    age: u32,
}

impl<T> Ticket<T> {
    pub fn new(item: T, priority: Priority) -> Self {
        Self { item, priority, age: 0 }
    }
}

/// Priority + fairness admission queue with a concurrency cap.
///
/// Items are grouped by priority band; within a band they're served
/// round-robin by `lane` (e.g. project id) so a single noisy lane can't
/// monopolize the cap. An item that ages past `max_age` is promoted to
/// the next priority band up, so it can't be starved forever by a steady
/// stream of higher-priority arrivals.
pub struct Scheduler<T> {
    cap: usize,
    max_age: u32,
    lanes: BTreeMap<Priority, BTreeMap<String, VecDeque<Ticket<T>>>>,
    order: BTreeMap<Priority, VecDeque<String>>,
    in_flight: usize,
}

impl<T> Scheduler<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            max_age: 3,
            lanes: BTreeMap::new(),
            order: BTreeMap::new(),
            in_flight: 0,
        }
    }

    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn has_slack(&self) -> bool {
        self.in_flight < self.cap
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.values().all(|lane| lane.values().all(VecDeque::is_empty))
    }

    /// Submit an item for admission under `lane` (typically a project id).
    pub fn submit(&mut self, lane: impl Into<String>, item: T, priority: Priority) {
        let lane = lane.into();
        let band = self.lanes.entry(priority).or_default();
        if !band.contains_key(&lane) {
            self.order.entry(priority).or_default().push_back(lane.clone());
        }
        band.entry(lane).or_default().push_back(Ticket::new(item, priority));
    }

    /// Mark a previously admitted item as finished, freeing its slot.
    pub fn complete(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Admit as many ready items as the remaining concurrency allows,
    /// highest priority band first, round-robin by lane within a band.
    /// Items that miss admission this tick age by one; any that cross
    /// `max_age` are promoted to the next band up before the next call.
    pub fn admit(&mut self) -> Vec<T> {
        let mut admitted = Vec::new();

        for priority in [Priority::Urgent, Priority::Action, Priority::Warning, Priority::Info] {
            while self.in_flight < self.cap {
                let Some(lane) = self.next_lane(priority) else { break };
                let Some(band) = self.lanes.get_mut(&priority) else { break };
                let Some(queue) = band.get_mut(&lane) else { break };
                let Some(ticket) = queue.pop_front() else { continue };
                self.in_flight += 1;
                admitted.push(ticket.item);
            }
        }

        self.age_remaining();
        self.promote_stale();
        admitted
    }

    fn next_lane(&mut self, priority: Priority) -> Option<String> {
        let order = self.order.get_mut(&priority)?;
        while let Some(lane) = order.pop_front() {
            let has_work = self
                .lanes
                .get(&priority)
                .and_then(|band| band.get(&lane))
                .map(|q| !q.is_empty())
                .unwrap_or(false);
            if has_work {
                order.push_back(lane.clone());
                return Some(lane);
            }
        }
        None
    }

    fn age_remaining(&mut self) {
        for band in self.lanes.values_mut() {
            for queue in band.values_mut() {
                for ticket in queue.iter_mut() {
                    ticket.age += 1;
                }
            }
        }
    }

    fn promote_stale(&mut self) {
        let bands = [Priority::Info, Priority::Warning, Priority::Action];
        for (from, to) in bands.iter().zip([Priority::Warning, Priority::Action, Priority::Urgent]) {
            let stale: Vec<(String, Ticket<T>)> = self
                .lanes
                .get_mut(from)
                .map(|band| {
                    let mut out = Vec::new();
                    for (lane, queue) in band.iter_mut() {
                        while queue.front().map(|t| t.age >= self.max_age).unwrap_or(false) {
                            if let Some(mut ticket) = queue.pop_front() {
                                ticket.age = 0;
                                ticket.priority = to;
                                out.push((lane.clone(), ticket));
                            }
                        }
                    }
                    out
                })
                .unwrap_or_default();

            for (lane, ticket) in stale {
                let band = self.lanes.entry(to).or_default();
                if !band.contains_key(&lane) {
                    self.order.entry(to).or_default().push_back(lane.clone());
                }
                band.entry(lane).or_default().push_back(ticket);
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
