// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ao_core::{EventType, SessionId};

#[tokio::test]
async fn notify_records_events() {
    let notifier = FakeNotifierPlugin::new("fake");
    let event = Event::new(EventType::SessionStuck, SessionId::new("sess-1"));
    notifier.notify(&event).await.unwrap();
    assert_eq!(notifier.sent_count(), 1);
    assert_eq!(notifier.sent()[0].event_type, EventType::SessionStuck);
}

#[tokio::test]
async fn notify_can_be_scripted_to_fail() {
    let notifier = FakeNotifierPlugin::new("fake");
    notifier.set_fails(true);
    let event = Event::new(EventType::SessionStuck, SessionId::new("sess-1"));
    let err = notifier.notify(&event).await.unwrap_err();
    assert!(matches!(err, NotifierError::Failed(_)));
    assert_eq!(notifier.sent_count(), 0);
}
