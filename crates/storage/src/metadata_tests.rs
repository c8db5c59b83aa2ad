// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::DateTime;

fn store() -> (tempfile::TempDir, MetadataStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = MetadataStore::new(dir.path().join("sessions"));
    (dir, store)
}

fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn write_then_read_round_trips() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    let f = fields(&[("status", "spawning"), ("branch", "feat/INT-100")]);
    store.write(&id, &f).unwrap();
    let read_back = store.read(&id).unwrap().unwrap();
    assert_eq!(read_back, f);
}

#[test]
fn read_missing_session_returns_none() {
    let (_dir, store) = store();
    assert!(store.read(&SessionId::new("app-404")).unwrap().is_none());
}

#[test]
fn update_merges_and_deletes_on_empty_value() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    store.write(&id, &fields(&[("status", "spawning"), ("branch", "b")])).unwrap();
    let merged = store.update(&id, &fields(&[("status", "working"), ("branch", "")])).unwrap();
    assert_eq!(merged.get("status").map(String::as_str), Some("working"));
    assert!(!merged.contains_key("branch"));
}

#[test]
fn unknown_keys_round_trip_unchanged() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    store.write(&id, &fields(&[("plugin_private_xyz", "opaque-value")])).unwrap();
    let read_back = store.read(&id).unwrap().unwrap();
    assert_eq!(read_back.get("plugin_private_xyz").map(String::as_str), Some("opaque-value"));
}

#[test]
fn parse_kv_splits_on_first_equals_only() {
    let parsed = parse_kv("data={\"a\":\"b=c\"}\n");
    assert_eq!(parsed.get("data").map(String::as_str), Some("{\"a\":\"b=c\"}"));
}

#[test]
fn parse_kv_ignores_empty_lines() {
    let parsed = parse_kv("a=1\n\nb=2\n");
    assert_eq!(parsed.len(), 2);
}

#[test]
fn archive_moves_active_file_out() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    store.write(&id, &fields(&[("status", "killed")])).unwrap();
    store.archive(&id, DateTime::UNIX_EPOCH).unwrap();
    assert!(store.read(&id).unwrap().is_none());
}

#[test]
fn archive_filename_replaces_colons_with_dashes() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    store.write(&id, &fields(&[("status", "killed")])).unwrap();
    store.archive(&id, DateTime::UNIX_EPOCH).unwrap();
    let archived: Vec<_> = fs::read_dir(store.archive_dir())
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(archived.len(), 1);
    assert!(!archived[0].contains(':'));
    assert!(archived[0].starts_with("app-1_"));
}

#[test]
fn restore_from_archive_picks_lexicographically_greatest() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    fs::create_dir_all(store.archive_dir()).unwrap();
    fs::write(store.archive_dir().join("app-1_2024-01-01T00-00-00Z"), "status=old\n").unwrap();
    fs::write(store.archive_dir().join("app-1_2025-06-01T00-00-00Z"), "status=new\n").unwrap();
    let restored = store.restore_from_archive(&id).unwrap();
    assert_eq!(restored.get("status").map(String::as_str), Some("new"));
    // Confirm it's now readable as the active session too.
    assert_eq!(store.read(&id).unwrap().unwrap().get("status").map(String::as_str), Some("new"));
}

#[test]
fn restore_from_archive_errors_when_nothing_archived() {
    let (_dir, store) = store();
    let err = store.restore_from_archive(&SessionId::new("app-404"));
    assert!(matches!(err, Err(MetadataError::NoArchiveEntry(_))));
}

#[test]
fn list_excludes_archive_dir_and_tmp_files() {
    let (_dir, store) = store();
    store.write(&SessionId::new("app-1"), &fields(&[("status", "working")])).unwrap();
    store.write(&SessionId::new("app-2"), &fields(&[("status", "working")])).unwrap();
    fs::write(store.sessions_dir().join("app-3.tmp"), "status=working\n").unwrap();
    let mut ids: Vec<_> = store.list().unwrap().into_iter().map(|i| i.as_str().to_string()).collect();
    ids.sort();
    assert_eq!(ids, vec!["app-1", "app-2"]);
}

#[test]
fn metadata_round_trip_property_holds_for_arbitrary_ascii_values() {
    let (_dir, store) = store();
    let id = SessionId::new("app-1");
    let f = fields(&[("a", "1"), ("b", "hello world"), ("c", "with/slash")]);
    store.write(&id, &f).unwrap();
    assert_eq!(store.read(&id).unwrap().unwrap(), f);
}
