//! Tests for the Engine
//!
//! These tests verify:
//! - Basic set/get/del/exists semantics
//! - Write-ahead ordering (records durable before visible)
//! - TTL behavior driven by an injected clock, including lazy expiry
//!   materialization and its synthetic DEL record
//! - Replay: close/reopen reproduces observable state without re-logging
//! - Range scans with expiry filtering

use std::fs;
use std::path::{Path, PathBuf};

use loamdb::clock::{Clock, ManualClock};
use loamdb::{Config, Engine, LoamError};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_engine() -> (TempDir, PathBuf, Engine, ManualClock) {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");
    let (engine, clock) = open_at(&log_path, 1_000_000);
    (temp_dir, log_path, engine, clock)
}

fn open_at(log_path: &Path, now_ms: i64) -> (Engine, ManualClock) {
    let (clock, handle) = Clock::manual(now_ms);
    let config = Config::builder().log_path(log_path).clock(clock).build();
    (Engine::open(config).unwrap(), handle)
}

fn log_lines(log_path: &Path) -> Vec<String> {
    fs::read_to_string(log_path)
        .unwrap()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_set_get() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine.set("hello", "world").unwrap();
    assert_eq!(engine.get("hello").unwrap(), Some("world".to_string()));
}

#[test]
fn test_get_nonexistent_key() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();
    assert_eq!(engine.get("nonexistent").unwrap(), None);
}

#[test]
fn test_set_overwrites() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine.set("k", "v1").unwrap();
    engine.set("k", "v2").unwrap();
    assert_eq!(engine.get("k").unwrap(), Some("v2".to_string()));
    assert_eq!(engine.key_count(), 1);
}

#[test]
fn test_del_semantics() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine.set("a", "1").unwrap();
    assert!(engine.del("a").unwrap());
    assert_eq!(engine.get("a").unwrap(), None);
    // DEL on an absent key reports 0 and changes nothing.
    assert!(!engine.del("a").unwrap());
}

#[test]
fn test_exists() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    assert!(!engine.exists("k").unwrap());
    engine.set("k", "v").unwrap();
    assert!(engine.exists("k").unwrap());
    engine.del("k").unwrap();
    assert!(!engine.exists("k").unwrap());
}

#[test]
fn test_mset_mget_order_preserved() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine
        .mset(&[
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ])
        .unwrap();

    let values = engine
        .mget(&["b".to_string(), "missing".to_string(), "a".to_string()])
        .unwrap();
    assert_eq!(
        values,
        vec![Some("2".to_string()), None, Some("1".to_string())]
    );
}

#[test]
fn test_mset_appends_one_batch() {
    let (_temp, path, mut engine, _clock) = setup_temp_engine();

    engine
        .mset(&[
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
        ])
        .unwrap();

    assert_eq!(log_lines(&path), vec!["SET a 1", "SET b 2", "SET c 3"]);
}

// =============================================================================
// Write-Ahead Discipline Tests
// =============================================================================

#[test]
fn test_every_mutation_is_logged_before_visible() {
    let (_temp, path, mut engine, _clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    assert_eq!(log_lines(&path), vec!["SET k v"]);

    engine.expire("k", 5_000).unwrap();
    assert_eq!(log_lines(&path).len(), 2);
    assert!(log_lines(&path)[1].starts_with("EXPIREAT k "));

    engine.persist("k").unwrap();
    assert_eq!(log_lines(&path)[2], "PERSIST k");

    engine.del("k").unwrap();
    assert_eq!(log_lines(&path)[3], "DEL k");
}

#[test]
fn test_noop_operations_do_not_log() {
    let (_temp, path, mut engine, _clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    let before = log_lines(&path);

    assert!(!engine.del("missing").unwrap());
    assert!(!engine.expire("missing", 100).unwrap());
    // PERSIST with no TTL set: response 0, nothing appended.
    assert!(!engine.persist("k").unwrap());
    assert_eq!(engine.ttl("k").unwrap(), -1);

    assert_eq!(log_lines(&path), before);
}

// =============================================================================
// TTL Tests
// =============================================================================

#[test]
fn test_ttl_reporting() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    assert_eq!(engine.ttl("k").unwrap(), -1);
    assert_eq!(engine.ttl("missing").unwrap(), -2);

    assert!(engine.expire("k", 5_000).unwrap());
    assert_eq!(engine.ttl("k").unwrap(), 5_000);

    clock.advance(2_000);
    assert_eq!(engine.ttl("k").unwrap(), 3_000);

    clock.advance(3_000);
    // Deadline reached: the key is logically absent.
    assert_eq!(engine.ttl("k").unwrap(), -2);
    assert_eq!(engine.get("k").unwrap(), None);
}

#[test]
fn test_expire_zero_expires_immediately() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine.set("t", "42").unwrap();
    assert!(engine.expire("t", 0).unwrap());
    assert_eq!(engine.get("t").unwrap(), None);
    assert_eq!(engine.ttl("t").unwrap(), -2);
}

#[test]
fn test_expire_refreshes_deadline() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    engine.expire("k", 1_000).unwrap();
    clock.advance(900);
    engine.expire("k", 1_000).unwrap();
    clock.advance(900);
    // Still alive: the second EXPIRE replaced the first deadline.
    assert_eq!(engine.get("k").unwrap(), Some("v".to_string()));
    assert_eq!(engine.ttl("k").unwrap(), 100);
}

#[test]
fn test_expire_on_missing_or_expired_key() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    assert!(!engine.expire("missing", 1_000).unwrap());

    engine.set("k", "v").unwrap();
    engine.expire("k", 100).unwrap();
    clock.advance(200);
    // Expired key counts as missing.
    assert!(!engine.expire("k", 1_000).unwrap());
}

#[test]
fn test_set_clears_ttl() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v1").unwrap();
    engine.expire("k", 1_000).unwrap();

    // A fresh SET is a new binding; the old deadline must not apply.
    engine.set("k", "v2").unwrap();
    assert_eq!(engine.ttl("k").unwrap(), -1);

    clock.advance(5_000);
    assert_eq!(engine.get("k").unwrap(), Some("v2".to_string()));
}

#[test]
fn test_del_clears_ttl() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    engine.expire("k", 1_000).unwrap();
    engine.del("k").unwrap();

    engine.set("k", "again").unwrap();
    clock.advance(5_000);
    assert_eq!(engine.get("k").unwrap(), Some("again".to_string()));
}

#[test]
fn test_persist_clears_ttl() {
    let (_temp, _path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    engine.expire("k", 1_000).unwrap();
    assert!(engine.persist("k").unwrap());
    assert_eq!(engine.ttl("k").unwrap(), -1);

    clock.advance(5_000);
    assert_eq!(engine.get("k").unwrap(), Some("v".to_string()));

    // Idempotence: a second PERSIST has nothing to clear.
    assert!(!engine.persist("k").unwrap());
}

#[test]
fn test_expiry_materializes_exactly_one_del() {
    let (_temp, path, mut engine, clock) = setup_temp_engine();

    engine.set("k", "v").unwrap();
    engine.expire("k", 100).unwrap();
    clock.advance(200);

    assert_eq!(engine.get("k").unwrap(), None);
    let del_count = |lines: &[String]| lines.iter().filter(|l| *l == "DEL k").count();
    assert_eq!(del_count(&log_lines(&path)), 1);

    // Further accesses find the key gone and append nothing.
    assert_eq!(engine.get("k").unwrap(), None);
    assert_eq!(engine.ttl("k").unwrap(), -2);
    assert_eq!(del_count(&log_lines(&path)), 1);
}

// =============================================================================
// Recovery / Replay Tests
// =============================================================================

#[test]
fn test_replay_reproduces_state() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");

    {
        let (mut engine, _clock) = open_at(&log_path, 1_000_000);
        engine.set("a", "1").unwrap();
        engine.set("b", "2").unwrap();
        engine.set("c", "3").unwrap();
        engine.del("b").unwrap();
        engine.expire("c", 60_000).unwrap();
        // Crash: drop without any shutdown step.
    }

    let (mut engine, _clock) = open_at(&log_path, 1_010_000);
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(engine.get("b").unwrap(), None);
    assert_eq!(engine.get("c").unwrap(), Some("3".to_string()));
    // 10s of the 60s TTL elapsed across the restart.
    assert_eq!(engine.ttl("c").unwrap(), 50_000);
}

#[test]
fn test_replay_does_not_relog() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");

    {
        let (mut engine, _clock) = open_at(&log_path, 1_000_000);
        engine.set("a", "1").unwrap();
        engine.expire("a", 60_000).unwrap();
    }
    let before = fs::read(&log_path).unwrap();

    let (mut engine, _clock) = open_at(&log_path, 1_000_000);
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(fs::read(&log_path).unwrap(), before);
}

#[test]
fn test_replay_set_clears_prior_ttl() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");
    fs::write(&log_path, "SET k v1\nEXPIREAT k 1500000\nSET k v2\n").unwrap();

    let (mut engine, _clock) = open_at(&log_path, 2_000_000);
    // The later SET voided the deadline, so the key survives past it.
    assert_eq!(engine.get("k").unwrap(), Some("v2".to_string()));
    assert_eq!(engine.ttl("k").unwrap(), -1);
}

#[test]
fn test_replay_ignores_stale_expireat() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");
    fs::write(
        &log_path,
        "EXPIREAT ghost 9999999\nSET k v\nDEL k\nEXPIREAT k 9999999\n",
    )
    .unwrap();

    let (mut engine, _clock) = open_at(&log_path, 1_000_000);
    assert_eq!(engine.get("ghost").unwrap(), None);
    assert_eq!(engine.get("k").unwrap(), None);
    assert_eq!(engine.key_count(), 0);
}

#[test]
fn test_replay_expired_key_materializes_on_first_access() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");

    {
        let (mut engine, _clock) = open_at(&log_path, 1_000_000);
        engine.set("k", "v").unwrap();
        engine.expire("k", 1_000).unwrap();
    }

    // Reopen well past the deadline: replay leaves the entry, access reaps it.
    let (mut engine, _clock) = open_at(&log_path, 2_000_000);
    assert_eq!(engine.get("k").unwrap(), None);
    let lines = log_lines(&log_path);
    assert_eq!(lines.last().map(|s| s.as_str()), Some("DEL k"));
}

#[test]
fn test_open_fails_on_midfile_corruption() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");
    fs::write(&log_path, "SET a\nSET b 2\n").unwrap();

    let (clock, _handle) = Clock::manual(0);
    let config = Config::builder().log_path(&log_path).clock(clock).build();
    let err = Engine::open(config).unwrap_err();
    assert!(matches!(err, LoamError::Corruption { .. }));
}

#[test]
fn test_open_recovers_torn_tail_then_serves() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("data.db");
    fs::write(&log_path, "SET a 1\nSET b 2\nSET c ").unwrap();

    let (mut engine, _clock) = open_at(&log_path, 1_000_000);
    assert_eq!(engine.get("a").unwrap(), Some("1".to_string()));
    assert_eq!(engine.get("b").unwrap(), Some("2".to_string()));
    assert_eq!(engine.get("c").unwrap(), None);

    // New writes land cleanly after the truncated tail.
    engine.set("c", "3").unwrap();
    assert_eq!(log_lines(&log_path), vec!["SET a 1", "SET b 2", "SET c 3"]);
}

// =============================================================================
// Range Tests
// =============================================================================

#[test]
fn test_range_inclusive_bounds() {
    let (_temp, _path, mut engine, _clock) = setup_temp_engine();

    engine
        .mset(&[
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
            ("c".to_string(), "3".to_string()),
            ("d".to_string(), "4".to_string()),
            ("e".to_string(), "5".to_string()),
        ])
        .unwrap();

    assert_eq!(
        engine.range(Some("b"), Some("d")).unwrap(),
        vec!["b", "c", "d"]
    );
    assert_eq!(engine.range(None, Some("b")).unwrap(), vec!["a", "b"]);
    assert_eq!(engine.range(Some("d"), None).unwrap(), vec!["d", "e"]);
    assert_eq!(
        engine.range(None, None).unwrap(),
        vec!["a", "b", "c", "d", "e"]
    );
}

#[test]
fn test_range_skips_and_reaps_expired_keys() {
    let (_temp, path, mut engine, clock) = setup_temp_engine();

    engine.set("a", "1").unwrap();
    engine.set("b", "2").unwrap();
    engine.set("c", "3").unwrap();
    engine.expire("b", 100).unwrap();
    clock.advance(200);

    assert_eq!(engine.range(None, None).unwrap(), vec!["a", "c"]);
    // The scan materialized b's expiry durably.
    assert!(log_lines(&path).contains(&"DEL b".to_string()));
}
