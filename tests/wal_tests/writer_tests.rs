//! Tests for appending to the WAL
//!
//! These tests verify:
//! - Records land on disk in append order
//! - Concurrent appends never interleave inside a line
//! - Reopening appends instead of truncating

use std::sync::Arc;
use std::thread;

use shardkv::config::WalSyncStrategy;
use shardkv::wal::{LogEntry, Wal};
use tempfile::TempDir;

fn setup_temp_wal() -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let wal_path = temp_dir.path().join("test.wal");
    (temp_dir, wal_path)
}

fn replay_all(wal: &Wal) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    wal.replay(|entry| entries.push(entry)).unwrap();
    entries
}

#[test]
fn test_open_creates_file() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();

    assert!(wal_path.exists());
    assert_eq!(wal.path(), wal_path.as_path());
    assert_eq!(std::fs::metadata(&wal_path).unwrap().len(), 0);
}

#[test]
fn test_open_fails_for_missing_directory() {
    let (temp, _) = setup_temp_wal();
    let bad_path = temp.path().join("no_such_dir").join("test.wal");
    assert!(Wal::open(bad_path).is_err());
}

#[test]
fn test_append_writes_lines_in_order() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open(&wal_path).unwrap();

    wal.append_put(b"a", b"1").unwrap();
    wal.append_del(b"a").unwrap();
    wal.append(&LogEntry::Put {
        key: b"b".to_vec(),
        value: b"2".to_vec(),
    })
    .unwrap();

    let content = std::fs::read(&wal_path).unwrap();
    assert_eq!(content, b"P\ta\t1\nD\ta\nP\tb\t2\n".to_vec());
    assert_eq!(wal.records_written(), 3);
}

#[test]
fn test_fsync_strategy_writes_same_format() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Wal::open_with(&wal_path, WalSyncStrategy::Fsync).unwrap();

    wal.append_put(b"k", b"v").unwrap();
    wal.sync().unwrap();

    assert_eq!(std::fs::read(&wal_path).unwrap(), b"P\tk\tv\n".to_vec());
}

#[test]
fn test_reopen_appends() {
    let (_temp, wal_path) = setup_temp_wal();

    {
        let wal = Wal::open(&wal_path).unwrap();
        wal.append_put(b"first", b"1").unwrap();
    }
    {
        let wal = Wal::open(&wal_path).unwrap();
        wal.append_put(b"second", b"2").unwrap();
    }

    let wal = Wal::open(&wal_path).unwrap();
    let entries = replay_all(&wal);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].key(), b"first");
    assert_eq!(entries[1].key(), b"second");
}

#[test]
fn test_reopen_discards_torn_tail_before_appending() {
    let (_temp, wal_path) = setup_temp_wal();
    std::fs::write(&wal_path, b"P\tkept\t1\nP\ttorn\tpart").unwrap();

    let wal = Wal::open(&wal_path).unwrap();
    wal.append_put(b"next", b"2").unwrap();

    let entries = replay_all(&wal);
    assert_eq!(
        entries,
        vec![
            LogEntry::Put {
                key: b"kept".to_vec(),
                value: b"1".to_vec(),
            },
            LogEntry::Put {
                key: b"next".to_vec(),
                value: b"2".to_vec(),
            },
        ]
    );
}

#[test]
fn test_concurrent_appends_keep_whole_lines() {
    let (_temp, wal_path) = setup_temp_wal();
    let wal = Arc::new(Wal::open(&wal_path).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let wal = Arc::clone(&wal);
            thread::spawn(move || {
                for i in 0..200 {
                    let key = format!("t{}-k{}", t, i);
                    let value = format!("value\twith\nspecials-{}", i);
                    wal.append_put(key.as_bytes(), value.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut stats_entries = Vec::new();
    let stats = wal.replay(|entry| stats_entries.push(entry)).unwrap();
    assert_eq!(stats.applied, 1600);
    assert!(stats.is_clean());

    // Per-writer order is preserved in the global order
    for t in 0..8 {
        let prefix = format!("t{}-", t);
        let keys: Vec<_> = stats_entries
            .iter()
            .filter(|e| e.key().starts_with(prefix.as_bytes()))
            .map(|e| e.key().to_vec())
            .collect();
        let expected: Vec<_> = (0..200)
            .map(|i| format!("t{}-k{}", t, i).into_bytes())
            .collect();
        assert_eq!(keys, expected);
    }
}
