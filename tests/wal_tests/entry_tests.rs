//! Tests for WAL record encoding and decoding
//!
//! These tests verify:
//! - Escaping of the four special bytes
//! - Decoding of well-formed and malformed lines
//! - Round trips for byte strings full of special bytes

use shardkv::wal::{encode_del, encode_put, escape, unescape, LogEntry};

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_put_line() {
    assert_eq!(encode_put(b"alpha", b"1"), b"P\talpha\t1\n".to_vec());
}

#[test]
fn test_encode_del_line() {
    assert_eq!(encode_del(b"beta"), b"D\tbeta\n".to_vec());
}

#[test]
fn test_encode_escapes_fields() {
    let line = encode_put(b"k\ty", b"line1\nline2\r\\");
    assert_eq!(line, b"P\tk\\ty\tline1\\nline2\\r\\\\\n".to_vec());
    // Only the record terminator is a raw newline
    assert_eq!(line.iter().filter(|&&b| b == b'\n').count(), 1);
    assert_eq!(line.iter().filter(|&&b| b == b'\t').count(), 2);
}

#[test]
fn test_entry_encode_matches_free_functions() {
    let put = LogEntry::Put {
        key: b"k".to_vec(),
        value: b"v".to_vec(),
    };
    let del = LogEntry::Del { key: b"k".to_vec() };
    assert_eq!(put.encode(), encode_put(b"k", b"v"));
    assert_eq!(del.encode(), encode_del(b"k"));
    assert_eq!(put.key(), b"k");
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_put() {
    assert_eq!(
        LogEntry::decode(b"P\tfoo\tbar"),
        Some(LogEntry::Put {
            key: b"foo".to_vec(),
            value: b"bar".to_vec(),
        })
    );
}

#[test]
fn test_decode_del() {
    assert_eq!(
        LogEntry::decode(b"D\tfoo"),
        Some(LogEntry::Del { key: b"foo".to_vec() })
    );
}

#[test]
fn test_decode_put_value_takes_rest_of_line() {
    assert_eq!(
        LogEntry::decode(b"P\tfoo\tbar\textra"),
        Some(LogEntry::Put {
            key: b"foo".to_vec(),
            value: b"bar\textra".to_vec(),
        })
    );
}

#[test]
fn test_decode_empty_value() {
    assert_eq!(
        LogEntry::decode(b"P\tfoo\t"),
        Some(LogEntry::Put {
            key: b"foo".to_vec(),
            value: Vec::new(),
        })
    );
}

#[test]
fn test_decode_rejects_invalid_escape() {
    assert_eq!(LogEntry::decode(b"P\tfoo\tbad\\x"), None);
    assert_eq!(LogEntry::decode(b"P\tfo\\qo\tbar"), None);
    assert_eq!(LogEntry::decode(b"D\tkey\\"), None);
}

#[test]
fn test_decode_rejects_unknown_tag() {
    assert_eq!(LogEntry::decode(b"X\tfoo\tbar"), None);
    assert_eq!(LogEntry::decode(b"PUT\tfoo\tbar"), None);
    assert_eq!(LogEntry::decode(b"\tfoo\tbar"), None);
}

#[test]
fn test_decode_rejects_missing_fields() {
    assert_eq!(LogEntry::decode(b""), None);
    assert_eq!(LogEntry::decode(b"P"), None);
    assert_eq!(LogEntry::decode(b"D"), None);
    assert_eq!(LogEntry::decode(b"P\tfoo"), None);
}

// =============================================================================
// Round-Trip Tests
// =============================================================================

#[test]
fn test_escape_round_trip_special_bytes() {
    let samples: Vec<Vec<u8>> = vec![
        Vec::new(),
        b"\\".to_vec(),
        b"\\n".to_vec(),
        b"\n\t\r\\".to_vec(),
        b"\\\\\\".to_vec(),
        b"trailing backslash\\".to_vec(),
        (0u8..=255).collect(),
    ];

    for sample in samples {
        assert_eq!(unescape(&escape(&sample)), Some(sample.clone()));
    }
}

#[test]
fn test_entry_round_trip_binary_fields() {
    let key: Vec<u8> = (0u8..=255).rev().collect();
    let value: Vec<u8> = b"\t\t\n\r\\x".iter().copied().cycle().take(100).collect();
    let entry = LogEntry::Put { key, value };

    let line = entry.encode();
    let decoded = LogEntry::decode(line.strip_suffix(b"\n").unwrap());

    assert_eq!(decoded, Some(entry));
}
