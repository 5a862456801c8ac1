//! Codec Tests
//!
//! Tests for request parsing and response formatting.

use std::io::Cursor;

use bytes::Bytes;
use shardkv::protocol::{
    decode_response, encode_command, encode_response, parse_command, read_line, write_response,
    Command, CommandType, Response, MAX_LINE_LEN,
};
use shardkv::KvError;

fn protocol_error(line: &[u8]) -> String {
    match parse_command(line) {
        Err(KvError::Protocol(message)) => message,
        other => panic!("expected protocol error, got {:?}", other),
    }
}

// =============================================================================
// Command Parsing Tests
// =============================================================================

#[test]
fn test_parse_get() {
    let cmd = parse_command(b"GET k1\n").unwrap().unwrap();
    assert_eq!(cmd, Command::Get { key: b"k1".to_vec() });
    assert_eq!(cmd.command_type(), CommandType::Get);
}

#[test]
fn test_parse_put_value_is_rest_of_line() {
    let cmd = parse_command(b"PUT k1 hello world\n").unwrap().unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"k1".to_vec(),
            value: b"hello world".to_vec(),
        }
    );
}

#[test]
fn test_parse_put_trims_value() {
    let cmd = parse_command(b"  PUT   k1    spaced   out  \r\n").unwrap().unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"k1".to_vec(),
            value: b"spaced   out".to_vec(),
        }
    );
}

#[test]
fn test_parse_treats_vertical_tab_as_whitespace() {
    let cmd = parse_command(b"GET\x0Bk1\x0B").unwrap().unwrap();
    assert_eq!(cmd, Command::Get { key: b"k1".to_vec() });

    let cmd = parse_command(b"\x0BPUT k1 \x0Bv a l\x0B\x0C").unwrap().unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"k1".to_vec(),
            value: b"v a l".to_vec(),
        }
    );

    assert!(parse_command(b"\x0B\x0B").unwrap().is_none());
}

#[test]
fn test_parse_put_without_value() {
    let cmd = parse_command(b"PUT k1").unwrap().unwrap();
    assert_eq!(
        cmd,
        Command::Put {
            key: b"k1".to_vec(),
            value: Vec::new(),
        }
    );
}

#[test]
fn test_parse_del_ignores_extra_tokens() {
    let cmd = parse_command(b"DEL k1 extra").unwrap().unwrap();
    assert_eq!(cmd, Command::Delete { key: b"k1".to_vec() });
}

#[test]
fn test_parse_blank_line() {
    assert!(parse_command(b"").unwrap().is_none());
    assert!(parse_command(b"   \r\n").unwrap().is_none());
}

#[test]
fn test_parse_missing_key() {
    assert_eq!(protocol_error(b"GET"), "missing key");
    assert_eq!(protocol_error(b"PUT   "), "missing key");
    assert_eq!(protocol_error(b"DEL\n"), "missing key");
}

#[test]
fn test_parse_unknown_command() {
    assert_eq!(protocol_error(b"SET k v"), "unknown command");
    assert_eq!(protocol_error(b"get k"), "unknown command");
}

#[test]
fn test_encode_command() {
    assert_eq!(
        encode_command(&Command::Put {
            key: b"k".to_vec(),
            value: b"a b".to_vec(),
        }),
        b"PUT k a b\n".to_vec()
    );
    assert_eq!(
        encode_command(&Command::Delete { key: b"k".to_vec() }),
        b"DEL k\n".to_vec()
    );
    let get = Command::Get { key: b"k".to_vec() };
    assert_eq!(parse_command(&encode_command(&get)).unwrap(), Some(get));
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_encode_responses() {
    assert_eq!(
        encode_response(&Response::Value(Bytes::from_static(b"hello world"))),
        b"VALUE hello world\n".to_vec()
    );
    assert_eq!(encode_response(&Response::Ok), b"OK\n".to_vec());
    assert_eq!(encode_response(&Response::NotFound), b"NOT_FOUND\n".to_vec());
    assert_eq!(
        encode_response(&Response::error("missing key")),
        b"ERROR missing key\n".to_vec()
    );
}

#[test]
fn test_decode_responses() {
    assert_eq!(
        decode_response(b"VALUE hello world\n").unwrap(),
        Response::Value(Bytes::from_static(b"hello world"))
    );
    assert_eq!(decode_response(b"OK").unwrap(), Response::Ok);
    assert_eq!(decode_response(b"NOT_FOUND\n").unwrap(), Response::NotFound);
    assert_eq!(
        decode_response(b"ERROR unknown command\n").unwrap(),
        Response::error("unknown command")
    );
    assert!(decode_response(b"WHAT").is_err());
}

#[test]
fn test_write_response() {
    let mut out = Vec::new();
    write_response(&mut out, &Response::NotFound).unwrap();
    write_response(&mut out, &Response::Ok).unwrap();
    assert_eq!(out, b"NOT_FOUND\nOK\n".to_vec());
}

// =============================================================================
// Stream Reading Tests
// =============================================================================

#[test]
fn test_read_line_sequence() {
    let mut reader = Cursor::new(b"GET a\nPUT b c\npartial".to_vec());
    let mut line = Vec::new();

    assert!(read_line(&mut reader, &mut line).unwrap());
    assert_eq!(line, b"GET a");
    assert!(read_line(&mut reader, &mut line).unwrap());
    assert_eq!(line, b"PUT b c");
    // Unterminated fragment at EOF is dropped
    assert!(!read_line(&mut reader, &mut line).unwrap());
    assert!(!read_line(&mut reader, &mut line).unwrap());
}

#[test]
fn test_read_line_too_long() {
    let mut data = vec![b'x'; MAX_LINE_LEN + 10];
    data.push(b'\n');
    let mut reader = Cursor::new(data);
    let mut line = Vec::new();

    assert!(matches!(
        read_line(&mut reader, &mut line),
        Err(KvError::Protocol(ref m)) if m == "line too long"
    ));
}
