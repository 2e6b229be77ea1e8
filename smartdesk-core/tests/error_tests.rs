// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use smartdesk_core::SmartdeskError;
use std::error::Error;
use std::io;

#[test]
fn test_io_error_is_recoverable_and_keeps_source() {
    let err = SmartdeskError::io_error(
        "connect 192.168.4.7:3333",
        io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
    );

    assert!(err.is_recoverable());
    assert!(!err.is_cancelled());
    assert!(err.source().is_some());
    assert_eq!(err.to_string(), "I/O error: connect 192.168.4.7:3333: refused");
}

#[test]
fn test_cancelled_is_terminal() {
    let err = SmartdeskError::Cancelled;
    assert!(err.is_cancelled());
    assert!(!err.is_recoverable());
}

#[test]
fn test_json_error_converts_to_decode() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: SmartdeskError = json_err.into();

    assert!(matches!(err, SmartdeskError::Decode { .. }));
    assert!(!err.is_recoverable());
}
