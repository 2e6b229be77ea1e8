// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use futures::StreamExt;
use smartdesk_core::{SmartdeskError, StateSubject, SubjectError};

#[tokio::test]
async fn test_broadcasts_to_multiple_subscribers() {
    let subject = StateSubject::<i32>::new();
    let mut a = subject.subscribe().unwrap();
    let mut b = subject.subscribe().unwrap();

    subject.next(1).unwrap();

    assert_eq!(a.next().await, Some(1));
    assert_eq!(b.next().await, Some(1));
}

#[tokio::test]
async fn test_late_subscriber_only_sees_new_values() {
    let subject = StateSubject::<i32>::new();
    let mut early = subject.subscribe().unwrap();
    subject.next(1).unwrap();

    let mut late = subject.subscribe().unwrap();
    subject.next(2).unwrap();
    subject.close();

    assert_eq!(early.next().await, Some(1));
    assert_eq!(early.next().await, Some(2));
    assert_eq!(late.next().await, Some(2));
    assert_eq!(late.next().await, None);
}

#[tokio::test]
async fn test_every_value_is_delivered_in_order() {
    let subject = StateSubject::<u32>::new();
    let stream = subject.subscribe().unwrap();

    for value in 0..100 {
        subject.next(value).unwrap();
    }
    subject.close();

    let received: Vec<u32> = stream.collect().await;
    assert_eq!(received, (0..100).collect::<Vec<_>>());
}

#[test]
fn test_send_after_close_returns_error() {
    let subject = StateSubject::<i32>::new();
    subject.close();
    subject.close();

    assert_eq!(subject.next(1), Err(SubjectError::Closed));
    assert!(subject.subscribe().is_err());
    assert!(subject.is_closed());
    assert!(matches!(
        SmartdeskError::from(SubjectError::Closed),
        SmartdeskError::Closed
    ));
}

#[test]
fn test_dropped_subscribers_are_pruned_on_next_send() {
    let subject = StateSubject::<i32>::new();
    let first = subject.subscribe().unwrap();
    let _second = subject.subscribe().unwrap();
    assert_eq!(subject.subscriber_count(), 2);

    drop(first);
    subject.next(7).unwrap();

    assert_eq!(subject.subscriber_count(), 1);
}
