//! Timeout tests for clk-core

use core::time::Duration;

use clk_core::{timeout, ClkError, OnOffError, TakeError, Timeout};

#[test]
fn test_timeout_from_millis() {
    let t = Timeout::from_millis(500);
    assert_eq!(t.as_millis(), Some(500));
    assert_eq!(t.to_duration(), Some(Duration::from_millis(500)));
    assert!(!t.is_forever());
    assert!(!t.is_no_wait());
}

#[test]
fn test_special_timeouts() {
    assert!(Timeout::FOREVER.is_forever());
    assert_eq!(Timeout::FOREVER.to_duration(), None);
    assert!(Timeout::NO_WAIT.is_no_wait());
    assert_eq!(Timeout::NO_WAIT.as_millis(), Some(0));
}

#[test]
fn test_timeout_macro() {
    assert_eq!(timeout!(500 ms), Timeout::from_millis(500));
    assert_eq!(timeout!(2 s), Timeout::from_millis(2000));
    assert_eq!(timeout!(forever), Timeout::FOREVER);
    assert_eq!(timeout!(no_wait), Timeout::NO_WAIT);
}

#[test]
fn test_timeout_from_duration_saturates() {
    let t = Timeout::from(Duration::from_secs(u64::MAX / 2));
    assert_eq!(t.as_millis(), Some(u32::MAX));
}

#[test]
fn test_timeout_display() {
    assert_eq!(Timeout::from_millis(10).to_string(), "10ms");
    assert_eq!(Timeout::FOREVER.to_string(), "forever");
}

#[test]
fn test_error_conversions() {
    assert_eq!(ClkError::from(TakeError::Timeout), ClkError::Timeout);
    assert_eq!(ClkError::from(TakeError::Busy), ClkError::Semaphore);
    assert_eq!(
        ClkError::from(OnOffError::ManagerFault),
        ClkError::OnOff(OnOffError::ManagerFault)
    );
}
