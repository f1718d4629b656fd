//! HFCLK reference counting tests for clk-ctrl
//! These run on the host against the simulated driver from clk-posix.

use std::sync::{Arc, Barrier};
use std::thread;

use clk_ctrl::{ClockCtrl, HfclkState};
use clk_posix::{SimClockDriver, SimOnOffManager, StdSemaphore, Transition};

type Ctrl = ClockCtrl<SimOnOffManager, SimClockDriver, StdSemaphore>;

fn new_ctrl() -> Ctrl {
    ClockCtrl::new(
        SimOnOffManager::new(Transition::Immediate),
        SimClockDriver::new(),
    )
}

#[test]
fn test_nested_request_keeps_running() {
    let ctrl = new_ctrl();
    ctrl.hfclk_request();
    ctrl.hfclk_request();
    ctrl.hfclk_release();

    assert!(ctrl.hfclk_is_running());
    assert_eq!(ctrl.driver().hf_request_count(), 1);
    assert_eq!(ctrl.driver().hf_release_count(), 0);
    assert!(ctrl.driver().hf_running());
}

#[test]
fn test_extra_release_is_noop() {
    let ctrl = new_ctrl();
    ctrl.hfclk_request();
    ctrl.hfclk_release();
    ctrl.hfclk_release();

    assert!(!ctrl.hfclk_is_running());
    assert_eq!(ctrl.driver().hf_release_count(), 1);
    assert_eq!(ctrl.hfclk_users(), 0);
}

#[test]
fn test_release_without_request() {
    let ctrl = new_ctrl();
    ctrl.hfclk_release();

    assert_eq!(ctrl.driver().hf_release_count(), 0);
    assert_eq!(ctrl.hfclk_users(), 0);

    // the clamp must not eat the next request's edge
    ctrl.hfclk_request();
    assert_eq!(ctrl.driver().hf_request_count(), 1);
}

#[test]
fn test_state_machine_idle_active_idle() {
    let ctrl = new_ctrl();
    assert_eq!(ctrl.hfclk_state(), HfclkState::Idle);

    ctrl.hfclk_request();
    ctrl.hfclk_request();
    assert_eq!(ctrl.hfclk_state(), HfclkState::Active);
    ctrl.hfclk_release();
    assert_eq!(ctrl.hfclk_state(), HfclkState::Active);
    ctrl.hfclk_release();
    assert_eq!(ctrl.hfclk_state(), HfclkState::Idle);

    // second cycle issues a fresh pair
    ctrl.hfclk_request();
    ctrl.hfclk_release();
    assert_eq!(ctrl.driver().hf_request_count(), 2);
    assert_eq!(ctrl.driver().hf_release_count(), 2);
}

#[test]
fn test_running_matches_model_for_mixed_sequence() {
    let ctrl = new_ctrl();
    let mut model: u32 = 0;
    let mut seed: u32 = 0x2545_f491;

    for _ in 0..2000 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        if (seed >> 16) & 1 == 0 {
            ctrl.hfclk_request();
            model += 1;
        } else {
            ctrl.hfclk_release();
            model = model.saturating_sub(1);
        }
        assert_eq!(ctrl.hfclk_users(), model);
        assert_eq!(ctrl.hfclk_is_running(), model > 0);
        assert_eq!(ctrl.driver().hf_running(), model > 0);
    }
}

#[test]
fn test_guard_releases_on_drop() {
    let ctrl = new_ctrl();
    {
        let _outer = ctrl.hfclk_acquire();
        {
            let _inner = ctrl.hfclk_acquire();
            assert_eq!(ctrl.hfclk_users(), 2);
        }
        assert!(ctrl.hfclk_is_running());
    }

    assert!(!ctrl.hfclk_is_running());
    assert_eq!(ctrl.driver().hf_request_count(), 1);
    assert_eq!(ctrl.driver().hf_release_count(), 1);
}

#[test]
fn test_concurrent_first_request_has_single_edge() {
    let ctrl = Arc::new(new_ctrl());
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctrl = Arc::clone(&ctrl);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ctrl.hfclk_request();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ctrl.hfclk_users(), 8);
    assert_eq!(ctrl.driver().hf_request_count(), 1);

    let barrier = Arc::new(Barrier::new(16));
    let handles: Vec<_> = (0..16)
        .map(|_| {
            let ctrl = Arc::clone(&ctrl);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                ctrl.hfclk_release();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ctrl.hfclk_users(), 0);
    assert_eq!(ctrl.driver().hf_release_count(), 1);
}

#[test]
fn test_concurrent_balanced_pairs() {
    let ctrl = Arc::new(new_ctrl());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let ctrl = Arc::clone(&ctrl);
            thread::spawn(move || {
                for _ in 0..1000 {
                    ctrl.hfclk_request();
                    ctrl.hfclk_release();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ctrl.hfclk_users(), 0);
    assert!(!ctrl.hfclk_is_running());
    assert_eq!(
        ctrl.driver().hf_request_count(),
        ctrl.driver().hf_release_count()
    );
}
