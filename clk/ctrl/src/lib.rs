#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

//! # clk-ctrl
//!
//! Clock-control gate for a radio protocol stack. It sits between the stack
//! and two platform collaborators: an on/off resource manager that owns the
//! low-frequency clock domain, and a vendor driver whose high-frequency clock
//! switch does not count its users.
//!
//! ## Module Overview
//! - [`ctrl`]   – the [`ClockCtrl`] gate and its constructors.
//! - [`lfclk`]  – boot-time LFCLK wait, calibration, non-blocking request.
//! - [`hfclk`]  – HFCLK reference counting and [`HfclkGuard`].
//! - [`source`] – [`LfclkCtrl`] / [`HfclkCtrl`] tables for the stack.
//! - [`config`] – [`ClockCtrlConfig`] and its builder.

extern crate alloc;

pub mod config;
pub mod ctrl;
pub mod hfclk;
pub mod lfclk;
pub mod source;
mod wait;

pub use clk_core::{ClkError, ClkResult, OnOffError, OnOffState, Timeout};
pub use config::{BootPolicy, ClockCtrlConfig, ClockCtrlConfigBuilder};
pub use ctrl::ClockCtrl;
pub use hfclk::{HfclkGuard, HfclkRefCount, HfclkState};
pub use lfclk::LfclkStatus;
pub use source::{HfclkCtrl, LfclkCtrl};
