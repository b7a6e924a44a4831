// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Peripheral drivers for the NXP LPC2104/2105/2106 (ARM7TDMI).
//!
//! This crate covers the clock tree and the watchdog:
//!
//! + [pll]: computing a PLLCFG scaler for a target frequency and committing
//!   it to the running PLL with the feed handshake
//! + [clocks]: bringing up the memory accelerator, PLL and APB divider from a
//!   [clocks::ClockConfig]
//! + [wdt]: the watchdog timer and its feed sequence
//!
//! All hardware access goes through [registers::RegisterAccess], so every
//! driver can be exercised on a host against a recording mock. The MMIO
//! implementations live in [syscon::Syscon] and [wdt::WdtMmio].
//!
//! # Usage
//!
//! ```rust,ignore
//! use lpc2xxx::chip_specific::Lpc2106;
//! use lpc2xxx::clocks::{ClockConfig, Clocks};
//! use lpc2xxx::syscon::Syscon;
//!
//! let syscon = Syscon::new();
//! let clocks = Clocks::<_, Lpc2106>::new(&syscon);
//! clocks.init(&ClockConfig::default())?;
//! let pclk = clocks.peripheral_frequency_hz();
//! ```

#![no_std]

pub mod chip_specific;
pub mod clocks;
pub mod error_codes;
pub mod pll;
pub mod registers;
pub mod static_ref;
pub mod syscon;
pub mod wdt;

#[doc(inline)]
pub use crate::error_codes::ErrorCode;
#[doc(inline)]
pub use crate::registers::RegisterAccess;

// This is used to run the tests on a host
#[cfg(test)]
#[macro_use]
extern crate std;

#[cfg(test)]
mod test_util;
