// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Clock limits for a particular part of the LPC2104/2105/2106 family.
//!
//! The three parts share one clock tree and differ in memory size only, so
//! all of them use the default limits.

/// Clock limits for a specific chip
pub trait ClockConstants {
    /// Maximum allowed core clock frequency in Hz
    const MAX_CPU_FREQUENCY_HZ: u32 = 60_000_000;
    /// Minimum crystal frequency the PLL accepts in Hz
    const MIN_OSCILLATOR_HZ: u32 = 10_000_000;
    /// Maximum crystal frequency in Hz
    const MAX_OSCILLATOR_HZ: u32 = 25_000_000;
}

/// LPC2104, 128kB flash, 16kB RAM
pub enum Lpc2104 {}
/// LPC2105, 128kB flash, 32kB RAM
pub enum Lpc2105 {}
/// LPC2106, 128kB flash, 64kB RAM
pub enum Lpc2106 {}

impl ClockConstants for Lpc2104 {}
impl ClockConstants for Lpc2105 {}
impl ClockConstants for Lpc2106 {}
