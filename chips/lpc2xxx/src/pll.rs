// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System phase-locked loop (PLL) driver for the LPC2104/2105/2106.
//!
//! The PLL multiplies the oscillator clock by M (1..=32). Internally its
//! current controlled oscillator (CCO) runs at `2 * P` times the output
//! frequency, and must stay within 156-320MHz. The post divider P (1, 2, 4 or
//! 8) is therefore picked from the output frequency alone.
//!
//! Changing the PLL is a two step process:
//!
//! 1. [compute_scaler] turns an input/output frequency pair into a PLLCFG
//!    value ([PllScaler]). This is pure arithmetic.
//! 2. [Pll::commit] programs the scaler into the running clock tree: write
//!    PLLCFG, enable, feed, wait for lock, connect, feed.
//!
//! Every write to PLLCON or PLLCFG only takes effect after a feed sequence
//! (0xAA followed by 0x55 on PLLFEED). Any other bus write between the two
//! feed values aborts the pending change.
//!
//! # Usage
//!
//! ```rust,ignore
//! let syscon = Syscon::new();
//! let pll = Pll::new(&syscon);
//!
//! // 14.7456MHz crystal, run the core at 58.9824MHz
//! let (scaler, error_hz) = compute_scaler(14_745_600, 58_982_400)?;
//! pll.commit(scaler);
//! ```
//!
//! [Pll::commit] waits for lock without a timeout, like the boot code shipped
//! with the parts. [Pll::commit_with_timeout] bounds the wait instead.

use crate::error_codes::ErrorCode;
use crate::registers::RegisterAccess;
use crate::syscon::{SysconRegister, PLLCFG, PLLCON, PLLFEED, PLLSTAT};

use tock_registers::fields::FieldValue;
use tock_registers::LocalRegisterCopy;

/// Smallest supported multiplier
pub const MIN_MULTIPLIER: u32 = 1;
/// Largest supported multiplier
pub const MAX_MULTIPLIER: u32 = 32;

// Output frequency band edges for each post divider. Outputs below
// 9.75MHz or above 160MHz put the CCO out of range.
const DIVIDE_BY_8_BELOW_HZ: u64 = 19_500_000;
const DIVIDE_BY_4_BELOW_HZ: u64 = 39_000_000;
const DIVIDE_BY_2_BELOW_HZ: u64 = 78_000_000;

/// PLL post divider (PSEL)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PostDivider {
    DivideBy1,
    DivideBy2,
    DivideBy4,
    DivideBy8,
}

impl PostDivider {
    // Pick the divider that keeps the CCO in range for the given PLL output.
    fn for_output_frequency(output_hz: u64) -> PostDivider {
        if output_hz < DIVIDE_BY_8_BELOW_HZ {
            PostDivider::DivideBy8
        } else if output_hz < DIVIDE_BY_4_BELOW_HZ {
            PostDivider::DivideBy4
        } else if output_hz < DIVIDE_BY_2_BELOW_HZ {
            PostDivider::DivideBy2
        } else {
            PostDivider::DivideBy1
        }
    }

    fn pllcfg(self) -> FieldValue<u32, PLLCFG::Register> {
        match self {
            PostDivider::DivideBy1 => PLLCFG::PSEL::DivideBy1,
            PostDivider::DivideBy2 => PLLCFG::PSEL::DivideBy2,
            PostDivider::DivideBy4 => PLLCFG::PSEL::DivideBy4,
            PostDivider::DivideBy8 => PLLCFG::PSEL::DivideBy8,
        }
    }

    /// The division factor
    pub fn divisor(self) -> u32 {
        match self {
            PostDivider::DivideBy1 => 1,
            PostDivider::DivideBy2 => 2,
            PostDivider::DivideBy4 => 4,
            PostDivider::DivideBy8 => 8,
        }
    }
}

impl From<PLLCFG::PSEL::Value> for PostDivider {
    fn from(psel: PLLCFG::PSEL::Value) -> Self {
        match psel {
            PLLCFG::PSEL::Value::DivideBy1 => PostDivider::DivideBy1,
            PLLCFG::PSEL::Value::DivideBy2 => PostDivider::DivideBy2,
            PLLCFG::PSEL::Value::DivideBy4 => PostDivider::DivideBy4,
            PLLCFG::PSEL::Value::DivideBy8 => PostDivider::DivideBy8,
        }
    }
}

impl From<PLLSTAT::PSEL::Value> for PostDivider {
    fn from(psel: PLLSTAT::PSEL::Value) -> Self {
        match psel {
            PLLSTAT::PSEL::Value::DivideBy1 => PostDivider::DivideBy1,
            PLLSTAT::PSEL::Value::DivideBy2 => PostDivider::DivideBy2,
            PLLSTAT::PSEL::Value::DivideBy4 => PostDivider::DivideBy4,
            PLLSTAT::PSEL::Value::DivideBy8 => PostDivider::DivideBy8,
        }
    }
}

/// Value for the PLLCFG register.
///
/// Bits 0-4 hold the multiplier minus one, bits 5-6 the post divider select.
/// Bit 7 is reserved in hardware and used here to mark a scaler that must not
/// be programmed ([PllScaler::INVALID]).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PllScaler(u8);

impl PllScaler {
    const INVALID_BIT: u8 = 0x80;

    /// Marker for "no valid configuration". [Pll::commit] ignores it.
    pub const INVALID: PllScaler = PllScaler(Self::INVALID_BIT);

    /// Wrap a raw PLLCFG value, including the invalid marker if set.
    pub const fn from_raw(raw: u8) -> PllScaler {
        PllScaler(raw)
    }

    /// Build a scaler from a multiplier and a post divider.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::OutOfRange]\): if `multiplier` is not in 1..=32
    pub fn new(multiplier: u32, divider: PostDivider) -> Result<PllScaler, ErrorCode> {
        if multiplier < MIN_MULTIPLIER || multiplier > MAX_MULTIPLIER {
            return Err(ErrorCode::OutOfRange);
        }
        let pllcfg = divider.pllcfg() + PLLCFG::MSEL.val(multiplier - 1);
        Ok(PllScaler(pllcfg.value as u8))
    }

    /// The raw register value
    pub const fn raw(self) -> u8 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 & Self::INVALID_BIT == 0
    }

    /// The multiplier M, or [None] for an invalid scaler.
    pub fn multiplier(self) -> Option<u32> {
        if self.is_valid() {
            Some(self.pllcfg().read(PLLCFG::MSEL) + 1)
        } else {
            None
        }
    }

    /// The post divider, or [None] for an invalid scaler.
    pub fn divider(self) -> Option<PostDivider> {
        if self.is_valid() {
            self.pllcfg()
                .read_as_enum::<PLLCFG::PSEL::Value>(PLLCFG::PSEL)
                .map(PostDivider::from)
        } else {
            None
        }
    }

    fn pllcfg(self) -> LocalRegisterCopy<u32, PLLCFG::Register> {
        LocalRegisterCopy::new(self.0 as u32)
    }
}

impl From<PllScaler> for u8 {
    fn from(scaler: PllScaler) -> u8 {
        scaler.0
    }
}

/// Compute the PLLCFG value that gets closest to `clock_out` from `clock_in`.
///
/// The multiplier is `clock_out / clock_in` rounded to the nearest integer.
/// The post divider is the one whose band contains the achieved frequency.
///
/// # Returns
///
/// The scaler and the error in Hz between the achieved frequency
/// (`multiplier * clock_in`) and `clock_out`: positive when the PLL runs
/// faster than requested. The error saturates at the [i32] bounds.
///
/// # Errors
///
/// + [Err]\([ErrorCode::OutOfRange]\): if `clock_in` is 0 or the rounded
/// multiplier is outside 1..=32. Multipliers below 1 are not clamped.
pub fn compute_scaler(clock_in: u32, clock_out: u32) -> Result<(PllScaler, i32), ErrorCode> {
    if clock_in == 0 {
        log::debug!("pll: input clock is 0Hz");
        return Err(ErrorCode::OutOfRange);
    }

    let clock_in = u64::from(clock_in);
    let clock_out = u64::from(clock_out);

    let multiplier = (clock_out + clock_in / 2) / clock_in;
    if multiplier < u64::from(MIN_MULTIPLIER) || multiplier > u64::from(MAX_MULTIPLIER) {
        log::debug!(
            "pll: no multiplier reaches {}Hz from {}Hz (got {})",
            clock_out,
            clock_in,
            multiplier
        );
        return Err(ErrorCode::OutOfRange);
    }

    let actual = multiplier * clock_in;
    let divider = PostDivider::for_output_frequency(actual);
    let scaler = PllScaler::new(multiplier as u32, divider)?;

    let error = (actual as i64 - clock_out as i64).clamp(i64::from(i32::MIN), i64::from(i32::MAX));

    log::trace!(
        "pll: {}Hz -> {}Hz: M={} P={} PLLCFG={:#04x}",
        clock_in,
        actual,
        multiplier,
        divider.divisor(),
        scaler.raw()
    );

    Ok((scaler, error as i32))
}

/// Decoded snapshot of PLLSTAT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PllStatus {
    /// Multiplier in use
    pub multiplier: u32,
    /// Post divider in use
    pub divider: PostDivider,
    /// PLLE as latched by the last feed
    pub enabled: bool,
    /// PLLC as latched by the last feed
    pub connected: bool,
    /// PLOCK
    pub locked: bool,
}

impl From<LocalRegisterCopy<u32, PLLSTAT::Register>> for PllStatus {
    fn from(pllstat: LocalRegisterCopy<u32, PLLSTAT::Register>) -> Self {
        PllStatus {
            multiplier: pllstat.read(PLLSTAT::MSEL) + 1,
            // All four PSEL encodings are named
            divider: pllstat
                .read_as_enum::<PLLSTAT::PSEL::Value>(PLLSTAT::PSEL)
                .map_or(PostDivider::DivideBy8, PostDivider::from),
            enabled: pllstat.is_set(PLLSTAT::PLLE),
            connected: pllstat.is_set(PLLSTAT::PLLC),
            locked: pllstat.is_set(PLLSTAT::PLOCK),
        }
    }
}

/// System PLL driver.
pub struct Pll<'a, R: RegisterAccess<SysconRegister>> {
    registers: &'a R,
}

impl<'a, R: RegisterAccess<SysconRegister>> Pll<'a, R> {
    pub const fn new(registers: &'a R) -> Self {
        Self { registers }
    }

    /// Latch pending PLLCON/PLLCFG writes.
    pub fn feed(&self) {
        self.registers
            .write(SysconRegister::PllFeed, PLLFEED::FEED::First.value);
        self.registers
            .write(SysconRegister::PllFeed, PLLFEED::FEED::Second.value);
    }

    /// Program `scaler` and switch the core clock over to the PLL output.
    ///
    /// A scaler with the invalid marker set is ignored: no register is read
    /// or written.
    ///
    /// This busy-waits on PLOCK with no upper bound. If the PLL never locks
    /// the call never returns.
    pub fn commit(&self, scaler: PllScaler) {
        if !scaler.is_valid() {
            log::warn!("pll: refusing to commit invalid scaler {:#04x}", scaler.raw());
            return;
        }

        self.configure_and_enable(scaler);

        while !self.is_locked() {
            core::hint::spin_loop();
        }

        self.connect();
        log::debug!("pll: connected with PLLCFG={:#04x}", scaler.raw());
    }

    /// Same as [Pll::commit], but gives up after polling PLOCK `max_polls`
    /// times.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::OutOfRange]\): if the scaler carries the invalid
    /// marker. No register is accessed.
    /// + [Err]\([ErrorCode::LockTimeout]\): if the PLL did not lock in time. The
    /// PLL is left enabled with the new configuration but not connected, so
    /// the core keeps running from the oscillator.
    pub fn commit_with_timeout(&self, scaler: PllScaler, max_polls: usize) -> Result<(), ErrorCode> {
        if !scaler.is_valid() {
            return Err(ErrorCode::OutOfRange);
        }

        self.configure_and_enable(scaler);

        if !(0..max_polls).any(|_| self.is_locked()) {
            log::warn!("pll: no lock after {} polls", max_polls);
            return Err(ErrorCode::LockTimeout);
        }

        self.connect();
        log::debug!("pll: connected with PLLCFG={:#04x}", scaler.raw());
        Ok(())
    }

    fn configure_and_enable(&self, scaler: PllScaler) {
        self.registers
            .write(SysconRegister::PllConfig, u32::from(scaler.raw()));
        self.registers
            .write(SysconRegister::PllControl, PLLCON::PLLE::SET.value);
        self.feed();
    }

    fn connect(&self) {
        self.registers.write(
            SysconRegister::PllControl,
            (PLLCON::PLLE::SET + PLLCON::PLLC::SET).value,
        );
        self.feed();
    }

    /// Switch the core back to the oscillator and power the PLL down.
    pub fn disconnect(&self) {
        // PLLC has to be cleared and fed before PLLE
        self.registers
            .write(SysconRegister::PllControl, PLLCON::PLLE::SET.value);
        self.feed();
        self.registers
            .write(SysconRegister::PllControl, PLLCON::PLLE::CLEAR.value);
        self.feed();
    }

    pub fn status(&self) -> PllStatus {
        PllStatus::from(self.pllstat())
    }

    pub fn is_locked(&self) -> bool {
        self.pllstat().is_set(PLLSTAT::PLOCK)
    }

    pub fn is_enabled(&self) -> bool {
        self.pllstat().is_set(PLLSTAT::PLLE)
    }

    pub fn is_connected(&self) -> bool {
        self.pllstat().is_set(PLLSTAT::PLLC)
    }

    /// Core clock frequency derived from the hardware state.
    ///
    /// # Returns
    ///
    /// `clock_in * M` if the PLL is enabled and connected, `clock_in`
    /// otherwise.
    pub fn core_frequency(&self, clock_in: u32) -> u32 {
        let status = self.status();
        if status.enabled && status.connected {
            clock_in.saturating_mul(status.multiplier)
        } else {
            clock_in
        }
    }

    fn pllstat(&self) -> LocalRegisterCopy<u32, PLLSTAT::Register> {
        LocalRegisterCopy::new(self.registers.read(SysconRegister::PllStatus))
    }
}
