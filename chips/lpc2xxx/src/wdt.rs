// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Watchdog timer (WDT).
//!
//! The watchdog counts down from WDTC at PCLK / 4. Once enabled it can only
//! be stopped by a reset. Enabling alone does not start the counter: the
//! first feed does. On underflow it sets WDTOF and, if WDRESET is set, resets
//! the chip.

use crate::error_codes::ErrorCode;
use crate::registers::RegisterAccess;
use crate::static_ref::StaticRef;
use tock_registers::fields::FieldValue;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs, LocalRegisterCopy};

register_structs! {
    /// Watchdog timer
    pub WdtRegisters {
        /// Mode register
        (0x00 => wdmod: ReadWrite<u32, WDMOD::Register>),
        /// Timer constant register
        (0x04 => wdtc: ReadWrite<u32>),
        /// Feed sequence register
        (0x08 => wdfeed: WriteOnly<u32, WDFEED::Register>),
        /// Timer value register
        (0x0C => wdtv: ReadOnly<u32>),
        (0x10 => @END),
    }
}

register_bitfields![u32,
    pub WDMOD [
        /// Interrupt flag, read only
        WDINT OFFSET(3) NUMBITS(1) [],
        /// Time-out flag, cleared by software
        WDTOF OFFSET(2) NUMBITS(1) [],
        /// Reset the chip on time-out
        WDRESET OFFSET(1) NUMBITS(1) [],
        /// Watchdog enable, cleared only by a reset
        WDEN OFFSET(0) NUMBITS(1) []
    ],
    pub WDFEED [
        FEED OFFSET(0) NUMBITS(8) [
            First = 0xAA,
            Second = 0x55
        ]
    ]
];

// Page 17-2 of the LPC2104/2105/2106 user manual
const WDT_BASE: StaticRef<WdtRegisters> =
    unsafe { StaticRef::new(0xE000_0000 as *const WdtRegisters) };

/// Smallest timer constant. The hardware replaces anything lower by this.
pub const MIN_TIMEOUT_TICKS: u32 = 0xFF;

/// Names of the WDT registers reachable through [RegisterAccess].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WdtRegister {
    Mode,
    TimerConstant,
    Feed,
    TimerValue,
}

/// Memory-mapped WDT block.
pub struct WdtMmio {
    registers: StaticRef<WdtRegisters>,
}

impl WdtMmio {
    pub const fn new() -> WdtMmio {
        WdtMmio {
            registers: WDT_BASE,
        }
    }
}

impl RegisterAccess<WdtRegister> for WdtMmio {
    fn read(&self, register: WdtRegister) -> u32 {
        let regs = &*self.registers;
        match register {
            WdtRegister::Mode => regs.wdmod.get(),
            WdtRegister::TimerConstant => regs.wdtc.get(),
            // Write only
            WdtRegister::Feed => 0,
            WdtRegister::TimerValue => regs.wdtv.get(),
        }
    }

    fn write(&self, register: WdtRegister, value: u32) {
        let regs = &*self.registers;
        match register {
            WdtRegister::Mode => regs.wdmod.set(value),
            WdtRegister::TimerConstant => regs.wdtc.set(value),
            WdtRegister::Feed => regs.wdfeed.set(value),
            WdtRegister::TimerValue => {
                log::warn!("wdt: ignoring write of {:#x} to WDTV", value);
            }
        }
    }
}

/// Watchdog driver.
pub struct Watchdog<'a, R: RegisterAccess<WdtRegister>> {
    registers: &'a R,
}

impl<'a, R: RegisterAccess<WdtRegister>> Watchdog<'a, R> {
    pub const fn new(registers: &'a R) -> Self {
        Self { registers }
    }

    fn wdmod(&self) -> LocalRegisterCopy<u32, WDMOD::Register> {
        LocalRegisterCopy::new(self.registers.read(WdtRegister::Mode))
    }

    fn modify_wdmod(&self, field: FieldValue<u32, WDMOD::Register>) {
        let mut wdmod = self.wdmod();
        wdmod.modify(field);
        self.registers.write(WdtRegister::Mode, wdmod.get());
    }

    /// Set WDEN. The counter starts on the next [Watchdog::feed].
    pub fn enable(&self) {
        self.modify_wdmod(WDMOD::WDEN::SET);
    }

    pub fn is_enabled(&self) -> bool {
        self.wdmod().is_set(WDMOD::WDEN)
    }

    /// Reset the chip when the counter underflows.
    pub fn enable_reset(&self) {
        self.modify_wdmod(WDMOD::WDRESET::SET);
    }

    pub fn is_reset_enabled(&self) -> bool {
        self.wdmod().is_set(WDMOD::WDRESET)
    }

    /// Whether the last reset (or the current run) saw a time-out.
    pub fn timed_out(&self) -> bool {
        self.wdmod().is_set(WDMOD::WDTOF)
    }

    pub fn clear_timeout(&self) {
        self.modify_wdmod(WDMOD::WDTOF::CLEAR);
    }

    /// Set the value loaded into the counter on every feed.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::InvalidConfig]\): `ticks` is below 0xFF. Nothing
    /// is written.
    pub fn set_timeout(&self, ticks: u32) -> Result<(), ErrorCode> {
        if ticks < MIN_TIMEOUT_TICKS {
            log::debug!("wdt: timeout of {} ticks is too short", ticks);
            return Err(ErrorCode::InvalidConfig);
        }
        self.registers.write(WdtRegister::TimerConstant, ticks);
        Ok(())
    }

    /// The configured timer constant
    pub fn timeout(&self) -> u32 {
        self.registers.read(WdtRegister::TimerConstant)
    }

    /// Ticks left before the time-out
    pub fn current_value(&self) -> u32 {
        self.registers.read(WdtRegister::TimerValue)
    }

    /// Reload the counter from WDTC.
    ///
    /// The two writes must reach WDFEED back to back, with no other access to
    /// the WDT in between.
    pub fn feed(&self) {
        self.registers
            .write(WdtRegister::Feed, WDFEED::FEED::First.value);
        self.registers
            .write(WdtRegister::Feed, WDFEED::FEED::Second.value);
    }

    /// Arm the watchdog so that it resets the chip after `ticks` watchdog
    /// clocks without a feed.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::InvalidConfig]\): `ticks` is below 0xFF. Nothing
    /// is written.
    pub fn start(&self, ticks: u32) -> Result<(), ErrorCode> {
        self.set_timeout(ticks)?;
        self.modify_wdmod(WDMOD::WDEN::SET + WDMOD::WDRESET::SET);
        self.feed();
        log::debug!("wdt: started with {} ticks", ticks);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Watchdog, WdtRegister, WdtRegisters, MIN_TIMEOUT_TICKS, WDFEED, WDMOD};
    use crate::error_codes::ErrorCode;
    use crate::test_util::{Access, RegisterSpy};

    #[test]
    fn field_encodings_match_the_user_manual() {
        assert_eq!(0b0011, (WDMOD::WDEN::SET + WDMOD::WDRESET::SET).value);
        assert_eq!(0b0100, WDMOD::WDTOF::SET.value);
        assert_eq!(0xAA, WDFEED::FEED::First.value);
        assert_eq!(0x55, WDFEED::FEED::Second.value);
    }

    #[test]
    fn register_block_spans_wdtv() {
        assert_eq!(0x10, core::mem::size_of::<WdtRegisters>());
    }

    #[test]
    fn start_sequence() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);

        assert_eq!(Ok(()), wdt.start(0x0001_0000));

        assert_eq!(
            vec![
                Access::Write(WdtRegister::TimerConstant, 0x0001_0000),
                Access::Read(WdtRegister::Mode, 0),
                Access::Write(WdtRegister::Mode, 0b11),
                Access::Write(WdtRegister::Feed, 0xAA),
                Access::Write(WdtRegister::Feed, 0x55),
            ],
            spy.accesses()
        );
        assert!(wdt.is_enabled());
        assert!(wdt.is_reset_enabled());
        assert_eq!(0x0001_0000, wdt.timeout());
    }

    #[test]
    fn short_timeouts_are_rejected() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);

        assert_eq!(Err(ErrorCode::InvalidConfig), wdt.start(0));
        assert_eq!(
            Err(ErrorCode::InvalidConfig),
            wdt.set_timeout(MIN_TIMEOUT_TICKS - 1)
        );
        assert!(spy.accesses().is_empty());

        assert_eq!(Ok(()), wdt.set_timeout(MIN_TIMEOUT_TICKS));
        assert_eq!(
            vec![(WdtRegister::TimerConstant, MIN_TIMEOUT_TICKS)],
            spy.writes()
        );
    }

    #[test]
    fn feed_writes_both_values_back_to_back() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);

        wdt.feed();
        assert_eq!(
            vec![
                Access::Write(WdtRegister::Feed, 0xAA),
                Access::Write(WdtRegister::Feed, 0x55),
            ],
            spy.accesses()
        );
    }

    #[test]
    fn mode_bits_are_preserved() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);

        wdt.enable();
        assert!(wdt.is_enabled());
        assert!(!wdt.is_reset_enabled());
        // The counter only starts on the first feed
        assert!(!spy
            .accesses()
            .iter()
            .any(|access| matches!(access, Access::Write(WdtRegister::Feed, _))));

        wdt.enable_reset();
        assert_eq!(0b0011, spy.value(WdtRegister::Mode));
    }

    #[test]
    fn timeout_flag() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);
        spy.preset(WdtRegister::Mode, 0b0101);

        assert!(wdt.timed_out());
        wdt.clear_timeout();
        assert!(!wdt.timed_out());
        assert_eq!(0b0001, spy.value(WdtRegister::Mode));
    }

    #[test]
    fn counter_value() {
        let spy = RegisterSpy::<WdtRegister>::new();
        let wdt = Watchdog::new(&spy);
        spy.preset(WdtRegister::TimerValue, 0x1234);

        assert_eq!(0x1234, wdt.current_value());
        assert_eq!(
            vec![Access::Read(WdtRegister::TimerValue, 0x1234)],
            spy.accesses()
        );
    }
}
