// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System clock bring-up.
//!
//! After reset the core runs directly from the crystal, the memory
//! accelerator (MAM) is off and the peripheral bus (APB) runs at a quarter of
//! the core clock. [Clocks::init] moves the chip to a [ClockConfig] in one
//! go:
//!
//! 1. MAM off, MAM fetch timing, MAM on in the configured mode
//! 2. PLL programmed and connected (skipped when the CPU should run at the
//!    crystal frequency)
//! 3. APB divider
//!
//! Everything that can be rejected is checked before the first register
//! write, so a failed `init` leaves the hardware untouched.
//!
//! # Usage
//!
//! ```rust,ignore
//! let clocks = Clocks::<_, Lpc2106>::new(&syscon);
//! clocks.init(&ClockConfig {
//!     cpu_hz: 44_236_800,
//!     apb_divider: ApbDivider::DivideBy2,
//!     ..ClockConfig::default()
//! })?;
//! assert_eq!(22_118_400, clocks.peripheral_frequency_hz());
//! ```

use crate::chip_specific::ClockConstants;
use crate::error_codes::ErrorCode;
use crate::pll::{compute_scaler, Pll, PllScaler};
use crate::registers::RegisterAccess;
use crate::syscon::{SysconRegister, APBDIV, MAMCR, MAMTIM};

use core::cell::Cell;
use core::marker::PhantomData;
use tock_registers::LocalRegisterCopy;

/// Highest MAM fetch cycle count supported by MAMTIM
pub const MAX_MAM_FETCH_CYCLES: u8 = 7;

/// Peripheral bus clock divider (APBDIV)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApbDivider {
    DivideBy1,
    DivideBy2,
    DivideBy4,
}

impl ApbDivider {
    fn apbdiv(self) -> u32 {
        match self {
            ApbDivider::DivideBy1 => APBDIV::DIV::DivideBy1.value,
            ApbDivider::DivideBy2 => APBDIV::DIV::DivideBy2.value,
            ApbDivider::DivideBy4 => APBDIV::DIV::DivideBy4.value,
        }
    }

    /// The division factor
    pub fn divisor(self) -> u32 {
        match self {
            ApbDivider::DivideBy1 => 1,
            ApbDivider::DivideBy2 => 2,
            ApbDivider::DivideBy4 => 4,
        }
    }
}

/// Memory accelerator mode (MAMCR)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MamMode {
    Disabled,
    Partial,
    Full,
}

impl MamMode {
    fn mamcr(self) -> u32 {
        match self {
            MamMode::Disabled => MAMCR::MODE::Disabled.value,
            MamMode::Partial => MAMCR::MODE::Partial.value,
            MamMode::Full => MAMCR::MODE::Full.value,
        }
    }
}

/// Target state of the clock tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockConfig {
    /// Crystal frequency
    pub oscillator_hz: u32,
    /// Requested core frequency. The PLL gets as close as an integer multiple
    /// of the crystal allows.
    pub cpu_hz: u32,
    pub apb_divider: ApbDivider,
    pub mam_mode: MamMode,
    /// CPU clocks per flash fetch, 1..=7
    pub mam_fetch_cycles: u8,
}

impl Default for ClockConfig {
    /// 14.7456MHz crystal, core at 4x (58.9824MHz), APB at a quarter of the
    /// core, MAM fully enabled with 3 cycle fetches.
    fn default() -> Self {
        ClockConfig {
            oscillator_hz: 14_745_600,
            cpu_hz: 58_982_400,
            apb_divider: ApbDivider::DivideBy4,
            mam_mode: MamMode::Full,
            mam_fetch_cycles: 3,
        }
    }
}

/// Main struct for configuring the clock tree.
pub struct Clocks<'a, R: RegisterAccess<SysconRegister>, C: ClockConstants> {
    registers: &'a R,
    pll: Pll<'a, R>,
    configured: Cell<bool>,
    oscillator_hz: Cell<u32>,
    core_hz: Cell<u32>,
    apb_divider: Cell<ApbDivider>,
    _chip: PhantomData<C>,
}

impl<'a, R: RegisterAccess<SysconRegister>, C: ClockConstants> Clocks<'a, R, C> {
    pub fn new(registers: &'a R) -> Self {
        Self {
            registers,
            pll: Pll::new(registers),
            configured: Cell::new(false),
            oscillator_hz: Cell::new(0),
            core_hz: Cell::new(0),
            // APBDIV reset value
            apb_divider: Cell::new(ApbDivider::DivideBy4),
            _chip: PhantomData,
        }
    }

    /// The system PLL
    pub fn pll(&self) -> &Pll<'a, R> {
        &self.pll
    }

    /// Bring the clock tree up to `config`.
    ///
    /// # Errors
    ///
    /// + [Err]\([ErrorCode::AlreadyConfigured]\): `init` already succeeded once
    /// + [Err]\([ErrorCode::InvalidConfig]\): the fetch cycles are not in
    /// 1..=7, the requested or the reachable CPU frequency is above the chip
    /// limit, the oscillator is above the chip limit, or the PLL is needed
    /// and the oscillator is below the range it accepts
    /// + [Err]\([ErrorCode::OutOfRange]\): no PLL multiplier reaches the CPU
    /// frequency
    ///
    /// No register is written when an error is returned.
    pub fn init(&self, config: &ClockConfig) -> Result<(), ErrorCode> {
        if self.configured.get() {
            return Err(ErrorCode::AlreadyConfigured);
        }
        Self::validate(config)?;

        let scaler = if config.cpu_hz != config.oscillator_hz {
            Some(Self::pll_scaler(config)?)
        } else {
            None
        };

        // MAMTIM can only be changed while the MAM is off
        self.registers
            .write(SysconRegister::MamControl, MAMCR::MODE::Disabled.value);
        self.registers.write(
            SysconRegister::MamTiming,
            MAMTIM::CYCLES.val(u32::from(config.mam_fetch_cycles)).value,
        );
        self.registers
            .write(SysconRegister::MamControl, config.mam_mode.mamcr());

        let core_hz = match scaler {
            Some((scaler, core_hz)) => {
                self.pll.commit(scaler);
                core_hz
            }
            None => config.oscillator_hz,
        };

        self.registers
            .write(SysconRegister::ApbDivider, config.apb_divider.apbdiv());

        self.oscillator_hz.set(config.oscillator_hz);
        self.core_hz.set(core_hz);
        self.apb_divider.set(config.apb_divider);
        self.configured.set(true);

        log::debug!(
            "clocks: core {}Hz, peripherals {}Hz",
            self.core_frequency_hz(),
            self.peripheral_frequency_hz()
        );
        Ok(())
    }

    fn validate(config: &ClockConfig) -> Result<(), ErrorCode> {
        if config.mam_fetch_cycles == 0 || config.mam_fetch_cycles > MAX_MAM_FETCH_CYCLES {
            log::debug!(
                "clocks: invalid MAM fetch cycles {}",
                config.mam_fetch_cycles
            );
            return Err(ErrorCode::InvalidConfig);
        }
        if config.cpu_hz > C::MAX_CPU_FREQUENCY_HZ {
            log::debug!("clocks: {}Hz is above the core limit", config.cpu_hz);
            return Err(ErrorCode::InvalidConfig);
        }
        if config.oscillator_hz == 0 || config.oscillator_hz > C::MAX_OSCILLATOR_HZ {
            log::debug!(
                "clocks: unsupported oscillator frequency {}Hz",
                config.oscillator_hz
            );
            return Err(ErrorCode::InvalidConfig);
        }
        Ok(())
    }

    // PLL setting for `config` and the core frequency it reaches.
    fn pll_scaler(config: &ClockConfig) -> Result<(PllScaler, u32), ErrorCode> {
        // The oscillator floor only binds when the PLL is in use
        if config.oscillator_hz < C::MIN_OSCILLATOR_HZ {
            log::debug!(
                "clocks: {}Hz oscillator is too slow for the PLL",
                config.oscillator_hz
            );
            return Err(ErrorCode::InvalidConfig);
        }

        let (scaler, error_hz) = compute_scaler(config.oscillator_hz, config.cpu_hz)?;
        let reached_hz = i64::from(config.cpu_hz) + i64::from(error_hz);
        if reached_hz > i64::from(C::MAX_CPU_FREQUENCY_HZ) {
            log::debug!(
                "clocks: closest PLL setting gives {}Hz, above the core limit",
                reached_hz
            );
            return Err(ErrorCode::InvalidConfig);
        }
        if error_hz != 0 {
            log::debug!(
                "clocks: core clock off by {}Hz from the requested {}Hz",
                error_hz,
                config.cpu_hz
            );
        }

        Ok((scaler, reached_hz as u32))
    }

    /// Whether [Clocks::init] succeeded
    pub fn is_configured(&self) -> bool {
        self.configured.get()
    }

    /// Core clock frequency in Hz, 0 before [Clocks::init]
    pub fn core_frequency_hz(&self) -> u32 {
        self.core_hz.get()
    }

    /// Peripheral (APB) clock frequency in Hz, 0 before [Clocks::init]
    pub fn peripheral_frequency_hz(&self) -> u32 {
        self.core_hz.get() / self.apb_divider.get().divisor()
    }

    /// Re-derive the core and peripheral frequencies from PLLSTAT and APBDIV.
    ///
    /// Needed after the PLL or the APB divider was changed behind the back of
    /// this struct, for example with [Pll::disconnect].
    ///
    /// # Returns
    ///
    /// The new core clock frequency in Hz.
    pub fn update_core_frequency(&self) -> u32 {
        let core_hz = self.pll.core_frequency(self.oscillator_hz.get());
        self.core_hz.set(core_hz);

        let apbdiv: LocalRegisterCopy<u32, APBDIV::Register> =
            LocalRegisterCopy::new(self.registers.read(SysconRegister::ApbDivider));
        match apbdiv.read_as_enum(APBDIV::DIV) {
            Some(APBDIV::DIV::Value::DivideBy1) => self.apb_divider.set(ApbDivider::DivideBy1),
            Some(APBDIV::DIV::Value::DivideBy2) => self.apb_divider.set(ApbDivider::DivideBy2),
            Some(APBDIV::DIV::Value::DivideBy4) => self.apb_divider.set(ApbDivider::DivideBy4),
            // Writing the reserved encoding keeps the previous divider
            None => {}
        }

        core_hz
    }
}
