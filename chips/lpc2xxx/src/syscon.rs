// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! System control block (SYSCON).
//!
//! Only the registers driven by this crate are described: the memory
//! accelerator (MAM), the system PLL and the APB divider.

use crate::registers::RegisterAccess;
use crate::static_ref::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// System control block
    pub SysconRegisters {
        /// MAM control register
        (0x000 => mamcr: ReadWrite<u32, MAMCR::Register>),
        /// MAM timing register
        (0x004 => mamtim: ReadWrite<u32, MAMTIM::Register>),
        (0x008 => _reserved0),
        /// PLL control register
        (0x080 => pllcon: ReadWrite<u32, PLLCON::Register>),
        /// PLL configuration register
        (0x084 => pllcfg: ReadWrite<u32, PLLCFG::Register>),
        /// PLL status register
        (0x088 => pllstat: ReadOnly<u32, PLLSTAT::Register>),
        /// PLL feed register
        (0x08C => pllfeed: WriteOnly<u32, PLLFEED::Register>),
        (0x090 => _reserved1),
        /// APB divider register
        (0x100 => apbdiv: ReadWrite<u32, APBDIV::Register>),
        (0x104 => @END),
    }
}

register_bitfields![u32,
    pub MAMCR [
        /// Memory accelerator mode
        MODE OFFSET(0) NUMBITS(2) [
            Disabled = 0,
            Partial = 1,
            Full = 2
        ]
    ],
    pub MAMTIM [
        /// Number of CPU clocks used for a flash fetch
        CYCLES OFFSET(0) NUMBITS(3) []
    ],
    pub PLLCON [
        /// PLL connect
        PLLC OFFSET(1) NUMBITS(1) [],
        /// PLL enable
        PLLE OFFSET(0) NUMBITS(1) []
    ],
    pub PLLCFG [
        /// Post divider select
        PSEL OFFSET(5) NUMBITS(2) [
            DivideBy1 = 0,
            DivideBy2 = 1,
            DivideBy4 = 2,
            DivideBy8 = 3
        ],
        /// Multiplier minus one
        MSEL OFFSET(0) NUMBITS(5) []
    ],
    pub PLLSTAT [
        /// PLL locked
        PLOCK OFFSET(10) NUMBITS(1) [],
        /// PLL connected
        PLLC OFFSET(9) NUMBITS(1) [],
        /// PLL enabled
        PLLE OFFSET(8) NUMBITS(1) [],
        /// Post divider currently in use
        PSEL OFFSET(5) NUMBITS(2) [
            DivideBy1 = 0,
            DivideBy2 = 1,
            DivideBy4 = 2,
            DivideBy8 = 3
        ],
        /// Multiplier minus one currently in use
        MSEL OFFSET(0) NUMBITS(5) []
    ],
    pub PLLFEED [
        FEED OFFSET(0) NUMBITS(8) [
            First = 0xAA,
            Second = 0x55
        ]
    ],
    pub APBDIV [
        /// Peripheral clock divider
        DIV OFFSET(0) NUMBITS(2) [
            DivideBy4 = 0,
            DivideBy1 = 1,
            DivideBy2 = 2
        ]
    ]
];

// Page 2-3 of the LPC2104/2105/2106 user manual
const SYSCON_BASE: StaticRef<SysconRegisters> =
    unsafe { StaticRef::new(0xE01F_C000 as *const SysconRegisters) };

/// Names of the SYSCON registers reachable through [RegisterAccess].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SysconRegister {
    MamControl,
    MamTiming,
    PllControl,
    PllConfig,
    PllStatus,
    PllFeed,
    ApbDivider,
}

/// Memory-mapped SYSCON block.
pub struct Syscon {
    registers: StaticRef<SysconRegisters>,
}

impl Syscon {
    pub const fn new() -> Syscon {
        Syscon {
            registers: SYSCON_BASE,
        }
    }
}

impl RegisterAccess<SysconRegister> for Syscon {
    fn read(&self, register: SysconRegister) -> u32 {
        let regs = &*self.registers;
        match register {
            SysconRegister::MamControl => regs.mamcr.get(),
            SysconRegister::MamTiming => regs.mamtim.get(),
            SysconRegister::PllControl => regs.pllcon.get(),
            SysconRegister::PllConfig => regs.pllcfg.get(),
            SysconRegister::PllStatus => regs.pllstat.get(),
            // Write only
            SysconRegister::PllFeed => 0,
            SysconRegister::ApbDivider => regs.apbdiv.get(),
        }
    }

    fn write(&self, register: SysconRegister, value: u32) {
        let regs = &*self.registers;
        match register {
            SysconRegister::MamControl => regs.mamcr.set(value),
            SysconRegister::MamTiming => regs.mamtim.set(value),
            SysconRegister::PllControl => regs.pllcon.set(value),
            SysconRegister::PllConfig => regs.pllcfg.set(value),
            SysconRegister::PllStatus => {
                log::warn!("syscon: ignoring write of {:#x} to PLLSTAT", value);
            }
            SysconRegister::PllFeed => regs.pllfeed.set(value),
            SysconRegister::ApbDivider => regs.apbdiv.set(value),
        }
    }
}
