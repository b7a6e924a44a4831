// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Host-side register mocks used by the unit tests.

use crate::registers::RegisterAccess;
use crate::syscon::SysconRegister;

use std::cell::{Cell, RefCell};
use std::vec::Vec;

/// One register access as seen by [RegisterSpy].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access<R> {
    /// Register read and the value returned
    Read(R, u32),
    /// Register write and the value written
    Write(R, u32),
}

/// Plain register file that records every access.
///
/// Registers read back the last value written (or preset), 0 otherwise.
pub(crate) struct RegisterSpy<R> {
    values: RefCell<Vec<(R, u32)>>,
    accesses: RefCell<Vec<Access<R>>>,
}

impl<R: Copy + PartialEq> RegisterSpy<R> {
    pub(crate) fn new() -> Self {
        Self {
            values: RefCell::new(Vec::new()),
            accesses: RefCell::new(Vec::new()),
        }
    }

    /// Set a register value without recording an access.
    pub(crate) fn preset(&self, register: R, value: u32) {
        let mut values = self.values.borrow_mut();
        match values.iter_mut().find(|(r, _)| *r == register) {
            Some(entry) => entry.1 = value,
            None => values.push((register, value)),
        }
    }

    /// Current value of a register, without recording an access.
    pub(crate) fn value(&self, register: R) -> u32 {
        self.values
            .borrow()
            .iter()
            .find(|(r, _)| *r == register)
            .map_or(0, |(_, value)| *value)
    }

    pub(crate) fn values(&self) -> Vec<(R, u32)> {
        self.values.borrow().clone()
    }

    pub(crate) fn accesses(&self) -> Vec<Access<R>> {
        self.accesses.borrow().clone()
    }

    /// Only the writes, in order.
    pub(crate) fn writes(&self) -> Vec<(R, u32)> {
        self.accesses
            .borrow()
            .iter()
            .filter_map(|access| match access {
                Access::Write(register, value) => Some((*register, *value)),
                Access::Read(..) => None,
            })
            .collect()
    }

    pub(crate) fn clear_accesses(&self) {
        self.accesses.borrow_mut().clear();
    }

    /// Record a read that returned `value`.
    pub(crate) fn record_read(&self, register: R, value: u32) {
        self.accesses
            .borrow_mut()
            .push(Access::Read(register, value));
    }
}

impl<R: Copy + PartialEq> RegisterAccess<R> for RegisterSpy<R> {
    fn read(&self, register: R) -> u32 {
        let value = self.value(register);
        self.record_read(register, value);
        value
    }

    fn write(&self, register: R, value: u32) {
        self.accesses
            .borrow_mut()
            .push(Access::Write(register, value));
        self.preset(register, value);
    }
}

/// SYSCON model with the PLL feed and lock behaviour.
///
/// PLLCON and PLLCFG writes are held until a 0xAA, 0x55 feed pair on
/// consecutive writes. PLLSTAT reports the latched configuration and sets
/// PLOCK once it has been polled `lock_after` times since the PLL was enabled
/// or reconfigured.
pub(crate) struct SysconModel {
    spy: RegisterSpy<SysconRegister>,
    lock_after: Option<usize>,
    feed_pending: Cell<bool>,
    latched_control: Cell<u32>,
    latched_config: Cell<u32>,
    polls_since_change: Cell<usize>,
}

impl SysconModel {
    pub(crate) fn locking_after(polls: usize) -> Self {
        Self::new(Some(polls))
    }

    pub(crate) fn never_locking() -> Self {
        Self::new(None)
    }

    fn new(lock_after: Option<usize>) -> Self {
        Self {
            spy: RegisterSpy::new(),
            lock_after,
            feed_pending: Cell::new(false),
            latched_control: Cell::new(0),
            latched_config: Cell::new(0),
            polls_since_change: Cell::new(0),
        }
    }

    pub(crate) fn spy(&self) -> &RegisterSpy<SysconRegister> {
        &self.spy
    }

    /// Register file contents plus the latched PLL state, excluding poll
    /// counters.
    pub(crate) fn snapshot(&self) -> (Vec<(SysconRegister, u32)>, u32, u32, bool) {
        (
            self.spy.values(),
            self.latched_control.get(),
            self.latched_config.get(),
            self.locked(),
        )
    }

    fn enabled(&self) -> bool {
        self.latched_control.get() & 0b01 != 0
    }

    fn locked(&self) -> bool {
        match self.lock_after {
            Some(polls) => self.enabled() && self.polls_since_change.get() >= polls,
            None => false,
        }
    }

    fn latch(&self) {
        let control = self.spy.value(SysconRegister::PllControl);
        let config = self.spy.value(SysconRegister::PllConfig);
        let newly_enabled = !self.enabled() && control & 0b01 != 0;
        if newly_enabled || config != self.latched_config.get() {
            self.polls_since_change.set(0);
        }
        self.latched_control.set(control & 0b11);
        self.latched_config.set(config & 0x7F);
    }

    fn pllstat(&self) -> u32 {
        let mut value = self.latched_config.get();
        value |= (self.latched_control.get() & 0b11) << 8;
        if self.locked() {
            value |= 1 << 10;
        }
        value
    }
}

impl RegisterAccess<SysconRegister> for SysconModel {
    fn read(&self, register: SysconRegister) -> u32 {
        match register {
            SysconRegister::PllStatus => {
                self.polls_since_change
                    .set(self.polls_since_change.get() + 1);
                let value = self.pllstat();
                self.spy.record_read(register, value);
                value
            }
            _ => self.spy.read(register),
        }
    }

    fn write(&self, register: SysconRegister, value: u32) {
        self.spy.write(register, value);

        let pending = self.feed_pending.replace(false);
        if register == SysconRegister::PllFeed {
            if value == 0xAA {
                self.feed_pending.set(true);
            } else if value == 0x55 && pending {
                self.latch();
            }
        }
    }
}
