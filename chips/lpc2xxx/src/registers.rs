// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register access capability.
//!
//! Drivers in this crate never touch memory-mapped registers directly. They
//! hold a reference to something implementing [RegisterAccess] for the
//! register names of their block (for example [crate::syscon::SysconRegister]).
//! On hardware that is the MMIO block at its fixed address; on a host it is a
//! recorder that checks the order of accesses.

/// Typed 32-bit access to the registers of one peripheral block.
///
/// `R` names the registers of the block. Writes to read-only registers and
/// reads of write-only registers are implementation defined; the MMIO
/// implementations ignore the write and read back `0` respectively.
pub trait RegisterAccess<R: Copy> {
    /// Read the current value of `register`.
    fn read(&self, register: R) -> u32;

    /// Write `value` to `register`.
    fn write(&self, register: R, value: u32);
}
