// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! The error codes returned by the LPC2xxx clock and watchdog drivers.

/// Standard errors for this chip crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// The requested frequency can't be reached with a multiplier in 1..=32,
    /// or the PLL scaler carries the invalid marker
    OutOfRange,
    /// The PLL did not report lock within the allowed number of polls
    LockTimeout,
    /// A configuration value is outside what the hardware supports
    InvalidConfig,
    /// The clocks were already brought up
    AlreadyConfigured,
}

impl From<ErrorCode> for usize {
    fn from(original: ErrorCode) -> usize {
        match original {
            ErrorCode::OutOfRange => 1,
            ErrorCode::LockTimeout => 2,
            ErrorCode::InvalidConfig => 3,
            ErrorCode::AlreadyConfigured => 4,
        }
    }
}
