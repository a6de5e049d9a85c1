// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Device configuration for the CRYP subsystem
//!
//! Configuration is fixed at device construction; there is no runtime
//! reconfiguration path.

use crate::log::LogLevel;

/// Configuration for one CRYP device instance
///
/// Covers what the session layer itself consumes. Accelerator wait budgets
/// belong to the engine (e.g. `Stm32f4Cryp::with_timeout`), which the
/// caller constructs before handing it to the device.
#[derive(Debug, Clone, Copy)]
pub struct CrypConfig {
    /// Minimum level recorded in the device log buffer
    pub min_log_level: LogLevel,
    /// Counter width in bits for CTR sessions that do not specify one
    pub default_counter_bits: u16,
}

impl CrypConfig {
    /// Default configuration
    pub const DEFAULT: Self = Self {
        min_log_level: LogLevel::Info,
        default_counter_bits: 32,
    };

    /// Create a configuration with a specific log filter
    #[must_use]
    pub const fn with_log_level(min_log_level: LogLevel) -> Self {
        Self {
            min_log_level,
            ..Self::DEFAULT
        }
    }
}

impl Default for CrypConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_counter_width_is_32_bits() {
        assert_eq!(CrypConfig::DEFAULT.default_counter_bits, 32);
    }

    #[test]
    fn with_log_level_keeps_other_defaults() {
        let cfg = CrypConfig::with_log_level(LogLevel::Debug);
        assert_eq!(cfg.min_log_level, LogLevel::Debug);
        assert_eq!(cfg.default_counter_bits, 32);
    }
}
