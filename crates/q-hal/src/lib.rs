// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Accelerator HAL for the Qbitel EdgeOS CRYP subsystem
//!
//! This crate defines the [`AesEngine`] contract the session layer drives,
//! plus the available backends:
//!
//! - **soft** (default): software model of the accelerator for simulation
//!   and host testing
//! - **stm32f4**: register-level driver for the STM32F4 CRYP peripheral
//!
//! # Security
//!
//! - Key material in engine configurations is zeroized
//! - The register backend scrubs key/IV registers on deinit

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod traits;

#[cfg(feature = "soft")]
pub mod soft;

#[cfg(feature = "stm32f4")]
pub mod stm32f4;

// Re-export main types
pub use error::{HalError, HalResult};
pub use traits::*;

#[cfg(feature = "soft")]
pub use soft::SoftAesEngine;

/// Platform identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// STM32F4 (Cortex-M4)
    Stm32F4,
    /// Software simulation
    Soft,
}

impl Platform {
    /// Get the current platform
    #[must_use]
    pub const fn current() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(feature = "stm32f4")] {
                Self::Stm32F4
            } else {
                Self::Soft
            }
        }
    }

    /// Check if the platform drives real hardware
    #[must_use]
    pub const fn is_hardware(&self) -> bool {
        matches!(self, Self::Stm32F4)
    }
}
