// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! STM32F4 platform support
//!
//! Register-level driver for the CRYP peripheral found on STM32F4 parts
//! with hardware crypto (F405/407/415/417, F43x).
//!
//! # Reference
//! STM32F4 Reference Manual RM0090, Section 23: Cryptographic processor

pub mod cryp;

pub use cryp::Stm32f4Cryp;

/// Memory-mapped register access utilities
pub(crate) mod registers {
    use core::ptr::{read_volatile, write_volatile};

    /// Read a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn read_reg(addr: u32) -> u32 {
        read_volatile(addr as *const u32)
    }

    /// Write a 32-bit register
    ///
    /// # Safety
    /// The address must be a valid memory-mapped register.
    #[inline]
    pub unsafe fn write_reg(addr: u32, value: u32) {
        write_volatile(addr as *mut u32, value);
    }
}

/// STM32F4 peripheral base addresses
pub mod addresses {
    /// CRYP registers (AHB2)
    pub const CRYP_BASE: u32 = 0x5006_0000;
    /// RCC (Reset and Clock Control) registers
    pub const RCC_BASE: u32 = 0x4002_3800;
}
