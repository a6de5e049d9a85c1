// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! HAL error types

use core::fmt;

/// HAL error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Hardware not initialized
    NotInitialized,
    /// Hardware initialization failed
    InitFailed,
    /// Hardware deinitialization failed
    DeinitFailed,
    /// Accelerator configuration rejected
    ConfigFailed,
    /// Encrypt/decrypt processing failed
    ProcessingFailed,
    /// Invalid parameter
    InvalidParameter,
    /// Operation timeout
    Timeout,
    /// Hardware busy
    Busy,
    /// Operation not supported
    NotSupported,
    /// Invalid state for operation
    InvalidState,
    /// Hardware fault detected
    HardwareFault,
}

impl HalError {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::NotInitialized => 0x0801,
            Self::InitFailed => 0x0802,
            Self::DeinitFailed => 0x0803,
            Self::ConfigFailed => 0x0804,
            Self::ProcessingFailed => 0x0805,
            Self::HardwareFault => 0x08D0,
            Self::InvalidParameter => 0x08F0,
            Self::Timeout => 0x08F1,
            Self::Busy => 0x08F2,
            Self::InvalidState => 0x08F3,
            Self::NotSupported => 0x08FF,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::InitFailed => "initialization failed",
            Self::DeinitFailed => "deinitialization failed",
            Self::ConfigFailed => "configuration rejected",
            Self::ProcessingFailed => "processing failed",
            Self::HardwareFault => "hardware fault detected",
            Self::InvalidParameter => "invalid parameter",
            Self::Timeout => "timeout",
            Self::Busy => "busy",
            Self::InvalidState => "invalid state for operation",
            Self::NotSupported => "not supported",
        }
    }
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

impl From<HalError> for q_common::Error {
    fn from(e: HalError) -> Self {
        match e {
            HalError::NotInitialized | HalError::InitFailed => Self::HardwareInitFailed,
            HalError::DeinitFailed => Self::HardwareDeinitFailed,
            HalError::ConfigFailed | HalError::NotSupported => Self::HardwareConfigFailed,
            HalError::ProcessingFailed | HalError::InvalidState | HalError::HardwareFault => {
                Self::HardwareOperationFailed
            }
            HalError::InvalidParameter => Self::InvalidParameter,
            HalError::Timeout => Self::HardwareTimeout,
            HalError::Busy => Self::HardwareBusy,
        }
    }
}

/// HAL Result type
pub type HalResult<T> = Result<T, HalError>;
