// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Error types for the CRYP subsystem
//!
//! Every error carries a stable numeric code for diagnostics and field
//! reporting. Code ranges:
//!
//! - `0x01xx`: session setup and argument validation
//! - `0x02xx`: cipher operation errors
//! - `0x08xx`: hardware accelerator faults

use core::fmt;

/// Broad error classification, matching how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is malformed or unsupported; retrying the same
    /// call will fail the same way.
    InvalidArgument,
    /// A fixed-capacity resource is exhausted; retrying after a release
    /// may succeed.
    ResourceExhausted,
    /// The accelerator failed; the caller decides whether to retry.
    HardwareFault,
}

/// Unified error type for the CRYP subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Requested capability flags are not supported
    UnsupportedFlags,
    /// Requested algorithm is not AES
    UnsupportedAlgorithm,
    /// Requested cipher mode is not available
    UnsupportedMode,
    /// Key length is not 16, 24 or 32 bytes
    InvalidKeySize,
    /// CTR nonce length derived from key and counter width exceeds a block
    InvalidNonceLength,
    /// Invalid parameter
    InvalidParameter,
    /// No free session slot
    NoFreeSession,
    /// ECB input exceeds a single block
    BlockTooLarge,
    /// Output buffer is too small for the result
    BufferTooSmall,
    /// Input is shorter than the mode requires
    InputTooShort,
    /// Operation does not match the mode the session was bound with
    WrongOperation,
    /// Accelerator initialization failed
    HardwareInitFailed,
    /// Accelerator configuration failed
    HardwareConfigFailed,
    /// Accelerator encrypt/decrypt failed
    HardwareOperationFailed,
    /// Accelerator deinitialization failed
    HardwareDeinitFailed,
    /// Accelerator did not complete within the configured timeout
    HardwareTimeout,
    /// Accelerator is busy
    HardwareBusy,
}

impl Error {
    /// Get error code
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::UnsupportedFlags => 0x0101,
            Self::UnsupportedAlgorithm => 0x0102,
            Self::UnsupportedMode => 0x0103,
            Self::InvalidKeySize => 0x0104,
            Self::InvalidNonceLength => 0x0105,
            Self::NoFreeSession => 0x0110,
            Self::InvalidParameter => 0x0120,
            Self::BlockTooLarge => 0x0201,
            Self::BufferTooSmall => 0x0202,
            Self::InputTooShort => 0x0203,
            Self::WrongOperation => 0x0204,
            Self::HardwareInitFailed => 0x0801,
            Self::HardwareConfigFailed => 0x0802,
            Self::HardwareOperationFailed => 0x0803,
            Self::HardwareDeinitFailed => 0x0804,
            Self::HardwareTimeout => 0x0805,
            Self::HardwareBusy => 0x0806,
        }
    }

    /// Get error description
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::UnsupportedFlags => "unsupported capability flags",
            Self::UnsupportedAlgorithm => "unsupported algorithm",
            Self::UnsupportedMode => "unsupported cipher mode",
            Self::InvalidKeySize => "invalid key size",
            Self::InvalidNonceLength => "nonce length exceeds block size",
            Self::InvalidParameter => "invalid parameter",
            Self::NoFreeSession => "no free session slot",
            Self::BlockTooLarge => "input exceeds a single block",
            Self::BufferTooSmall => "output buffer too small",
            Self::InputTooShort => "input shorter than mode requires",
            Self::WrongOperation => "operation does not match session mode",
            Self::HardwareInitFailed => "accelerator initialization failed",
            Self::HardwareConfigFailed => "accelerator configuration failed",
            Self::HardwareOperationFailed => "accelerator operation failed",
            Self::HardwareDeinitFailed => "accelerator deinitialization failed",
            Self::HardwareTimeout => "accelerator timeout",
            Self::HardwareBusy => "accelerator busy",
        }
    }

    /// Classify the error into the caller-facing taxonomy.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NoFreeSession => ErrorCategory::ResourceExhausted,
            Self::HardwareInitFailed
            | Self::HardwareConfigFailed
            | Self::HardwareOperationFailed
            | Self::HardwareDeinitFailed
            | Self::HardwareTimeout
            | Self::HardwareBusy => ErrorCategory::HardwareFault,
            _ => ErrorCategory::InvalidArgument,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:04X}] {}", self.code(), self.description())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, fmt: defmt::Formatter<'_>) {
        defmt::write!(fmt, "[0x{:04X}] {}", self.code(), self.description());
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type for the CRYP subsystem
pub type Result<T> = core::result::Result<T, Error>;
