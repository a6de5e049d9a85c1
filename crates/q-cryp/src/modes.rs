// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Cipher mode selection and operation dispatch
//!
//! A session resolves its (mode, direction) pair into a [`CipherOp`] once
//! at setup; every later call dispatches on that enum instead of a stored
//! callable.

use q_hal::{CipherKind, Direction};

/// Requested cipher algorithm
///
/// Only AES exists; the variant keeps the request type explicit at call
/// sites and leaves room for other block ciphers without an API break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgo {
    /// AES block cipher
    Aes,
}

/// Requested cipher mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// Electronic Codebook: one block at a time
    Ecb,
    /// Cipher Block Chaining
    Cbc,
    /// Counter mode; `counter_bits` selects the counter width, `None`
    /// uses the device default
    Ctr {
        /// Counter width in bits, low-order portion of the counter block
        counter_bits: Option<u16>,
    },
    /// Counter with CBC-MAC (not offered, see [`CipherOp::bind`])
    Ccm,
    /// Galois/Counter Mode (not offered, see [`CipherOp::bind`])
    Gcm,
}

impl CipherMode {
    /// Counter mode with the device-default counter width
    #[must_use]
    pub const fn ctr() -> Self {
        Self::Ctr { counter_bits: None }
    }
}

/// Operation a session is bound to, resolved once at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CipherOp {
    EcbEncrypt,
    EcbDecrypt,
    CbcEncrypt,
    CbcDecrypt,
    CtrEncrypt,
    CtrDecrypt,
}

impl CipherOp {
    /// Resolve (mode, direction) into a bound operation.
    ///
    /// The authenticated modes are deliberately withheld: the accelerator's
    /// software-assisted padding for partial final blocks produces an
    /// incorrect authentication tag for non-block-aligned input, so offering
    /// them would silently return wrong results.
    pub(crate) fn bind(mode: CipherMode, direction: Direction) -> Option<Self> {
        match (mode, direction) {
            (CipherMode::Ecb, Direction::Encrypt) => Some(Self::EcbEncrypt),
            (CipherMode::Ecb, Direction::Decrypt) => Some(Self::EcbDecrypt),
            (CipherMode::Cbc, Direction::Encrypt) => Some(Self::CbcEncrypt),
            (CipherMode::Cbc, Direction::Decrypt) => Some(Self::CbcDecrypt),
            (CipherMode::Ctr { .. }, Direction::Encrypt) => Some(Self::CtrEncrypt),
            (CipherMode::Ctr { .. }, Direction::Decrypt) => Some(Self::CtrDecrypt),
            (CipherMode::Ccm | CipherMode::Gcm, _) => None,
        }
    }

    /// Chaining kind the engine is programmed with
    pub(crate) const fn kind(&self) -> CipherKind {
        match self {
            Self::EcbEncrypt | Self::EcbDecrypt => CipherKind::Ecb,
            Self::CbcEncrypt | Self::CbcDecrypt => CipherKind::Cbc,
            Self::CtrEncrypt | Self::CtrDecrypt => CipherKind::Ctr,
        }
    }

    /// Data-path direction
    pub(crate) const fn direction(&self) -> Direction {
        match self {
            Self::EcbEncrypt | Self::CbcEncrypt | Self::CtrEncrypt => Direction::Encrypt,
            Self::EcbDecrypt | Self::CbcDecrypt | Self::CtrDecrypt => Direction::Decrypt,
        }
    }

    /// Check if this is the single-block (ECB) entry point
    pub(crate) const fn is_block_op(&self) -> bool {
        matches!(self, Self::EcbEncrypt | Self::EcbDecrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_pair_binds() {
        for direction in [Direction::Encrypt, Direction::Decrypt] {
            for mode in [CipherMode::Ecb, CipherMode::Cbc, CipherMode::ctr()] {
                let op = CipherOp::bind(mode, direction).unwrap();
                assert_eq!(op.direction(), direction);
            }
        }
    }

    #[test]
    fn authenticated_modes_never_bind() {
        for direction in [Direction::Encrypt, Direction::Decrypt] {
            assert!(CipherOp::bind(CipherMode::Ccm, direction).is_none());
            assert!(CipherOp::bind(CipherMode::Gcm, direction).is_none());
        }
    }

    #[test]
    fn bound_op_keeps_its_kind() {
        let op = CipherOp::bind(CipherMode::Cbc, Direction::Decrypt).unwrap();
        assert_eq!(op.kind(), CipherKind::Cbc);
        assert!(!op.is_block_op());
        assert!(CipherOp::bind(CipherMode::Ecb, Direction::Encrypt)
            .unwrap()
            .is_block_op());
    }
}
