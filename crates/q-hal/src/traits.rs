// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! AES accelerator abstraction
//!
//! [`AesEngine`] is the contract between the session layer and a physical
//! (or simulated) AES block-cipher accelerator. All calls are synchronous
//! and block until the engine finishes or times out; the caller provides
//! mutual exclusion.
//!
//! Key and IV material in an [`EngineConfig`] is always in accelerator word
//! order: every 4-byte word is byte-reversed relative to the caller's byte
//! order, and the configured [`DataSwap`] tells the engine how to undo the
//! swap on its data path.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::HalResult;
use q_common::constants::{AES_BLOCK_SIZE, MAX_KEY_SIZE};

/// AES key size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AesKeySize {
    /// 128-bit key (16 bytes)
    Aes128,
    /// 192-bit key (24 bytes)
    Aes192,
    /// 256-bit key (32 bytes)
    Aes256,
}

impl AesKeySize {
    /// Get key size in bytes
    #[must_use]
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes192 => 24,
            Self::Aes256 => 32,
        }
    }

    /// Map a key length in bytes to a key size code
    #[must_use]
    pub const fn from_key_len(len: usize) -> Option<Self> {
        match len {
            16 => Some(Self::Aes128),
            24 => Some(Self::Aes192),
            32 => Some(Self::Aes256),
            _ => None,
        }
    }
}

/// Block-cipher chaining the engine is programmed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherKind {
    /// Electronic Codebook mode
    Ecb,
    /// Cipher Block Chaining mode
    Cbc,
    /// Counter mode
    Ctr,
}

impl CipherKind {
    /// Check if the kind consumes the configured IV/counter block
    #[must_use]
    pub const fn requires_iv(&self) -> bool {
        !matches!(self, Self::Ecb)
    }
}

/// Cipher direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Encryption
    Encrypt,
    /// Decryption
    Decrypt,
}

/// Data-path swap unit, matching the accelerator DATATYPE field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSwap {
    /// 32-bit data, no swap
    None,
    /// 16-bit data, half-word swap
    HalfWord,
    /// 8-bit data, byte swap
    Byte,
    /// 1-bit data, bit swap
    Bit,
}

/// One complete accelerator configuration
///
/// Programmed atomically before each operation. Key and IV are in
/// accelerator word order; only the first `key_size.bytes()` bytes of `key`
/// are meaningful. The IV field is ignored for ECB.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EngineConfig {
    /// Key material, word order, zero-padded to the maximum key size
    pub key: [u8; MAX_KEY_SIZE],
    /// Key size code
    #[zeroize(skip)]
    pub key_size: AesKeySize,
    /// Chaining mode
    #[zeroize(skip)]
    pub kind: CipherKind,
    /// Data-path swap unit
    #[zeroize(skip)]
    pub swap: DataSwap,
    /// IV or counter block, word order
    pub iv: [u8; AES_BLOCK_SIZE],
}

impl EngineConfig {
    /// Create a configuration with a zero IV
    #[must_use]
    pub const fn new(key: [u8; MAX_KEY_SIZE], key_size: AesKeySize, kind: CipherKind) -> Self {
        Self {
            key,
            key_size,
            kind,
            swap: DataSwap::Byte,
            iv: [0u8; AES_BLOCK_SIZE],
        }
    }
}

impl core::fmt::Debug for EngineConfig {
    // Key and IV stay out of debug output
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("key_size", &self.key_size)
            .field("kind", &self.kind)
            .field("swap", &self.swap)
            .finish_non_exhaustive()
    }
}

/// Synchronous AES block-cipher accelerator
///
/// Implementations must tolerate `deinit` before the first `init` (used as
/// a defensive reset at bring-up) and repeated `init` calls.
pub trait AesEngine {
    /// Bring the accelerator to a known ready state
    fn init(&mut self) -> HalResult<()>;

    /// Shut the accelerator down and scrub loaded key material
    fn deinit(&mut self) -> HalResult<()>;

    /// Program key, mode, swap unit and IV for the next operation
    fn configure(&mut self, config: &EngineConfig) -> HalResult<()>;

    /// Encrypt `input` into `output[..input.len()]`
    ///
    /// ECB and CBC require block-aligned input; CTR accepts any length.
    fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()>;

    /// Decrypt `input` into `output[..input.len()]`
    ///
    /// Same alignment rules as [`AesEngine::encrypt`].
    fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_size_bytes() {
        assert_eq!(AesKeySize::Aes128.bytes(), 16);
        assert_eq!(AesKeySize::Aes192.bytes(), 24);
        assert_eq!(AesKeySize::Aes256.bytes(), 32);
    }

    #[test]
    fn key_len_mapping_rejects_odd_lengths() {
        assert_eq!(AesKeySize::from_key_len(16), Some(AesKeySize::Aes128));
        assert_eq!(AesKeySize::from_key_len(24), Some(AesKeySize::Aes192));
        assert_eq!(AesKeySize::from_key_len(32), Some(AesKeySize::Aes256));
        assert_eq!(AesKeySize::from_key_len(20), None);
        assert_eq!(AesKeySize::from_key_len(0), None);
    }

    #[test]
    fn only_ecb_runs_without_iv() {
        assert!(!CipherKind::Ecb.requires_iv());
        assert!(CipherKind::Cbc.requires_iv());
        assert!(CipherKind::Ctr.requires_iv());
    }

    #[test]
    fn config_zeroizes_key_material() {
        let mut cfg = EngineConfig::new([0xAA; MAX_KEY_SIZE], AesKeySize::Aes256, CipherKind::Cbc);
        cfg.iv = [0xBB; AES_BLOCK_SIZE];
        cfg.zeroize();
        assert_eq!(cfg.key, [0u8; MAX_KEY_SIZE]);
        assert_eq!(cfg.iv, [0u8; AES_BLOCK_SIZE]);
    }
}
