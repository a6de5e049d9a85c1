// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Constants for the CRYP subsystem
//!
//! Sizes are in bytes unless stated otherwise.

// ============================================================================
// Cipher geometry
// ============================================================================

/// AES block size
pub const AES_BLOCK_SIZE: usize = 16;

/// AES block size in 32-bit words
pub const AES_BLOCK_WORDS: usize = 4;

/// AES-128 key size
pub const AES128_KEY_SIZE: usize = 16;

/// AES-192 key size
pub const AES192_KEY_SIZE: usize = 24;

/// AES-256 key size
pub const AES256_KEY_SIZE: usize = 32;

/// Largest supported key size
pub const MAX_KEY_SIZE: usize = AES256_KEY_SIZE;

/// IV / counter block size
pub const IV_SIZE: usize = AES_BLOCK_SIZE;

// ============================================================================
// Session pool
// ============================================================================

/// Number of cipher sessions the pool multiplexes onto one accelerator
pub const MAX_SESSIONS: usize = 4;

// ============================================================================
// Capability flags
// ============================================================================
// Full bitmask vocabulary of the cipher interface. Only RAW_KEY,
// SEPARATE_IO_BUFS and SYNC_OPS are implemented; the rest exist so
// validation can name what it rejects.

/// Keys are referenced by opaque handle (not supported)
pub const CAP_OPAQUE_KEY_HANDLE: u32 = 1 << 0;

/// Keys are passed as raw byte strings
pub const CAP_RAW_KEY: u32 = 1 << 1;

/// Keys are installed through a dedicated loading call (not supported)
pub const CAP_KEY_LOADING_API: u32 = 1 << 2;

/// Input and output may share one buffer (not supported)
pub const CAP_INPLACE_OPS: u32 = 1 << 3;

/// Input and output use separate buffers
pub const CAP_SEPARATE_IO_BUFS: u32 = 1 << 4;

/// Operations complete synchronously before returning
pub const CAP_SYNC_OPS: u32 = 1 << 5;

/// Operations complete via callback (not supported)
pub const CAP_ASYNC_OPS: u32 = 1 << 6;

/// Capability set the accelerator actually provides
pub const CAPS_SUPPORTED: u32 = CAP_RAW_KEY | CAP_SEPARATE_IO_BUFS | CAP_SYNC_OPS;
