// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Software AES engine
//!
//! Simulation backend implementing [`AesEngine`] without hardware: the AES
//! core comes from the RustCrypto `aes` crate, with chaining, counter
//! advance and the word-order data path modeled here so the engine behaves
//! like the register-level backend. Used on `Platform::Soft` and for host
//! testing.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use zeroize::Zeroize;

use crate::error::{HalError, HalResult};
use crate::traits::{AesEngine, AesKeySize, CipherKind, DataSwap, EngineConfig};
use q_common::constants::AES_BLOCK_SIZE;

enum BlockCipher {
    Aes128(Aes128),
    Aes192(Aes192),
    Aes256(Aes256),
}

impl BlockCipher {
    fn new(key: &[u8], key_size: AesKeySize) -> HalResult<Self> {
        let cipher = match key_size {
            AesKeySize::Aes128 => {
                Self::Aes128(Aes128::new_from_slice(key).map_err(|_| HalError::ConfigFailed)?)
            }
            AesKeySize::Aes192 => {
                Self::Aes192(Aes192::new_from_slice(key).map_err(|_| HalError::ConfigFailed)?)
            }
            AesKeySize::Aes256 => {
                Self::Aes256(Aes256::new_from_slice(key).map_err(|_| HalError::ConfigFailed)?)
            }
        };
        Ok(cipher)
    }

    fn encrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.encrypt_block(block),
            Self::Aes192(c) => c.encrypt_block(block),
            Self::Aes256(c) => c.encrypt_block(block),
        }
    }

    fn decrypt_block(&self, block: &mut [u8; AES_BLOCK_SIZE]) {
        let block = GenericArray::from_mut_slice(block);
        match self {
            Self::Aes128(c) => c.decrypt_block(block),
            Self::Aes192(c) => c.decrypt_block(block),
            Self::Aes256(c) => c.decrypt_block(block),
        }
    }
}

struct EngineState {
    cipher: BlockCipher,
    kind: CipherKind,
    /// IV/counter block restored to logical byte order
    iv: [u8; AES_BLOCK_SIZE],
}

/// Software AES engine
pub struct SoftAesEngine {
    initialized: bool,
    state: Option<EngineState>,
}

impl SoftAesEngine {
    /// Create an engine in the uninitialized state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initialized: false,
            state: None,
        }
    }

    /// Check if the engine has been initialized
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn state(&self) -> HalResult<&EngineState> {
        self.state.as_ref().ok_or(HalError::InvalidState)
    }

    fn check_data(kind: CipherKind, input: &[u8], output: &[u8]) -> HalResult<()> {
        if output.len() < input.len() {
            return Err(HalError::InvalidParameter);
        }
        // The hardware FIFO consumes whole blocks; only CTR pads internally
        if !matches!(kind, CipherKind::Ctr) && input.len() % AES_BLOCK_SIZE != 0 {
            return Err(HalError::InvalidParameter);
        }
        Ok(())
    }

    fn ctr_xcrypt(state: &EngineState, input: &[u8], output: &mut [u8]) {
        let mut counter = state.iv;
        for (chunk, out) in input
            .chunks(AES_BLOCK_SIZE)
            .zip(output.chunks_mut(AES_BLOCK_SIZE))
        {
            let mut keystream = counter;
            state.cipher.encrypt_block(&mut keystream);
            for (o, (i, k)) in out.iter_mut().zip(chunk.iter().zip(keystream.iter())) {
                *o = i ^ k;
            }
            increment_counter(&mut counter);
        }
    }
}

impl Default for SoftAesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AesEngine for SoftAesEngine {
    fn init(&mut self) -> HalResult<()> {
        self.state = None;
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> HalResult<()> {
        // Tolerated before init: used as a defensive reset at bring-up
        self.state = None;
        self.initialized = false;
        Ok(())
    }

    fn configure(&mut self, config: &EngineConfig) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }

        // Restore logical byte order from the word-order material
        let mut key = [0u8; q_common::constants::MAX_KEY_SIZE];
        let key_len = config.key_size.bytes();
        key[..key_len].copy_from_slice(&config.key[..key_len]);
        unswap(&mut key[..key_len], config.swap)?;

        let mut iv = config.iv;
        unswap(&mut iv, config.swap)?;

        let cipher = BlockCipher::new(&key[..key_len], config.key_size);
        key.zeroize();
        let cipher = cipher?;

        self.state = Some(EngineState {
            cipher,
            kind: config.kind,
            iv,
        });
        Ok(())
    }

    fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
        let state = self.state()?;
        Self::check_data(state.kind, input, output)?;

        match state.kind {
            CipherKind::Ecb => {
                for (chunk, out) in input
                    .chunks_exact(AES_BLOCK_SIZE)
                    .zip(output.chunks_exact_mut(AES_BLOCK_SIZE))
                {
                    let mut block = [0u8; AES_BLOCK_SIZE];
                    block.copy_from_slice(chunk);
                    state.cipher.encrypt_block(&mut block);
                    out.copy_from_slice(&block);
                }
            }
            CipherKind::Cbc => {
                let mut prev = state.iv;
                for (chunk, out) in input
                    .chunks_exact(AES_BLOCK_SIZE)
                    .zip(output.chunks_exact_mut(AES_BLOCK_SIZE))
                {
                    let mut block = [0u8; AES_BLOCK_SIZE];
                    for (b, (i, p)) in block.iter_mut().zip(chunk.iter().zip(prev.iter())) {
                        *b = i ^ p;
                    }
                    state.cipher.encrypt_block(&mut block);
                    out.copy_from_slice(&block);
                    prev = block;
                }
            }
            CipherKind::Ctr => Self::ctr_xcrypt(state, input, output),
        }
        Ok(())
    }

    fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
        let state = self.state()?;
        Self::check_data(state.kind, input, output)?;

        match state.kind {
            CipherKind::Ecb => {
                for (chunk, out) in input
                    .chunks_exact(AES_BLOCK_SIZE)
                    .zip(output.chunks_exact_mut(AES_BLOCK_SIZE))
                {
                    let mut block = [0u8; AES_BLOCK_SIZE];
                    block.copy_from_slice(chunk);
                    state.cipher.decrypt_block(&mut block);
                    out.copy_from_slice(&block);
                }
            }
            CipherKind::Cbc => {
                let mut prev = state.iv;
                for (chunk, out) in input
                    .chunks_exact(AES_BLOCK_SIZE)
                    .zip(output.chunks_exact_mut(AES_BLOCK_SIZE))
                {
                    let mut block = [0u8; AES_BLOCK_SIZE];
                    block.copy_from_slice(chunk);
                    state.cipher.decrypt_block(&mut block);
                    for (b, p) in block.iter_mut().zip(prev.iter()) {
                        *b ^= p;
                    }
                    out.copy_from_slice(&block);
                    prev.copy_from_slice(chunk);
                }
            }
            // CTR decryption is the same keystream XOR
            CipherKind::Ctr => Self::ctr_xcrypt(state, input, output),
        }
        Ok(())
    }
}

/// Undo the configured data-path swap in place
fn unswap(buf: &mut [u8], swap: DataSwap) -> HalResult<()> {
    match swap {
        DataSwap::None => Ok(()),
        DataSwap::Byte => {
            for word in buf.chunks_exact_mut(4) {
                word.reverse();
            }
            Ok(())
        }
        // Half-word and bit swaps are not used by the session layer
        DataSwap::HalfWord | DataSwap::Bit => Err(HalError::NotSupported),
    }
}

/// Big-endian increment of the 128-bit counter block
fn increment_counter(counter: &mut [u8; AES_BLOCK_SIZE]) {
    for byte in counter.iter_mut().rev() {
        let (value, carry) = byte.overflowing_add(1);
        *byte = value;
        if !carry {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use q_common::constants::MAX_KEY_SIZE;

    fn swap_words(buf: &mut [u8]) {
        for word in buf.chunks_exact_mut(4) {
            word.reverse();
        }
    }

    fn config(key: &[u8], kind: CipherKind, iv: [u8; AES_BLOCK_SIZE]) -> EngineConfig {
        let key_size = AesKeySize::from_key_len(key.len()).unwrap();
        let mut key_words = [0u8; MAX_KEY_SIZE];
        key_words[..key.len()].copy_from_slice(key);
        swap_words(&mut key_words[..key.len()]);
        let mut iv_words = iv;
        swap_words(&mut iv_words);
        let mut cfg = EngineConfig::new(key_words, key_size, kind);
        cfg.iv = iv_words;
        cfg
    }

    #[test]
    fn configure_before_init_is_rejected() {
        let mut engine = SoftAesEngine::new();
        let cfg = config(&[0u8; 16], CipherKind::Ecb, [0u8; 16]);
        assert_eq!(engine.configure(&cfg), Err(HalError::NotInitialized));
    }

    #[test]
    fn data_before_configure_is_rejected() {
        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            engine.encrypt(&[0u8; 16], &mut out),
            Err(HalError::InvalidState)
        );
    }

    #[test]
    fn ecb_rejects_unaligned_input() {
        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        engine
            .configure(&config(&[0u8; 16], CipherKind::Ecb, [0u8; 16]))
            .unwrap();
        let mut out = [0u8; 16];
        assert_eq!(
            engine.encrypt(&[0u8; 7], &mut out),
            Err(HalError::InvalidParameter)
        );
    }

    #[test]
    fn fips197_ecb_known_answer() {
        // FIPS-197 Appendix C.1
        let key: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let plaintext: [u8; 16] = [
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd,
            0xee, 0xff,
        ];
        let expected: [u8; 16] = [
            0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4,
            0xc5, 0x5a,
        ];

        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        engine
            .configure(&config(&key, CipherKind::Ecb, [0u8; 16]))
            .unwrap();

        let mut ciphertext = [0u8; 16];
        engine.encrypt(&plaintext, &mut ciphertext).unwrap();
        assert_eq!(ciphertext, expected);

        let mut recovered = [0u8; 16];
        engine.decrypt(&ciphertext, &mut recovered).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn sp800_38a_cbc_known_answer() {
        // NIST SP 800-38A F.2.1, first block
        let key: [u8; 16] = [
            0x2b, 0x7e, 0x15, 0x16, 0x28, 0xae, 0xd2, 0xa6, 0xab, 0xf7, 0x15, 0x88, 0x09, 0xcf,
            0x4f, 0x3c,
        ];
        let iv: [u8; 16] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d,
            0x0e, 0x0f,
        ];
        let plaintext: [u8; 16] = [
            0x6b, 0xc1, 0xbe, 0xe2, 0x2e, 0x40, 0x9f, 0x96, 0xe9, 0x3d, 0x7e, 0x11, 0x73, 0x93,
            0x17, 0x2a,
        ];
        let expected: [u8; 16] = [
            0x76, 0x49, 0xab, 0xac, 0x81, 0x19, 0xb2, 0x46, 0xce, 0xe9, 0x8e, 0x9b, 0x12, 0xe9,
            0x19, 0x7d,
        ];

        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        engine.configure(&config(&key, CipherKind::Cbc, iv)).unwrap();

        let mut ciphertext = [0u8; 16];
        engine.encrypt(&plaintext, &mut ciphertext).unwrap();
        assert_eq!(ciphertext, expected);

        let mut recovered = [0u8; 16];
        engine.decrypt(&ciphertext, &mut recovered).unwrap();
        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ctr_handles_partial_final_block() {
        let key = [0x42u8; 32];
        let iv = [0x01u8; 16];
        let plaintext: [u8; 21] = *b"stream mode, 21 bytes";

        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        engine.configure(&config(&key, CipherKind::Ctr, iv)).unwrap();
        let mut ciphertext = [0u8; 21];
        engine.encrypt(&plaintext, &mut ciphertext).unwrap();
        assert_ne!(&ciphertext[..], &plaintext[..]);

        engine.configure(&config(&key, CipherKind::Ctr, iv)).unwrap();
        let mut recovered = [0u8; 21];
        engine.decrypt(&ciphertext, &mut recovered).unwrap();
        assert_eq!(&recovered[..], &plaintext[..]);
    }

    #[test]
    fn counter_increment_carries() {
        let mut ctr = [0xFFu8; 16];
        increment_counter(&mut ctr);
        assert_eq!(ctr, [0u8; 16]);

        let mut ctr = [0u8; 16];
        ctr[15] = 0xFF;
        increment_counter(&mut ctr);
        assert_eq!(ctr[15], 0x00);
        assert_eq!(ctr[14], 0x01);
    }

    #[test]
    fn deinit_resets_configuration() {
        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        engine
            .configure(&config(&[0u8; 16], CipherKind::Ecb, [0u8; 16]))
            .unwrap();
        engine.deinit().unwrap();
        assert!(!engine.is_initialized());
        let mut out = [0u8; 16];
        assert_eq!(
            engine.encrypt(&[0u8; 16], &mut out),
            Err(HalError::InvalidState)
        );
    }
}
