// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! CRYP device and session lifecycle
//!
//! One [`CrypDevice`] wraps one physical accelerator and multiplexes a
//! fixed pool of sessions onto it. Two independent mutexes guard it:
//!
//! - the **pool lock** covers slot liveness bookkeeping only
//! - the **device lock** covers accelerator configure-and-execute as one
//!   atomic unit
//!
//! Device-locked code never touches the pool, so the only permitted
//! nesting is pool -> device, and only inside the first-session init and
//! last-session deinit transitions. Holding the pool lock across those
//! transitions is what keeps a racing free/begin pair from observing a
//! live session with torn-down hardware.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::modes::{CipherAlgo, CipherMode, CipherOp};
use crate::session::{SessionState, SlotTable};
use crate::words::copy_swap_words;
use q_common::constants::{AES_BLOCK_SIZE, CAPS_SUPPORTED, IV_SIZE, MAX_KEY_SIZE};
use q_common::log::LogBuffer;
use q_common::{log_error, log_info, log_warn};
use q_common::{CrypConfig, Error, Result};
use q_hal::{AesEngine, AesKeySize, Direction};

const LOG_MODULE: &str = "cryp";

/// Absorb mutex poisoning: slot bookkeeping stays consistent because every
/// guarded update is a single claim/release step
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One CRYP accelerator with its session pool
pub struct CrypDevice<E: AesEngine> {
    pool: Mutex<SlotTable>,
    engine: Mutex<E>,
    log: Mutex<LogBuffer>,
    config: CrypConfig,
}

impl<E: AesEngine> CrypDevice<E> {
    /// Wrap an accelerator with the default configuration
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, CrypConfig::DEFAULT)
    }

    /// Wrap an accelerator
    ///
    /// Performs a defensive reset so a warm-booted peripheral starts from a
    /// known state; a reset failure is recorded but does not block
    /// construction, since the first session's init decides for real.
    pub fn with_config(mut engine: E, config: CrypConfig) -> Self {
        let mut log = LogBuffer::new();
        log.set_min_level(config.min_log_level);

        if let Err(e) = engine.deinit() {
            log_warn!(log, LOG_MODULE, "bring-up reset failed: {}", e);
        } else {
            log_info!(log, LOG_MODULE, "device ready");
        }

        Self {
            pool: Mutex::new(SlotTable::new()),
            engine: Mutex::new(engine),
            log: Mutex::new(log),
            config,
        }
    }

    /// Capability flags of the cipher interface
    #[must_use]
    pub const fn query_capabilities(&self) -> u32 {
        CAPS_SUPPORTED
    }

    /// Number of currently bound sessions
    #[must_use]
    pub fn live_sessions(&self) -> usize {
        lock(&self.pool).live()
    }

    /// Snapshot of the device log, oldest first
    #[must_use]
    pub fn log_snapshot(&self) -> Vec<q_common::log::LogRecord> {
        lock(&self.log).iter().cloned().collect()
    }

    /// Bind a new cipher session.
    ///
    /// Validates the request, claims a pool slot, and initializes the
    /// accelerator if this is the first live session. Validation failures
    /// leave no state behind; a failed init releases the claimed slot.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFlags`], [`Error::UnsupportedMode`],
    /// [`Error::InvalidKeySize`] or [`Error::InvalidNonceLength`] for bad
    /// requests, [`Error::NoFreeSession`] when the pool is exhausted, and a
    /// hardware-fault error if first-session init fails.
    pub fn begin_session(
        &self,
        algo: CipherAlgo,
        mode: CipherMode,
        direction: Direction,
        key: &[u8],
        flags: u32,
    ) -> Result<CipherSession<'_, E>> {
        if flags & !CAPS_SUPPORTED != 0 {
            return Err(self.reject(Error::UnsupportedFlags, "unsupported flags"));
        }

        // Only AES exists today; keep the match so a second algorithm
        // cannot be added without deciding what this layer does with it
        match algo {
            CipherAlgo::Aes => {}
        }

        let Some(op) = CipherOp::bind(mode, direction) else {
            return Err(self.reject(Error::UnsupportedMode, "unsupported mode"));
        };

        let Some(key_size) = AesKeySize::from_key_len(key.len()) else {
            return Err(self.reject(Error::InvalidKeySize, "invalid key size"));
        };

        let counter_bits = self.validate_counter_width(mode, key.len())?;

        // Claim a slot, and while the claim is still being committed under
        // the pool lock, bring the hardware up if this is the first session
        let mut pool = lock(&self.pool);
        let Some(index) = pool.claim() else {
            drop(pool);
            return Err(self.reject(Error::NoFreeSession, "session pool exhausted"));
        };
        if pool.live() == 1 {
            let mut engine = lock(&self.engine);
            if let Err(e) = engine.init() {
                pool.unclaim(index);
                drop(engine);
                drop(pool);
                let mut log = lock(&self.log);
                log_error!(log, LOG_MODULE, "accelerator init failed: {}", e);
                return Err(e.into());
            }
        }
        drop(pool);

        let mut key_words = [0u8; MAX_KEY_SIZE];
        copy_swap_words(&mut key_words[..key.len()], key);

        Ok(CipherSession {
            device: self,
            slot: Some(index),
            state: SessionState {
                key: key_words,
                key_len: key.len(),
                key_size,
                op,
                counter_bits,
            },
        })
    }

    /// Resolve and validate the CTR counter width for this key length
    fn validate_counter_width(&self, mode: CipherMode, key_len: usize) -> Result<u16> {
        let CipherMode::Ctr { counter_bits } = mode else {
            return Ok(0);
        };
        let counter_bits = counter_bits.unwrap_or(self.config.default_counter_bits);

        let counter_bytes = usize::from(counter_bits / 8);
        let valid = counter_bits > 0
            && counter_bits % 8 == 0
            && counter_bytes < key_len
            && key_len - counter_bytes <= IV_SIZE;
        if !valid {
            return Err(self.reject(Error::InvalidNonceLength, "invalid counter width"));
        }
        Ok(counter_bits)
    }

    fn reject(&self, error: Error, reason: &str) -> Error {
        let mut log = lock(&self.log);
        log_error!(log, LOG_MODULE, "session setup rejected: {} ({})", reason, error);
        error
    }

    /// Free a slot; the last release tears the hardware down.
    ///
    /// The slot is freed unconditionally: a deinit failure is surfaced but
    /// never leaks the slot.
    fn release_slot(&self, index: usize) -> Result<()> {
        let mut pool = lock(&self.pool);
        let last = pool.release(index);
        if !last {
            return Ok(());
        }

        // Still under the pool lock so a concurrent begin_session cannot
        // claim-and-init while the hardware is being torn down. The device
        // lock keeps the deinit from racing a mid-flight operation.
        let mut engine = lock(&self.engine);
        let result = engine.deinit();
        drop(engine);
        drop(pool);

        result.map_err(|e| {
            let mut log = lock(&self.log);
            log_error!(log, LOG_MODULE, "accelerator deinit failed: {}", e);
            e.into()
        })
    }

    /// Configure and execute one accelerator pass under the device lock
    fn run_engine(
        &self,
        config: &q_hal::EngineConfig,
        direction: Direction,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<()> {
        let mut engine = lock(&self.engine);

        if let Err(e) = engine.configure(config) {
            drop(engine);
            let mut log = lock(&self.log);
            log_error!(log, LOG_MODULE, "accelerator configure failed: {}", e);
            return Err(e.into());
        }

        let result = match direction {
            Direction::Encrypt => engine.encrypt(input, output),
            Direction::Decrypt => engine.decrypt(input, output),
        };
        drop(engine);

        result.map_err(|e| {
            let mut log = lock(&self.log);
            log_error!(log, LOG_MODULE, "accelerator operation failed: {}", e);
            e.into()
        })
    }
}

/// A bound cipher session
///
/// Holds its pool slot until [`CipherSession::free`] or drop. Operations
/// take the device lock only, so sessions on other slots can begin and
/// free concurrently with an in-flight operation.
pub struct CipherSession<'d, E: AesEngine> {
    device: &'d CrypDevice<E>,
    slot: Option<usize>,
    state: SessionState,
}

impl<E: AesEngine> CipherSession<'_, E> {
    /// Single-block operation (ECB sessions).
    ///
    /// Input must be exactly one block; multi-block ECB is rejected rather
    /// than silently processed. Returns the output length, always one
    /// block.
    ///
    /// # Errors
    ///
    /// [`Error::WrongOperation`] for non-ECB sessions,
    /// [`Error::BlockTooLarge`] for oversized input,
    /// [`Error::BufferTooSmall`] for an undersized output buffer, and
    /// hardware-fault errors from the accelerator.
    pub fn block_op(&self, input: &[u8], output: &mut [u8]) -> Result<usize> {
        if !self.state.op.is_block_op() {
            return Err(Error::WrongOperation);
        }
        if input.len() > AES_BLOCK_SIZE {
            return Err(self.device.reject(Error::BlockTooLarge, "multi-block ecb"));
        }
        if input.len() != AES_BLOCK_SIZE {
            return Err(Error::InvalidParameter);
        }
        if output.len() < AES_BLOCK_SIZE {
            return Err(Error::BufferTooSmall);
        }

        let config = self.state.engine_config([0u8; IV_SIZE]);
        self.device.run_engine(
            &config,
            self.state.op.direction(),
            input,
            &mut output[..AES_BLOCK_SIZE],
        )?;
        Ok(AES_BLOCK_SIZE)
    }

    /// IV-carrying operation (CBC and CTR sessions).
    ///
    /// CBC encrypt writes the IV verbatim ahead of the ciphertext, so the
    /// output is one block longer than the input; CBC decrypt reads
    /// ciphertext starting one block into the input and produces one block
    /// less. CTR output length equals input length. Returns the output
    /// length.
    ///
    /// # Errors
    ///
    /// [`Error::WrongOperation`] for ECB sessions, argument errors as for
    /// [`CipherSession::block_op`], and hardware-fault errors from the
    /// accelerator.
    pub fn iv_op(&self, input: &[u8], iv: &[u8], output: &mut [u8]) -> Result<usize> {
        match self.state.op {
            CipherOp::CbcEncrypt => self.cbc_encrypt(input, iv, output),
            CipherOp::CbcDecrypt => self.cbc_decrypt(input, iv, output),
            CipherOp::CtrEncrypt | CipherOp::CtrDecrypt => self.ctr_op(input, iv, output),
            CipherOp::EcbEncrypt | CipherOp::EcbDecrypt => Err(Error::WrongOperation),
        }
    }

    fn cbc_encrypt(&self, input: &[u8], iv: &[u8], output: &mut [u8]) -> Result<usize> {
        if iv.len() != IV_SIZE {
            return Err(Error::InvalidParameter);
        }
        let out_len = input.len() + AES_BLOCK_SIZE;
        if output.len() < out_len {
            return Err(Error::BufferTooSmall);
        }

        let mut iv_words = [0u8; IV_SIZE];
        copy_swap_words(&mut iv_words, iv);
        let config = self.state.engine_config(iv_words);

        self.device.run_engine(
            &config,
            Direction::Encrypt,
            input,
            &mut output[AES_BLOCK_SIZE..out_len],
        )?;
        // Prefix the IV verbatim, caller byte order, once the ciphertext
        // is in place
        output[..AES_BLOCK_SIZE].copy_from_slice(iv);
        Ok(out_len)
    }

    fn cbc_decrypt(&self, input: &[u8], iv: &[u8], output: &mut [u8]) -> Result<usize> {
        if iv.len() != IV_SIZE {
            return Err(Error::InvalidParameter);
        }
        if input.len() < AES_BLOCK_SIZE {
            return Err(Error::InputTooShort);
        }
        let out_len = input.len() - AES_BLOCK_SIZE;
        if output.len() < out_len {
            return Err(Error::BufferTooSmall);
        }

        let mut iv_words = [0u8; IV_SIZE];
        copy_swap_words(&mut iv_words, iv);
        let config = self.state.engine_config(iv_words);

        // Ciphertext starts one block in, matching the encrypt-time prefix
        self.device.run_engine(
            &config,
            Direction::Decrypt,
            &input[AES_BLOCK_SIZE..],
            &mut output[..out_len],
        )?;
        Ok(out_len)
    }

    fn ctr_op(&self, input: &[u8], iv: &[u8], output: &mut [u8]) -> Result<usize> {
        // Counter block: zero seed, nonce in the high-order bytes
        let nonce_len = self.state.key_len - usize::from(self.state.counter_bits / 8);
        if iv.len() < nonce_len {
            return Err(Error::InvalidParameter);
        }
        if output.len() < input.len() {
            return Err(Error::BufferTooSmall);
        }

        let mut counter_block = [0u8; IV_SIZE];
        copy_swap_words(&mut counter_block, &iv[..nonce_len]);
        let config = self.state.engine_config(counter_block);

        self.device.run_engine(
            &config,
            self.state.op.direction(),
            input,
            &mut output[..input.len()],
        )?;
        Ok(input.len())
    }

    /// Release the session explicitly, surfacing teardown errors.
    ///
    /// Dropping the handle releases the slot too, but swallows a failed
    /// hardware teardown.
    ///
    /// # Errors
    ///
    /// A hardware-fault error if this was the last session and the
    /// accelerator deinit failed; the slot is freed either way.
    pub fn free(mut self) -> Result<()> {
        match self.slot.take() {
            Some(index) => self.device.release_slot(index),
            None => Ok(()),
        }
    }
}

impl<E: AesEngine> Drop for CipherSession<'_, E> {
    fn drop(&mut self) {
        if let Some(index) = self.slot.take() {
            let _ = self.device.release_slot(index);
        }
    }
}
