// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! STM32F4 CRYP accelerator driver
//!
//! Implements [`AesEngine`] directly on the CRYP register interface. The
//! session layer calls `configure` before every data operation, so key and
//! IV registers are reloaded each time; this also restores the encrypt key
//! schedule after a decrypt-key preparation run.
//!
//! # Reference
//! RM0090 Section 23.6 (CRYP registers)
//!
//! # Security
//!
//! - Keys are loaded straight into hardware registers and scrubbed on deinit
//! - DMA and interrupts stay disabled; all transfers go through the CPU

use super::addresses::{CRYP_BASE, RCC_BASE};
use super::registers::{read_reg, write_reg};
use crate::error::{HalError, HalResult};
use crate::traits::{AesEngine, AesKeySize, CipherKind, DataSwap, EngineConfig};

// ============================================================================
// CRYP Peripheral Register Definitions (RM0090 Section 23.6)
// ============================================================================

const CRYP_CR: u32 = CRYP_BASE + 0x00; // Control register
const CRYP_SR: u32 = CRYP_BASE + 0x04; // Status register
const CRYP_DIN: u32 = CRYP_BASE + 0x08; // Data input register
const CRYP_DOUT: u32 = CRYP_BASE + 0x0C; // Data output register
const CRYP_DMACR: u32 = CRYP_BASE + 0x10; // DMA control register
const CRYP_IMSCR: u32 = CRYP_BASE + 0x14; // Interrupt mask set/clear register
const CRYP_K0LR: u32 = CRYP_BASE + 0x20; // Key register 0 left
const CRYP_K0RR: u32 = CRYP_BASE + 0x24; // Key register 0 right
const CRYP_K1LR: u32 = CRYP_BASE + 0x28; // Key register 1 left
const CRYP_K1RR: u32 = CRYP_BASE + 0x2C; // Key register 1 right
const CRYP_K2LR: u32 = CRYP_BASE + 0x30; // Key register 2 left
const CRYP_K2RR: u32 = CRYP_BASE + 0x34; // Key register 2 right
const CRYP_K3LR: u32 = CRYP_BASE + 0x38; // Key register 3 left
const CRYP_K3RR: u32 = CRYP_BASE + 0x3C; // Key register 3 right
const CRYP_IV0LR: u32 = CRYP_BASE + 0x40; // Initialization vector 0 left
const CRYP_IV0RR: u32 = CRYP_BASE + 0x44; // Initialization vector 0 right
const CRYP_IV1LR: u32 = CRYP_BASE + 0x48; // Initialization vector 1 left
const CRYP_IV1RR: u32 = CRYP_BASE + 0x4C; // Initialization vector 1 right

// CRYP_CR bit definitions
const CR_ALGODIR: u32 = 1 << 2; // Algorithm direction: 0=encrypt, 1=decrypt
const CR_ALGOMODE_AES_ECB: u32 = 0x4 << 3;
const CR_ALGOMODE_AES_CBC: u32 = 0x5 << 3;
const CR_ALGOMODE_AES_CTR: u32 = 0x6 << 3;
const CR_ALGOMODE_AES_KEY: u32 = 0x7 << 3; // Key preparation for decryption
const CR_DATATYPE_32B: u32 = 0x0 << 6; // 32-bit data, no swap
const CR_DATATYPE_16B: u32 = 0x1 << 6; // 16-bit data, half-word swap
const CR_DATATYPE_8B: u32 = 0x2 << 6; // 8-bit data, byte swap
const CR_DATATYPE_1B: u32 = 0x3 << 6; // 1-bit data, bit swap
const CR_KEYSIZE_128: u32 = 0x0 << 8;
const CR_KEYSIZE_192: u32 = 0x1 << 8;
const CR_KEYSIZE_256: u32 = 0x2 << 8;
const CR_FFLUSH: u32 = 1 << 14; // FIFO flush
const CR_CRYPEN: u32 = 1 << 15; // Crypto processor enable

// CRYP_SR bit definitions
const SR_IFNF: u32 = 1 << 1; // Input FIFO not full
const SR_OFNE: u32 = 1 << 2; // Output FIFO not empty
const SR_BUSY: u32 = 1 << 4; // Busy flag

// ============================================================================
// RCC gating for the CRYP peripheral
// ============================================================================

const RCC_AHB2RSTR: u32 = RCC_BASE + 0x14; // AHB2 peripheral reset register
const RCC_AHB2ENR: u32 = RCC_BASE + 0x34; // AHB2 peripheral clock enable register
const RCC_AHB2_CRYP: u32 = 1 << 4; // CRYP enable/reset bit

const fn keysize_cr_bits(key_size: AesKeySize) -> u32 {
    match key_size {
        AesKeySize::Aes128 => CR_KEYSIZE_128,
        AesKeySize::Aes192 => CR_KEYSIZE_192,
        AesKeySize::Aes256 => CR_KEYSIZE_256,
    }
}

const fn algomode_cr_bits(kind: CipherKind) -> u32 {
    match kind {
        CipherKind::Ecb => CR_ALGOMODE_AES_ECB,
        CipherKind::Cbc => CR_ALGOMODE_AES_CBC,
        CipherKind::Ctr => CR_ALGOMODE_AES_CTR,
    }
}

const fn datatype_cr_bits(swap: DataSwap) -> u32 {
    match swap {
        DataSwap::None => CR_DATATYPE_32B,
        DataSwap::HalfWord => CR_DATATYPE_16B,
        DataSwap::Byte => CR_DATATYPE_8B,
        DataSwap::Bit => CR_DATATYPE_1B,
    }
}

/// STM32F4 CRYP (Cryptographic Processor) driver
pub struct Stm32f4Cryp {
    /// Initialization state
    initialized: bool,
    /// Configuration captured by the last `configure` call
    current: Option<CurrentConfig>,
    /// Timeout in CPU cycles
    timeout_cycles: u32,
}

struct CurrentConfig {
    key_size: AesKeySize,
    kind: CipherKind,
    datatype: u32,
    /// IV register words, kept so the IV can be reloaded after a
    /// decrypt-key preparation run clobbers the peripheral state
    iv_words: [u32; 4],
}

impl Stm32f4Cryp {
    /// Create a new uninitialized CRYP driver
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initialized: false,
            current: None,
            timeout_cycles: 1_000_000, // ~6ms at 168MHz
        }
    }

    /// Create a driver with a specific wait budget
    #[must_use]
    pub const fn with_timeout(timeout_cycles: u32) -> Self {
        Self {
            initialized: false,
            current: None,
            timeout_cycles,
        }
    }

    /// Check if CRYP is initialized
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Pulse the peripheral reset line
    fn reset_peripheral() {
        // SAFETY: RCC_AHB2RSTR is an architecturally-defined STM32F4 register.
        // Setting then clearing the CRYP bit force-resets the peripheral.
        unsafe {
            let rstr = read_reg(RCC_AHB2RSTR);
            write_reg(RCC_AHB2RSTR, rstr | RCC_AHB2_CRYP);
            write_reg(RCC_AHB2RSTR, rstr & !RCC_AHB2_CRYP);
        }
    }

    /// Flush input and output FIFOs
    fn flush_fifos(&self) {
        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // read-modify-write sets the FFLUSH bit to flush the CRYP FIFOs.
        unsafe {
            let cr = read_reg(CRYP_CR);
            write_reg(CRYP_CR, cr | CR_FFLUSH);
        }
    }

    /// Wait for CRYP to become ready (not busy)
    fn wait_ready(&self) -> HalResult<()> {
        let mut timeout = self.timeout_cycles;

        while timeout > 0 {
            // SAFETY: CRYP_SR is an architecturally-defined read-only status
            // register. Volatile read required to poll hardware busy state.
            let sr = unsafe { read_reg(CRYP_SR) };
            if sr & SR_BUSY == 0 {
                return Ok(());
            }
            timeout -= 1;
            core::hint::spin_loop();
        }

        Err(HalError::Timeout)
    }

    /// Wait for input FIFO to have space
    fn wait_input_ready(&self) -> HalResult<()> {
        let mut timeout = self.timeout_cycles;

        while timeout > 0 {
            // SAFETY: CRYP_SR is an architecturally-defined read-only status
            // register. Volatile read required to poll the IFNF flag.
            let sr = unsafe { read_reg(CRYP_SR) };
            if sr & SR_IFNF != 0 {
                return Ok(());
            }
            timeout -= 1;
            core::hint::spin_loop();
        }

        Err(HalError::Timeout)
    }

    /// Wait for output FIFO to have data
    fn wait_output_ready(&self) -> HalResult<()> {
        let mut timeout = self.timeout_cycles;

        while timeout > 0 {
            // SAFETY: CRYP_SR is an architecturally-defined read-only status
            // register. Volatile read required to poll the OFNE flag.
            let sr = unsafe { read_reg(CRYP_SR) };
            if sr & SR_OFNE != 0 {
                return Ok(());
            }
            timeout -= 1;
            core::hint::spin_loop();
        }

        Err(HalError::Timeout)
    }

    /// Load key registers from word-order key material
    ///
    /// Key register usage depends on key size (RM0090 Table 23.2):
    /// AES-256 fills K0LR..K3RR, AES-192 K1LR..K3RR, AES-128 K2LR..K3RR.
    fn load_key(key: &[u8], key_size: AesKeySize) {
        // Word-order bytes read little-endian equal the big-endian register
        // value of the caller-order key
        let word =
            |i: usize| u32::from_le_bytes([key[i * 4], key[i * 4 + 1], key[i * 4 + 2], key[i * 4 + 3]]);

        // SAFETY: CRYP key registers (K0LR..K3RR) are architecturally-defined
        // MMIO registers. CRYP is disabled while keys are loaded; key length
        // matches the key size by the EngineConfig contract.
        unsafe {
            match key_size {
                AesKeySize::Aes256 => {
                    write_reg(CRYP_K0LR, word(0));
                    write_reg(CRYP_K0RR, word(1));
                    write_reg(CRYP_K1LR, word(2));
                    write_reg(CRYP_K1RR, word(3));
                    write_reg(CRYP_K2LR, word(4));
                    write_reg(CRYP_K2RR, word(5));
                    write_reg(CRYP_K3LR, word(6));
                    write_reg(CRYP_K3RR, word(7));
                }
                AesKeySize::Aes192 => {
                    write_reg(CRYP_K1LR, word(0));
                    write_reg(CRYP_K1RR, word(1));
                    write_reg(CRYP_K2LR, word(2));
                    write_reg(CRYP_K2RR, word(3));
                    write_reg(CRYP_K3LR, word(4));
                    write_reg(CRYP_K3RR, word(5));
                }
                AesKeySize::Aes128 => {
                    write_reg(CRYP_K2LR, word(0));
                    write_reg(CRYP_K2RR, word(1));
                    write_reg(CRYP_K3LR, word(2));
                    write_reg(CRYP_K3RR, word(3));
                }
            }
        }
    }

    /// Load IV registers
    fn load_iv(iv_words: &[u32; 4]) {
        // SAFETY: CRYP IV registers (IV0LR..IV1RR) are architecturally-defined
        // MMIO registers; volatile writes load the initialization vector.
        unsafe {
            write_reg(CRYP_IV0LR, iv_words[0]);
            write_reg(CRYP_IV0RR, iv_words[1]);
            write_reg(CRYP_IV1LR, iv_words[2]);
            write_reg(CRYP_IV1RR, iv_words[3]);
        }
    }

    /// Run the key preparation phase required before ECB/CBC decryption
    fn prepare_decrypt_key(&self, current: &CurrentConfig) -> HalResult<()> {
        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // writes select AES key preparation mode and start the derivation.
        unsafe {
            let cr = keysize_cr_bits(current.key_size) | CR_ALGOMODE_AES_KEY | current.datatype;
            write_reg(CRYP_CR, cr);
            write_reg(CRYP_CR, cr | CR_CRYPEN);
        }

        self.wait_ready()?;

        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // read-modify-write disables the peripheral after key derivation.
        unsafe {
            let cr = read_reg(CRYP_CR);
            write_reg(CRYP_CR, cr & !CR_CRYPEN);
        }

        // Key preparation invalidates the loaded IV
        if current.kind.requires_iv() {
            Self::load_iv(&current.iv_words);
        }

        Ok(())
    }

    /// Write a 16-byte block to the input FIFO
    fn write_block(&self, block: &[u8; 16]) -> HalResult<()> {
        for i in 0..4 {
            self.wait_input_ready()?;
            let word = u32::from_be_bytes([
                block[i * 4],
                block[i * 4 + 1],
                block[i * 4 + 2],
                block[i * 4 + 3],
            ]);
            // SAFETY: CRYP_DIN is an architecturally-defined data input
            // register. Volatile write feeds one word into the input FIFO.
            unsafe {
                write_reg(CRYP_DIN, word);
            }
        }

        Ok(())
    }

    /// Read a 16-byte block from the output FIFO
    fn read_block(&self, block: &mut [u8; 16]) -> HalResult<()> {
        for i in 0..4 {
            self.wait_output_ready()?;
            // SAFETY: CRYP_DOUT is an architecturally-defined data output
            // register. Volatile read drains one word from the output FIFO.
            let word = unsafe { read_reg(CRYP_DOUT) };
            block[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
        }

        Ok(())
    }

    /// Push whole blocks through the FIFOs
    fn process_blocks(&self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
        let mut in_block = [0u8; 16];
        let mut out_block = [0u8; 16];

        for (chunk, out) in input.chunks(16).zip(output.chunks_mut(16)) {
            in_block.fill(0);
            in_block[..chunk.len()].copy_from_slice(chunk);
            self.write_block(&in_block)?;
            self.read_block(&mut out_block)?;
            out.copy_from_slice(&out_block[..out.len()]);
        }

        Ok(())
    }

    /// Run one configure-and-execute pass over the data path
    fn run(&self, input: &[u8], output: &mut [u8], decrypt: bool) -> HalResult<()> {
        let current = self.current.as_ref().ok_or(HalError::InvalidState)?;

        if output.len() < input.len() {
            return Err(HalError::InvalidParameter);
        }
        let partial_ok = matches!(current.kind, CipherKind::Ctr);
        if !partial_ok && input.len() % 16 != 0 {
            return Err(HalError::InvalidParameter);
        }

        // ECB/CBC decryption needs the derived decrypt key schedule
        if decrypt && !matches!(current.kind, CipherKind::Ctr) {
            self.prepare_decrypt_key(current)?;
        }

        let mut cr = keysize_cr_bits(current.key_size)
            | algomode_cr_bits(current.kind)
            | current.datatype;
        if decrypt {
            cr |= CR_ALGODIR;
        }

        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // write configures mode, key size, data type and direction.
        unsafe {
            write_reg(CRYP_CR, cr);
        }

        self.flush_fifos();

        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // write enables the crypto processor for the operation.
        unsafe {
            write_reg(CRYP_CR, cr | CR_CRYPEN);
        }

        let result = self.process_blocks(input, output);

        // SAFETY: CRYP_CR is an architecturally-defined register. Volatile
        // read-modify-write disables the processor on every exit path.
        unsafe {
            let cr = read_reg(CRYP_CR);
            write_reg(CRYP_CR, cr & !CR_CRYPEN);
        }

        result
    }
}

impl Default for Stm32f4Cryp {
    fn default() -> Self {
        Self::new()
    }
}

impl AesEngine for Stm32f4Cryp {
    fn init(&mut self) -> HalResult<()> {
        // SAFETY: RCC_AHB2ENR is an architecturally-defined STM32F4 register.
        // Volatile read-modify-write enables the CRYP peripheral clock.
        unsafe {
            let enr = read_reg(RCC_AHB2ENR);
            write_reg(RCC_AHB2ENR, enr | RCC_AHB2_CRYP);
        }

        // Clock stabilization
        for _ in 0..100 {
            core::hint::spin_loop();
        }

        Self::reset_peripheral();

        // SAFETY: CRYP_CR, CRYP_DMACR, CRYP_IMSCR are architecturally-defined
        // CRYP registers. Volatile writes put the peripheral in a known state
        // with DMA and interrupts off.
        unsafe {
            write_reg(CRYP_CR, 0);
            write_reg(CRYP_DMACR, 0);
            write_reg(CRYP_IMSCR, 0);
        }

        self.flush_fifos();

        self.current = None;
        self.initialized = true;
        Ok(())
    }

    fn deinit(&mut self) -> HalResult<()> {
        // Tolerated before init as a defensive reset: the clock is enabled
        // first so the register scrub below always takes effect
        // SAFETY: RCC_AHB2ENR is an architecturally-defined register.
        unsafe {
            let enr = read_reg(RCC_AHB2ENR);
            write_reg(RCC_AHB2ENR, enr | RCC_AHB2_CRYP);
        }

        // SAFETY: All registers below are architecturally-defined CRYP MMIO
        // registers. Volatile writes disable the peripheral and zeroize
        // key/IV registers so no key material survives teardown.
        unsafe {
            write_reg(CRYP_CR, 0);

            write_reg(CRYP_K0LR, 0);
            write_reg(CRYP_K0RR, 0);
            write_reg(CRYP_K1LR, 0);
            write_reg(CRYP_K1RR, 0);
            write_reg(CRYP_K2LR, 0);
            write_reg(CRYP_K2RR, 0);
            write_reg(CRYP_K3LR, 0);
            write_reg(CRYP_K3RR, 0);

            write_reg(CRYP_IV0LR, 0);
            write_reg(CRYP_IV0RR, 0);
            write_reg(CRYP_IV1LR, 0);
            write_reg(CRYP_IV1RR, 0);
        }

        Self::reset_peripheral();

        // SAFETY: RCC_AHB2ENR is an architecturally-defined register.
        // Volatile read-modify-write gates the CRYP clock off.
        unsafe {
            let enr = read_reg(RCC_AHB2ENR);
            write_reg(RCC_AHB2ENR, enr & !RCC_AHB2_CRYP);
        }

        self.current = None;
        self.initialized = false;
        Ok(())
    }

    fn configure(&mut self, config: &EngineConfig) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }

        // SAFETY: CRYP_CR is an architecturally-defined register. CRYP must
        // be disabled before key registers are modified (RM0090 23.4).
        unsafe {
            let cr = read_reg(CRYP_CR);
            write_reg(CRYP_CR, cr & !CR_CRYPEN);
        }
        self.wait_ready()?;

        let key_len = config.key_size.bytes();
        Self::load_key(&config.key[..key_len], config.key_size);

        let iv = &config.iv;
        let iv_words = [
            u32::from_le_bytes([iv[0], iv[1], iv[2], iv[3]]),
            u32::from_le_bytes([iv[4], iv[5], iv[6], iv[7]]),
            u32::from_le_bytes([iv[8], iv[9], iv[10], iv[11]]),
            u32::from_le_bytes([iv[12], iv[13], iv[14], iv[15]]),
        ];
        if config.kind.requires_iv() {
            Self::load_iv(&iv_words);
        }

        self.current = Some(CurrentConfig {
            key_size: config.key_size,
            kind: config.kind,
            datatype: datatype_cr_bits(config.swap),
            iv_words,
        });
        Ok(())
    }

    fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.run(input, output, false)
    }

    fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
        if !self.initialized {
            return Err(HalError::NotInitialized);
        }
        self.run(input, output, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_size_register_bits() {
        assert_eq!(keysize_cr_bits(AesKeySize::Aes128), 0);
        assert_eq!(keysize_cr_bits(AesKeySize::Aes192), 1 << 8);
        assert_eq!(keysize_cr_bits(AesKeySize::Aes256), 2 << 8);
    }

    #[test]
    fn algomode_register_bits_are_distinct() {
        let modes = [
            algomode_cr_bits(CipherKind::Ecb),
            algomode_cr_bits(CipherKind::Cbc),
            algomode_cr_bits(CipherKind::Ctr),
            CR_ALGOMODE_AES_KEY,
        ];
        for (i, a) in modes.iter().enumerate() {
            for b in &modes[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn byte_swap_selects_8bit_datatype() {
        assert_eq!(datatype_cr_bits(DataSwap::Byte), CR_DATATYPE_8B);
        assert_eq!(datatype_cr_bits(DataSwap::None), CR_DATATYPE_32B);
    }
}
