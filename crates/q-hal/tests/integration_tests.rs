// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Integration tests for the CRYP accelerator HAL

use q_hal::error::{HalError, HalResult};
use q_hal::soft::SoftAesEngine;
use q_hal::traits::{AesEngine, AesKeySize, CipherKind, DataSwap, EngineConfig};

fn all_hal_errors() -> Vec<HalError> {
    vec![
        HalError::NotInitialized,
        HalError::InitFailed,
        HalError::DeinitFailed,
        HalError::ConfigFailed,
        HalError::ProcessingFailed,
        HalError::InvalidParameter,
        HalError::Timeout,
        HalError::Busy,
        HalError::NotSupported,
        HalError::InvalidState,
        HalError::HardwareFault,
    ]
}

mod error_tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn error_codes_are_unique() {
        let codes: HashSet<u16> = all_hal_errors().iter().map(HalError::code).collect();
        assert_eq!(codes.len(), all_hal_errors().len());
    }

    #[test]
    fn error_codes_are_in_hal_range() {
        for e in all_hal_errors() {
            assert_eq!(e.code() & 0xFF00, 0x0800, "{e:?} outside 0x08xx");
        }
    }

    #[test]
    fn display_format() {
        let s = format!("{}", HalError::Timeout);
        assert_eq!(s, "[0x08F1] timeout");
    }

    #[test]
    fn conversion_to_common_error_preserves_category() {
        use q_common::{Error, ErrorCategory};

        for e in all_hal_errors() {
            let common: Error = e.into();
            if e == HalError::InvalidParameter {
                assert_eq!(common.category(), ErrorCategory::InvalidArgument);
            } else {
                assert_eq!(common.category(), ErrorCategory::HardwareFault);
            }
        }
    }

    #[test]
    fn init_failures_map_to_init_fault() {
        assert_eq!(
            q_common::Error::from(HalError::NotInitialized),
            q_common::Error::HardwareInitFailed
        );
        assert_eq!(
            q_common::Error::from(HalError::InitFailed),
            q_common::Error::HardwareInitFailed
        );
        assert_eq!(
            q_common::Error::from(HalError::DeinitFailed),
            q_common::Error::HardwareDeinitFailed
        );
    }
}

mod mock_engine_tests {
    use super::*;

    /// Minimal engine that records the call sequence
    struct MockEngine {
        calls: Vec<&'static str>,
        fail_init: bool,
    }

    impl MockEngine {
        fn new() -> Self {
            Self {
                calls: Vec::new(),
                fail_init: false,
            }
        }
    }

    impl AesEngine for MockEngine {
        fn init(&mut self) -> HalResult<()> {
            self.calls.push("init");
            if self.fail_init {
                return Err(HalError::InitFailed);
            }
            Ok(())
        }

        fn deinit(&mut self) -> HalResult<()> {
            self.calls.push("deinit");
            Ok(())
        }

        fn configure(&mut self, _config: &EngineConfig) -> HalResult<()> {
            self.calls.push("configure");
            Ok(())
        }

        fn encrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
            self.calls.push("encrypt");
            output[..input.len()].copy_from_slice(input);
            Ok(())
        }

        fn decrypt(&mut self, input: &[u8], output: &mut [u8]) -> HalResult<()> {
            self.calls.push("decrypt");
            output[..input.len()].copy_from_slice(input);
            Ok(())
        }
    }

    fn drive(engine: &mut dyn AesEngine) -> HalResult<()> {
        engine.init()?;
        let cfg = EngineConfig::new([0u8; 32], AesKeySize::Aes128, CipherKind::Ecb);
        engine.configure(&cfg)?;
        let mut out = [0u8; 16];
        engine.encrypt(&[1u8; 16], &mut out)?;
        engine.deinit()
    }

    #[test]
    fn engine_is_object_safe_and_drivable() {
        let mut engine = MockEngine::new();
        drive(&mut engine).unwrap();
        assert_eq!(engine.calls, vec!["init", "configure", "encrypt", "deinit"]);
    }

    #[test]
    fn errors_propagate_through_question_mark() {
        let mut engine = MockEngine::new();
        engine.fail_init = true;
        assert_eq!(drive(&mut engine), Err(HalError::InitFailed));
        assert_eq!(engine.calls, vec!["init"]);
    }
}

mod soft_engine_tests {
    use super::*;

    fn swap_words(buf: &mut [u8]) {
        for word in buf.chunks_exact_mut(4) {
            word.reverse();
        }
    }

    fn word_order_config(key: &[u8], kind: CipherKind, iv: &[u8; 16]) -> EngineConfig {
        let key_size = AesKeySize::from_key_len(key.len()).unwrap();
        let mut key_buf = [0u8; 32];
        key_buf[..key.len()].copy_from_slice(key);
        swap_words(&mut key_buf[..key.len()]);
        let mut cfg = EngineConfig::new(key_buf, key_size, kind);
        cfg.iv = *iv;
        swap_words(&mut cfg.iv);
        cfg
    }

    #[test]
    fn round_trip_all_key_sizes() {
        let plaintext = [0x5Au8; 48];
        let iv = [7u8; 16];

        for key_len in [16usize, 24, 32] {
            let key: Vec<u8> = (0..key_len as u8).collect();
            let mut engine = SoftAesEngine::new();
            engine.init().unwrap();

            engine
                .configure(&word_order_config(&key, CipherKind::Cbc, &iv))
                .unwrap();
            let mut ciphertext = [0u8; 48];
            engine.encrypt(&plaintext, &mut ciphertext).unwrap();
            assert_ne!(ciphertext, plaintext);

            engine
                .configure(&word_order_config(&key, CipherKind::Cbc, &iv))
                .unwrap();
            let mut recovered = [0u8; 48];
            engine.decrypt(&ciphertext, &mut recovered).unwrap();
            assert_eq!(recovered, plaintext, "key_len {key_len}");
        }
    }

    #[test]
    fn byte_swap_and_plain_configs_agree() {
        // The same logical key delivered with and without the byte-swap
        // data type must produce identical ciphertext
        let key = [0x13u8; 16];
        let plaintext = [0xC3u8; 16];

        let mut swapped = SoftAesEngine::new();
        swapped.init().unwrap();
        swapped
            .configure(&word_order_config(&key, CipherKind::Ecb, &[0u8; 16]))
            .unwrap();
        let mut ct_swapped = [0u8; 16];
        swapped.encrypt(&plaintext, &mut ct_swapped).unwrap();

        let mut plain = SoftAesEngine::new();
        plain.init().unwrap();
        let mut key_buf = [0u8; 32];
        key_buf[..16].copy_from_slice(&key);
        let mut cfg = EngineConfig::new(key_buf, AesKeySize::Aes128, CipherKind::Ecb);
        cfg.swap = DataSwap::None;
        plain.configure(&cfg).unwrap();
        let mut ct_plain = [0u8; 16];
        plain.encrypt(&plaintext, &mut ct_plain).unwrap();

        assert_eq!(ct_swapped, ct_plain);
    }

    #[test]
    fn unsupported_swap_units_are_rejected() {
        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();
        let mut cfg = EngineConfig::new([0u8; 32], AesKeySize::Aes128, CipherKind::Ecb);
        cfg.swap = DataSwap::HalfWord;
        assert_eq!(engine.configure(&cfg), Err(HalError::NotSupported));
    }

    #[test]
    fn ctr_keystream_depends_on_counter_seed() {
        let key = [0x44u8; 16];
        let plaintext = [0u8; 32];

        let mut engine = SoftAesEngine::new();
        engine.init().unwrap();

        engine
            .configure(&word_order_config(&key, CipherKind::Ctr, &[1u8; 16]))
            .unwrap();
        let mut ct_a = [0u8; 32];
        engine.encrypt(&plaintext, &mut ct_a).unwrap();

        engine
            .configure(&word_order_config(&key, CipherKind::Ctr, &[2u8; 16]))
            .unwrap();
        let mut ct_b = [0u8; 32];
        engine.encrypt(&plaintext, &mut ct_b).unwrap();

        assert_ne!(ct_a, ct_b);
    }
}
