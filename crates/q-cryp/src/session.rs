// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Session slot bookkeeping and per-session state
//!
//! The slot table only tracks liveness; once a slot is claimed, the session
//! state (key material, bound operation) is owned by the caller's handle.
//! The table lives behind the device's pool mutex and is never touched from
//! device-locked code.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::modes::CipherOp;
use q_common::constants::{MAX_KEY_SIZE, MAX_SESSIONS};
use q_hal::{AesKeySize, EngineConfig};

/// Liveness table for the fixed session pool
pub(crate) struct SlotTable {
    in_use: [bool; MAX_SESSIONS],
    live: usize,
}

impl SlotTable {
    pub(crate) const fn new() -> Self {
        Self {
            in_use: [false; MAX_SESSIONS],
            live: 0,
        }
    }

    /// Claim the first free slot, scanning in fixed order
    pub(crate) fn claim(&mut self) -> Option<usize> {
        let index = self.in_use.iter().position(|used| !used)?;
        self.in_use[index] = true;
        self.live += 1;
        Some(index)
    }

    /// Roll back a claim that could not be completed
    pub(crate) fn unclaim(&mut self, index: usize) {
        debug_assert!(self.in_use[index]);
        self.in_use[index] = false;
        self.live -= 1;
    }

    /// Release a bound slot; returns true if no session remains live
    pub(crate) fn release(&mut self, index: usize) -> bool {
        debug_assert!(self.in_use[index]);
        self.in_use[index] = false;
        self.live -= 1;
        self.live == 0
    }

    /// Number of live sessions
    pub(crate) const fn live(&self) -> usize {
        self.live
    }
}

/// State bound to one session at setup time
///
/// The key is stored in accelerator word order and scrubbed when the
/// session handle drops.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct SessionState {
    /// Key material, word order, zero-padded
    pub(crate) key: [u8; MAX_KEY_SIZE],
    /// Caller key length in bytes
    pub(crate) key_len: usize,
    #[zeroize(skip)]
    pub(crate) key_size: AesKeySize,
    /// Operation resolved from (mode, direction) at setup
    #[zeroize(skip)]
    pub(crate) op: CipherOp,
    /// CTR counter width in bits; unused for other modes
    #[zeroize(skip)]
    pub(crate) counter_bits: u16,
}

impl SessionState {
    /// Build the engine configuration for the next operation
    pub(crate) fn engine_config(&self, iv_words: [u8; 16]) -> EngineConfig {
        let mut config = EngineConfig::new(self.key, self.key_size, self.op.kind());
        config.iv = iv_words;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_scan_in_fixed_order() {
        let mut table = SlotTable::new();
        assert_eq!(table.claim(), Some(0));
        assert_eq!(table.claim(), Some(1));
        table.release(0);
        assert_eq!(table.claim(), Some(0));
    }

    #[test]
    fn exhausted_table_returns_none() {
        let mut table = SlotTable::new();
        for _ in 0..MAX_SESSIONS {
            assert!(table.claim().is_some());
        }
        assert_eq!(table.claim(), None);
        table.release(2);
        assert_eq!(table.claim(), Some(2));
    }

    #[test]
    fn release_reports_last_session() {
        let mut table = SlotTable::new();
        let a = table.claim().unwrap();
        let b = table.claim().unwrap();
        assert!(!table.release(a));
        assert!(table.release(b));
        assert_eq!(table.live(), 0);
    }

    #[test]
    fn unclaim_matches_failed_setup() {
        let mut table = SlotTable::new();
        let index = table.claim().unwrap();
        assert_eq!(table.live(), 1);
        table.unclaim(index);
        assert_eq!(table.live(), 0);
        assert_eq!(table.claim(), Some(index));
    }
}
