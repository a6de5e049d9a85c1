// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Byte-order transform
//!
//! The accelerator consumes key and IV material with every 32-bit word
//! byte-reversed relative to caller order. The transform is self-inverse:
//! applying it twice restores the original bytes.

/// Copy `src` into `dst`, zero the tail, and reverse every 4-byte word.
///
/// # Panics
///
/// Panics if `dst` is shorter than `src` or its length is not a multiple
/// of 4. Both are programming errors in the caller, never data-dependent.
pub(crate) fn copy_swap_words(dst: &mut [u8], src: &[u8]) {
    assert!(dst.len() >= src.len(), "destination shorter than source");
    assert!(dst.len() % 4 == 0, "destination not a whole number of words");

    dst[..src.len()].copy_from_slice(src);
    dst[src.len()..].fill(0);
    for word in dst.chunks_exact_mut(4) {
        word.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_each_word() {
        let mut dst = [0u8; 8];
        copy_swap_words(&mut dst, &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(dst, [4, 3, 2, 1, 8, 7, 6, 5]);
    }

    #[test]
    fn zero_pads_the_tail() {
        let mut dst = [0xFFu8; 8];
        copy_swap_words(&mut dst, &[1, 2, 3, 4]);
        assert_eq!(dst, [4, 3, 2, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn transform_is_self_inverse() {
        let original: [u8; 16] = core::array::from_fn(|i| i as u8 * 7);
        let mut buf = [0u8; 16];
        copy_swap_words(&mut buf, &original);
        let once = buf;
        let mut twice = [0u8; 16];
        copy_swap_words(&mut twice, &once);
        assert_eq!(twice, original);
    }

    #[test]
    #[should_panic(expected = "destination shorter than source")]
    fn short_destination_fails_fast() {
        let mut dst = [0u8; 4];
        copy_swap_words(&mut dst, &[0u8; 8]);
    }

    #[test]
    #[should_panic(expected = "whole number of words")]
    fn unaligned_destination_fails_fast() {
        let mut dst = [0u8; 6];
        copy_swap_words(&mut dst, &[0u8; 4]);
    }
}
