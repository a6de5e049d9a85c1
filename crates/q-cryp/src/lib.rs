// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel EdgeOS CRYP session manager
//!
//! Session-oriented access to a single AES block-cipher accelerator.
//! Callers bind a [`CipherSession`] with an algorithm, mode, direction and
//! raw key, run block or IV-carrying operations through it, and free it;
//! the device multiplexes a fixed pool of such sessions onto the one
//! engine and brings the hardware up and down with the first and last
//! session.
//!
//! ```no_run
//! use q_cryp::{CipherAlgo, CipherMode, CrypDevice, Direction};
//! use q_hal::soft::SoftAesEngine;
//!
//! # fn main() -> q_common::Result<()> {
//! let device = CrypDevice::new(SoftAesEngine::new());
//! let session = device.begin_session(
//!     CipherAlgo::Aes,
//!     CipherMode::Cbc,
//!     Direction::Encrypt,
//!     &[0u8; 16],
//!     0,
//! )?;
//!
//! let plaintext = [0u8; 32];
//! let iv = [0u8; 16];
//! let mut ciphertext = [0u8; 48];
//! let written = session.iv_op(&plaintext, &iv, &mut ciphertext)?;
//! assert_eq!(written, 48);
//! session.free()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod device;
mod modes;
mod session;
mod words;

pub use device::{CipherSession, CrypDevice};
pub use modes::{CipherAlgo, CipherMode};
pub use q_common::{CrypConfig, Error, ErrorCategory, Result};
pub use q_hal::Direction;
