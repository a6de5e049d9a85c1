// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Qbitel EdgeOS CRYP Common Library
//!
//! Shared error definitions, constants, configuration and logging for the
//! CRYP accelerator subsystem.
//!
//! # Features
//!
//! - `std`: Enable standard library support (disabled by default for embedded)
//! - `defmt`: Enable defmt logging support for embedded debugging
//!
//! # Security
//!
//! No heap allocations are performed; all buffers are fixed-size or heapless
//! collections. Key material never passes through this crate.

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod config;
pub mod constants;
pub mod errors;
pub mod log;

// Re-export commonly used items
pub use config::CrypConfig;
pub use errors::{Error, ErrorCategory, Result};
