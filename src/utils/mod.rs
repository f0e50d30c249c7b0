// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 segpipe contributors

//! Utility modules
//!
//! Common utilities for the segpipe CLI.

pub mod colors;

pub use colors::*;
