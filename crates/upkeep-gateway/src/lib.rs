// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API surface for the Upkeep maintenance scheduling engine.
//!
//! Thin handlers over the engine and views; all domain policy lives below
//! this crate.

pub mod error;
pub mod handlers;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, build_router, start_server};
