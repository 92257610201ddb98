// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for the external collaborators of the scheduling core.

pub mod directory;

pub use directory::{PropertyRegistry, StaffDirectory};
