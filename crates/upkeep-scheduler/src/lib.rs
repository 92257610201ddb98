// SPDX-FileCopyrightText: 2026 Upkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The scheduling engine: validated job creation, status transitions with
//! timestamp side effects, the acknowledgment workflow, and the guarded
//! deletion gate.

pub mod engine;
pub mod gate;

pub use engine::{AcknowledgmentView, MaintenanceEngine};
pub use gate::DeletionGate;
