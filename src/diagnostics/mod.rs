//! Structured diagnostics for link runs.
//!
//! Provides deterministic, sortable diagnostic types for skip reasons and errors.

pub mod link_diagnostics;

pub use link_diagnostics::{DiagnosticStage, LinkDiagnostic, SkipReason};
