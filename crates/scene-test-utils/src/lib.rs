//! Shared test utilities for the scene-repair workspace.
//!
//! This crate provides standardised test fixtures to eliminate
//! duplication across crate test suites. It is a dev-dependency only —
//! never published.

pub mod scene;

pub use scene::{SceneFile, record, record_with_entities};
