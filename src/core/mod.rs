//! Core primitives shared across the engine.

pub mod uri;
