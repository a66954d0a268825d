// src/core/mod.rs

// Root of the assessment engine. Nothing in here holds mutable state: every
// call builds its own result from read-only configuration.

/// Input, verdict and response types shared by both pipelines.
pub mod models;

/// The engine's error taxonomy.
pub mod error;

/// Reputation lists and probe timeout.
pub mod config;

/// Static rule tables and every user-facing message.
pub mod knowledge_base;

/// Score clamping, verdict tiers and advice generation.
pub mod verdict;

/// The text, URL, TLS and image analyzers plus the `ThreatEngine` that wires them.
pub mod scanner;
