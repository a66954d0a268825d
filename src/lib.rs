//! Heuristic phishing and scam assessment for URLs and for text recognized in images.

pub mod core;
pub mod logging;
pub mod runtime;

pub use crate::core::config::{EngineConfig, ReputationList};
pub use crate::core::error::{EngineError, EngineResult};
pub use crate::core::models::{
    AnalysisInput, ImageScanResponse, RiskAssessment, TextScanResponse, UrlScanResponse, Verdict,
};
pub use crate::core::scanner::ThreatEngine;
