// src/core/scanner/text_scanner.rs

use tracing::{debug, info};

use crate::core::error::{EngineError, EngineResult};
use crate::core::knowledge_base::suspicion_rules;
use crate::core::models::RiskAssessment;
use crate::core::verdict::{clamp_score, TEXT_TIERS};

/// Scores free-form text against the fixed suspicion categories.
///
/// Every matching category adds its weight and is reported by display name,
/// in rule order. No advice lists are produced for text.
pub fn analyze_text(text: &str) -> RiskAssessment {
    let lowered = text.to_lowercase();
    info!(chars = lowered.chars().count(), "Starting text analysis.");

    let mut raw_score = 0;
    let mut matched_categories = Vec::new();

    for rule in suspicion_rules() {
        if rule.pattern.is_match(&lowered) {
            debug!(category = rule.code, weight = rule.weight, "Suspicion rule matched.");
            raw_score += rule.weight;
            matched_categories.push(rule.display_name());
        }
    }

    let risk_score = clamp_score(raw_score);
    let verdict = TEXT_TIERS.verdict(risk_score);
    info!(
        score = risk_score,
        %verdict,
        findings = matched_categories.len(),
        "Text analysis finished."
    );

    RiskAssessment {
        risk_score,
        verdict,
        matched_categories,
        warnings: Vec::new(),
        recommendations: Vec::new(),
        passed_checks: Vec::new(),
    }
}

/// Same as [`analyze_text`] for raw bytes, which must be valid UTF-8.
pub fn analyze_bytes(bytes: &[u8]) -> EngineResult<RiskAssessment> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| EngineError::InvalidInput(format!("text is not valid UTF-8: {}", e)))?;
    Ok(analyze_text(text))
}
