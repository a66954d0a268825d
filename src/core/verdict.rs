// src/core/verdict.rs

//! Score clamping, tiered verdicts and advice lists shared by both pipelines.

use crate::core::knowledge_base::{
    BASELINE_RECOMMENDATIONS, CHECK_HTTPS, CHECK_TRUSTED_DOMAIN, CHECK_VALID_SSL,
    HIGH_RISK_RECOMMENDATIONS, WARNING_IP_ADDRESS, WARNING_MALICIOUS_DOMAIN, WARNING_NO_SSL,
    WARNING_URGENCY_KEYWORDS,
};
use crate::core::models::Verdict;

/// Maps a 0..=100 score to one of three labels using exclusive lower bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreTiers {
    pub high: u8,
    pub elevated: u8,
    pub labels: [Verdict; 3],
}

impl ScoreTiers {
    pub fn verdict(&self, score: u8) -> Verdict {
        let [low, elevated, high] = self.labels;
        if score > self.high {
            high
        } else if score > self.elevated {
            elevated
        } else {
            low
        }
    }
}

pub const TEXT_TIERS: ScoreTiers = ScoreTiers {
    high: 60,
    elevated: 30,
    labels: [Verdict::LowRisk, Verdict::Suspicious, Verdict::HighRisk],
};

pub const URL_TIERS: ScoreTiers = ScoreTiers {
    high: 70,
    elevated: 40,
    labels: [Verdict::Safe, Verdict::Suspicious, Verdict::Dangerous],
};

/// Above this the high-risk cautions lead the recommendation list.
pub const HIGH_RISK_ADVICE_THRESHOLD: u8 = 50;

pub fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// The already-computed URL signals the advice lists are derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UrlSignals {
    pub ssl_valid: bool,
    pub dangerous_host: bool,
    pub trusted_host: bool,
    pub ip_literal_host: bool,
    pub urgency_warning_keyword: bool,
    pub https: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Advice {
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub passed_checks: Vec<String>,
}

pub fn url_advice(signals: &UrlSignals, score: u8) -> Advice {
    let mut warnings = Vec::new();
    if !signals.ssl_valid {
        warnings.push(WARNING_NO_SSL.to_string());
    }
    if signals.dangerous_host {
        warnings.push(WARNING_MALICIOUS_DOMAIN.to_string());
    }
    if signals.ip_literal_host {
        warnings.push(WARNING_IP_ADDRESS.to_string());
    }
    if signals.urgency_warning_keyword {
        warnings.push(WARNING_URGENCY_KEYWORDS.to_string());
    }

    let mut recommendations = Vec::new();
    if score > HIGH_RISK_ADVICE_THRESHOLD {
        recommendations.extend(HIGH_RISK_RECOMMENDATIONS.iter().map(|s| s.to_string()));
    }
    recommendations.extend(BASELINE_RECOMMENDATIONS.iter().map(|s| s.to_string()));

    let mut passed_checks = Vec::new();
    if signals.ssl_valid {
        passed_checks.push(CHECK_VALID_SSL.to_string());
    }
    if signals.trusted_host {
        passed_checks.push(CHECK_TRUSTED_DOMAIN.to_string());
    }
    if signals.https {
        passed_checks.push(CHECK_HTTPS.to_string());
    }

    Advice { warnings, recommendations, passed_checks }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_tier_bounds_are_exclusive() {
        assert_eq!(TEXT_TIERS.verdict(0), Verdict::LowRisk);
        assert_eq!(TEXT_TIERS.verdict(30), Verdict::LowRisk);
        assert_eq!(TEXT_TIERS.verdict(31), Verdict::Suspicious);
        assert_eq!(TEXT_TIERS.verdict(60), Verdict::Suspicious);
        assert_eq!(TEXT_TIERS.verdict(61), Verdict::HighRisk);
    }

    #[test]
    fn url_tier_bounds_are_exclusive() {
        assert_eq!(URL_TIERS.verdict(40), Verdict::Safe);
        assert_eq!(URL_TIERS.verdict(41), Verdict::Suspicious);
        assert_eq!(URL_TIERS.verdict(70), Verdict::Suspicious);
        assert_eq!(URL_TIERS.verdict(71), Verdict::Dangerous);
        assert_eq!(URL_TIERS.verdict(100), Verdict::Dangerous);
    }

    #[test]
    fn clamp_keeps_scores_in_range() {
        assert_eq!(clamp_score(-20), 0);
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(100), 100);
        assert_eq!(clamp_score(190), 100);
    }

    #[test]
    fn warnings_follow_fixed_order() {
        let signals = UrlSignals {
            ssl_valid: false,
            dangerous_host: true,
            ip_literal_host: true,
            urgency_warning_keyword: true,
            ..Default::default()
        };
        let advice = url_advice(&signals, 100);
        assert_eq!(
            advice.warnings,
            vec![
                WARNING_NO_SSL,
                WARNING_MALICIOUS_DOMAIN,
                WARNING_IP_ADDRESS,
                WARNING_URGENCY_KEYWORDS,
            ]
        );
        assert!(advice.passed_checks.is_empty());
    }

    #[test]
    fn high_risk_cautions_only_above_fifty() {
        let signals = UrlSignals::default();
        assert_eq!(url_advice(&signals, 50).recommendations, BASELINE_RECOMMENDATIONS.to_vec());

        let advice = url_advice(&signals, 51);
        assert_eq!(advice.recommendations.len(), 6);
        assert_eq!(advice.recommendations[..3], HIGH_RISK_RECOMMENDATIONS[..]);
        assert_eq!(advice.recommendations[3..], BASELINE_RECOMMENDATIONS[..]);
    }

    #[test]
    fn passed_checks_for_clean_https_site() {
        let signals =
            UrlSignals { ssl_valid: true, trusted_host: true, https: true, ..Default::default() };
        let advice = url_advice(&signals, 0);
        assert!(advice.warnings.is_empty());
        assert_eq!(advice.passed_checks, vec![CHECK_VALID_SSL, CHECK_TRUSTED_DOMAIN, CHECK_HTTPS]);
    }
}
