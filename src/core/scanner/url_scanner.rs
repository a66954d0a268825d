// src/core/scanner/url_scanner.rs

use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::{Reputation, ReputationList};
use crate::core::error::{EngineError, EngineResult};
use crate::core::knowledge_base::{
    url_rules, UrlRuleKind, LONG_HOST_LEN, MAX_HOST_LABELS, RE_IPV4_LITERAL, URL_SCORING_KEYWORDS,
    URL_WARNING_KEYWORDS,
};
use crate::core::scanner::ssl_scanner::HTTPS_PORT;
use crate::core::verdict::{clamp_score, UrlSignals};

/// The pieces of a URL the rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlComponents {
    pub scheme: String,
    /// Lower-cased host without port or credentials.
    pub host: String,
    pub port: u16,
    /// The URL as supplied, trimmed.
    pub raw: String,
}

impl UrlComponents {
    pub fn is_https(&self) -> bool {
        self.scheme == "https"
    }
}

/// Splits a URL into scheme, host and port.
///
/// Fails with `MalformedUrl` for empty input, unparseable input, or URLs
/// without a host (`mailto:`, `file:///`, bare paths).
pub fn parse_url(raw: &str) -> EngineResult<UrlComponents> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MalformedUrl("empty URL".to_string()));
    }

    let parsed = Url::parse(trimmed).map_err(|e| {
        warn!(url = trimmed, error = %e, "URL could not be parsed.");
        EngineError::MalformedUrl(format!("{}: {}", trimmed, e))
    })?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
        _ => {
            warn!(url = trimmed, "URL has no host component.");
            return Err(EngineError::MalformedUrl(format!("{}: no host component", trimmed)));
        }
    };

    let components = UrlComponents {
        scheme: parsed.scheme().to_string(),
        host,
        port: parsed.port_or_known_default().unwrap_or(HTTPS_PORT),
        raw: trimmed.to_string(),
    };
    debug!(
        scheme = %components.scheme,
        host = %components.host,
        port = components.port,
        "Parsed URL."
    );
    Ok(components)
}

/// Result of the pure rule pass over a parsed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRiskScore {
    pub score: u8,
    pub matched_rules: Vec<String>,
    /// Everything except `ssl_valid`, which only the probe can supply.
    pub signals: UrlSignals,
}

pub fn score_url(components: &UrlComponents, reputation: &ReputationList) -> UrlRiskScore {
    let host = components.host.as_str();
    let lowered_url = components.raw.to_lowercase();
    let standing = reputation.classify(host);
    let ip_literal = RE_IPV4_LITERAL.is_match(host);

    let mut raw_score = 0;
    let mut matched_rules = Vec::new();

    for rule in url_rules() {
        let triggered = match rule.kind {
            UrlRuleKind::DangerousHost => standing == Reputation::Dangerous,
            UrlRuleKind::TrustedHost => standing == Reputation::Trusted,
            UrlRuleKind::IpLiteralHost => ip_literal,
            // Dotted quads are not subdomains.
            UrlRuleKind::DeepSubdomains => !ip_literal && host.split('.').count() > MAX_HOST_LABELS,
            UrlRuleKind::UrgencyKeywords => {
                URL_SCORING_KEYWORDS.iter().any(|k| lowered_url.contains(k))
            }
            UrlRuleKind::InsecureScheme => !components.is_https(),
            UrlRuleKind::LongHyphenatedHost => {
                host.contains(['-', '_']) && host.len() > LONG_HOST_LEN
            }
        };
        if triggered {
            debug!(rule = rule.code, weight = rule.weight, "URL rule triggered.");
            raw_score += rule.weight;
            matched_rules.push(rule.display_name());
        }
    }

    let score = clamp_score(raw_score);
    info!(host, raw_score, score, "URL risk score computed.");

    UrlRiskScore {
        score,
        matched_rules,
        signals: UrlSignals {
            ssl_valid: false,
            dangerous_host: standing == Reputation::Dangerous,
            trusted_host: standing == Reputation::Trusted,
            ip_literal_host: ip_literal,
            urgency_warning_keyword: URL_WARNING_KEYWORDS.iter().any(|k| lowered_url.contains(k)),
            https: components.is_https(),
        },
    }
}
