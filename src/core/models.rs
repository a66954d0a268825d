// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

// --- Input ---

/// A single piece of content submitted for assessment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisInput {
    /// Free-form text, typically the output of OCR.
    RawText(String),
    /// A URL exactly as the user supplied it.
    TargetUrl(String),
}

// --- Verdicts ---

// Every tier label either pipeline can produce. The text pipeline uses
// LowRisk/Suspicious/HighRisk, the URL pipeline Safe/Suspicious/Dangerous,
// and Error is reserved for URLs that could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
pub enum Verdict {
    #[serde(rename = "Low Risk")]
    #[strum(serialize = "Low Risk")]
    LowRisk,
    Suspicious,
    #[serde(rename = "High Risk")]
    #[strum(serialize = "High Risk")]
    HighRisk,
    Safe,
    Dangerous,
    Error,
}

// --- Core Assessment ---

/// The structured result of one analyzer run.
///
/// Built fresh for each call and never mutated once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub verdict: Verdict,
    pub matched_categories: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub passed_checks: Vec<String>,
}

// --- TLS Probe Models ---

// Summary of the peer certificate presented during a successful handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInfo {
    pub subject_name: String,
    pub issuer_name: String,
    pub not_after: DateTime<Utc>,
    pub days_until_expiry: i64,
}

// Outcome of a single handshake-only TLS probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslProbeResult {
    pub valid: bool,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub certificate: Option<CertificateInfo>,
}

impl SslProbeResult {
    pub const NOT_HTTPS: &'static str = "Not HTTPS";
    pub const VERIFIED: &'static str = "Valid SSL certificate";
    pub const FAILED: &'static str = "SSL verification failed";

    pub fn not_https() -> Self {
        Self { valid: false, reason: Self::NOT_HTTPS.to_string(), certificate: None }
    }

    pub fn verified(certificate: Option<CertificateInfo>) -> Self {
        Self { valid: true, reason: Self::VERIFIED.to_string(), certificate }
    }

    pub fn failed() -> Self {
        Self { valid: false, reason: Self::FAILED.to_string(), certificate: None }
    }
}

// --- Domain Age ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
pub enum DomainAge {
    #[serde(rename = "10+ years")]
    #[strum(serialize = "10+ years")]
    Established,
    #[serde(rename = "< 1 month")]
    #[strum(serialize = "< 1 month")]
    Fresh,
    Unknown,
}

// --- URL Scan Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalDetails {
    #[serde(rename = "hasSSL")]
    pub has_ssl: bool,
    #[serde(rename = "sslReason")]
    pub ssl_reason: String,
    pub domain_age: DomainAge,
    pub response_time: String,
    pub server_location: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub certificate: Option<CertificateInfo>,
}

/// Successful output of a URL scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlScanReport {
    pub success: bool,
    pub url: String,
    pub domain: String,
    pub risk_score: u8,
    pub verdict: Verdict,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
    pub checks: Vec<String>,
    pub technical_details: TechnicalDetails,
    pub scan_timestamp: DateTime<Utc>,
}

/// Output of a URL scan that could not even be parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlScanFailure {
    pub success: bool,
    pub error: String,
    pub url: String,
    pub risk_score: u8,
    pub verdict: Verdict,
}

impl UrlScanFailure {
    pub fn new(url: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            url: url.to_string(),
            risk_score: 100,
            verdict: Verdict::Error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UrlScanResponse {
    Scanned(UrlScanReport),
    Failed(UrlScanFailure),
}

impl UrlScanResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, UrlScanResponse::Scanned(_))
    }

    pub fn risk_score(&self) -> u8 {
        match self {
            UrlScanResponse::Scanned(report) => report.risk_score,
            UrlScanResponse::Failed(failure) => failure.risk_score,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            UrlScanResponse::Scanned(report) => report.verdict,
            UrlScanResponse::Failed(failure) => failure.verdict,
        }
    }
}

// --- Image Scan Responses ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageScanReport {
    pub success: bool,
    pub extracted_text: String,
    pub confidence: f64,
    /// Wall time spent decoding, extracting and analyzing, in milliseconds.
    pub processing_time: u64,
    pub image_format: String,
    pub image_dimensions: String,
    pub analysis: RiskAssessment,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageScanFailure {
    pub success: bool,
    pub error: String,
    pub extracted_text: String,
    pub confidence: f64,
}

impl ImageScanFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into(), extracted_text: String::new(), confidence: 0.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageScanResponse {
    Processed(ImageScanReport),
    Failed(ImageScanFailure),
}

impl ImageScanResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ImageScanResponse::Processed(_))
    }
}

// --- Text Scan Responses ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextScanFailure {
    pub success: bool,
    pub error: String,
}

impl TextScanFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self { success: false, error: error.into() }
    }
}

/// Result of analyzing raw text bytes. A successful analysis serializes as the
/// bare [`RiskAssessment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextScanResponse {
    Analyzed(RiskAssessment),
    Failed(TextScanFailure),
}

impl TextScanResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, TextScanResponse::Analyzed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_labels_render_with_spaces() {
        assert_eq!(Verdict::LowRisk.to_string(), "Low Risk");
        assert_eq!(Verdict::HighRisk.as_ref(), "High Risk");
        assert_eq!(serde_json::to_string(&Verdict::Dangerous).unwrap(), "\"Dangerous\"");
        assert_eq!(serde_json::to_string(&Verdict::HighRisk).unwrap(), "\"High Risk\"");
    }

    #[test]
    fn domain_age_labels() {
        assert_eq!(DomainAge::Established.to_string(), "10+ years");
        assert_eq!(DomainAge::Fresh.to_string(), "< 1 month");
        assert_eq!(serde_json::to_string(&DomainAge::Unknown).unwrap(), "\"Unknown\"");
    }

    #[test]
    fn url_failure_serializes_error_shape() {
        let response =
            UrlScanResponse::Failed(UrlScanFailure::new("", "URL scan failed: empty URL"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["riskScore"], 100);
        assert_eq!(json["verdict"], "Error");
        assert_eq!(json["url"], "");
    }

    #[test]
    fn image_failure_has_empty_text_and_zero_confidence() {
        let failure = ImageScanResponse::Failed(ImageScanFailure::new("bad"));
        let json = serde_json::to_value(failure).unwrap();
        assert_eq!(json["extractedText"], "");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["success"], false);
    }

    #[test]
    fn text_failure_serializes_without_assessment_fields() {
        let failure = TextScanResponse::Failed(TextScanFailure::new("bad"));
        let json = serde_json::to_value(failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "bad");
        assert!(json.get("riskScore").is_none());
    }
}
