// src/core/scanner/mod.rs

// Public interface of the `scanner` module: the individual analyzers plus the
// `ThreatEngine` that wires them to their collaborators.
pub mod domain_age;
pub mod image_scanner;
pub mod ssl_scanner;
pub mod text_scanner;
pub mod url_scanner;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::core::config::EngineConfig;
use crate::core::error::{EngineError, EngineResult};
use crate::core::models::{
    AnalysisInput, DomainAge, ImageScanFailure, ImageScanReport, ImageScanResponse,
    RiskAssessment, SslProbeResult, TechnicalDetails, TextScanFailure, TextScanResponse,
    UrlScanFailure, UrlScanReport, UrlScanResponse,
};
use crate::core::verdict::{url_advice, URL_TIERS};

use self::domain_age::{DomainAgeLookup, ReputationAgeLookup};
use self::image_scanner::{decode_image, SampleTextExtractor, TextExtractor};
use self::ssl_scanner::{probe_ssl, NativeTlsProbe, TlsProbe};
use self::text_scanner::{analyze_bytes, analyze_text};
use self::url_scanner::{parse_url, score_url, UrlComponents};

const SERVER_LOCATION_UNKNOWN: &str = "Unknown";

// Everything the URL pipeline learned about one URL.
struct UrlAnalysis {
    components: UrlComponents,
    assessment: RiskAssessment,
    ssl: SslProbeResult,
    domain_age: DomainAge,
    probe_elapsed: Duration,
}

/// Entry point for every assessment.
///
/// Holds only read-only configuration and stateless collaborators, so a single
/// engine can be cloned freely and shared across concurrent requests.
#[derive(Clone)]
pub struct ThreatEngine {
    config: Arc<EngineConfig>,
    tls_probe: Arc<dyn TlsProbe>,
    age_lookup: Arc<dyn DomainAgeLookup>,
    extractor: Arc<dyn TextExtractor>,
}

impl ThreatEngine {
    /// Engine with the production collaborators: native TLS probing, the
    /// reputation-based age estimate and the sample-text OCR stand-in.
    pub fn new(config: EngineConfig) -> Self {
        let age_lookup = Arc::new(ReputationAgeLookup::new(config.reputation.clone()));
        Self {
            config: Arc::new(config),
            tls_probe: Arc::new(NativeTlsProbe),
            age_lookup,
            extractor: Arc::new(SampleTextExtractor),
        }
    }

    pub fn with_tls_probe(mut self, probe: Arc<dyn TlsProbe>) -> Self {
        self.tls_probe = probe;
        self
    }

    pub fn with_age_lookup(mut self, lookup: Arc<dyn DomainAgeLookup>) -> Self {
        self.age_lookup = lookup;
        self
    }

    pub fn with_text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Routes an input to the matching analyzer.
    pub async fn assess(&self, input: AnalysisInput) -> EngineResult<RiskAssessment> {
        match input {
            AnalysisInput::RawText(text) => Ok(analyze_text(&text)),
            AnalysisInput::TargetUrl(url) => {
                self.analyze_url(&url).await.map(|analysis| analysis.assessment)
            }
        }
    }

    /// Scans a URL. Never fails: unparseable URLs come back as a failure
    /// response with a score of 100 and an `Error` verdict.
    #[instrument(skip(self))]
    pub async fn scan_url(&self, url: &str) -> UrlScanResponse {
        match self.analyze_url(url).await {
            Ok(analysis) => UrlScanResponse::Scanned(build_url_report(analysis)),
            Err(e) => {
                error!(error = %e, "URL scan failed.");
                UrlScanResponse::Failed(UrlScanFailure::new(url, format!("URL scan failed: {}", e)))
            }
        }
    }

    /// Analyzes text that arrived as raw bytes. Never fails: bytes that are not
    /// UTF-8 come back as a failure response.
    pub fn analyze_text_bytes(&self, bytes: &[u8]) -> TextScanResponse {
        match analyze_bytes(bytes) {
            Ok(assessment) => TextScanResponse::Analyzed(assessment),
            Err(e) => {
                error!(error = %e, "Text analysis failed.");
                let error = format!("Text analysis failed: {}", e);
                TextScanResponse::Failed(TextScanFailure::new(error))
            }
        }
    }

    /// [`process_image`](Self::process_image) for input read as raw bytes, such
    /// as a file or stdin. Bytes that are not UTF-8 become a failure response.
    pub fn process_image_bytes(&self, bytes: &[u8]) -> ImageScanResponse {
        match std::str::from_utf8(bytes) {
            Ok(image_data) => self.process_image(image_data),
            Err(e) => {
                let e = EngineError::InvalidInput(format!("image data is not valid UTF-8: {}", e));
                error!(error = %e, "Image processing failed.");
                ImageScanResponse::Failed(image_failure(&e))
            }
        }
    }

    /// Decodes an image, extracts its text and scores it. Never fails: bad
    /// input comes back as a failure response.
    pub fn process_image(&self, image_data: &str) -> ImageScanResponse {
        let started = Instant::now();
        info!(input_len = image_data.len(), "Starting image processing.");

        let outcome = decode_image(image_data).and_then(|image| {
            let extraction = self.extractor.extract(&image)?;
            Ok((image, extraction))
        });

        match outcome {
            Ok((image, extraction)) => {
                let analysis = analyze_text(&extraction.text);
                let processing_time = started.elapsed().as_millis() as u64;
                info!(processing_time, score = analysis.risk_score, "Image processing finished.");
                ImageScanResponse::Processed(ImageScanReport {
                    success: true,
                    extracted_text: extraction.text,
                    confidence: extraction.confidence,
                    processing_time,
                    image_format: image.format_label().to_string(),
                    image_dimensions: image.dimensions_label(),
                    analysis,
                })
            }
            Err(e) => {
                error!(error = %e, "Image processing failed.");
                ImageScanResponse::Failed(image_failure(&e))
            }
        }
    }

    async fn analyze_url(&self, url: &str) -> EngineResult<UrlAnalysis> {
        let components = parse_url(url)?;
        let risk = score_url(&components, &self.config.reputation);

        let probe_started = Instant::now();
        let ssl = probe_ssl(
            self.tls_probe.clone(),
            &components.scheme,
            &components.host,
            components.port,
            self.config.probe_timeout,
        )
        .await;
        let probe_elapsed = probe_started.elapsed();

        let domain_age = self.age_lookup.estimate(&components.host);

        let mut signals = risk.signals;
        signals.ssl_valid = ssl.valid;
        let advice = url_advice(&signals, risk.score);
        let verdict = URL_TIERS.verdict(risk.score);
        info!(
            host = %components.host,
            score = risk.score,
            %verdict,
            ssl_valid = ssl.valid,
            "URL analysis finished."
        );

        Ok(UrlAnalysis {
            assessment: RiskAssessment {
                risk_score: risk.score,
                verdict,
                matched_categories: risk.matched_rules,
                warnings: advice.warnings,
                recommendations: advice.recommendations,
                passed_checks: advice.passed_checks,
            },
            components,
            ssl,
            domain_age,
            probe_elapsed,
        })
    }
}

impl Default for ThreatEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn image_failure(e: &EngineError) -> ImageScanFailure {
    ImageScanFailure::new(format!("Image processing failed: {}", e))
}

fn build_url_report(analysis: UrlAnalysis) -> UrlScanReport {
    let UrlAnalysis { components, assessment, ssl, domain_age, probe_elapsed } = analysis;
    UrlScanReport {
        success: true,
        url: components.raw,
        domain: components.host,
        risk_score: assessment.risk_score,
        verdict: assessment.verdict,
        warnings: assessment.warnings,
        recommendations: assessment.recommendations,
        checks: assessment.passed_checks,
        technical_details: TechnicalDetails {
            has_ssl: ssl.valid,
            ssl_reason: ssl.reason,
            domain_age,
            response_time: format!("{}ms", probe_elapsed.as_millis()),
            server_location: SERVER_LOCATION_UNKNOWN.to_string(),
            certificate: ssl.certificate,
        },
        scan_timestamp: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{CertificateInfo, Verdict};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProbe {
        valid: bool,
        calls: AtomicUsize,
    }

    impl StubProbe {
        fn new(valid: bool) -> Arc<Self> {
            Arc::new(Self { valid, calls: AtomicUsize::new(0) })
        }
    }

    impl TlsProbe for StubProbe {
        fn handshake(
            &self,
            _host: &str,
            _port: u16,
            _timeout: Duration,
        ) -> EngineResult<Option<CertificateInfo>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.valid {
                Ok(None)
            } else {
                Err(EngineError::ProbeFailure("stub".into()))
            }
        }
    }

    fn engine(valid_tls: bool) -> ThreatEngine {
        ThreatEngine::default().with_tls_probe(StubProbe::new(valid_tls))
    }

    #[tokio::test]
    async fn trusted_site_is_safe_with_passed_checks() {
        let response = engine(true).scan_url("https://www.google.com").await;
        let UrlScanResponse::Scanned(report) = response else {
            panic!("expected a successful scan");
        };
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.verdict, Verdict::Safe);
        assert_eq!(report.domain, "www.google.com");
        assert_eq!(
            report.checks,
            vec![
                "Valid SSL certificate detected",
                "Domain is in trusted whitelist",
                "HTTPS protocol in use",
            ]
        );
        assert!(report.warnings.is_empty());
        assert_eq!(report.recommendations.len(), 3);
        assert_eq!(report.technical_details.domain_age, DomainAge::Established);
        assert_eq!(report.technical_details.server_location, "Unknown");
    }

    #[tokio::test]
    async fn ip_literal_login_is_dangerous_without_probing() {
        let probe = StubProbe::new(true);
        let engine = ThreatEngine::default().with_tls_probe(probe.clone());

        let response = engine.scan_url("http://192.168.1.5/login").await;
        let UrlScanResponse::Scanned(report) = response else {
            panic!("expected a successful scan");
        };
        assert_eq!(report.risk_score, 80);
        assert_eq!(report.verdict, Verdict::Dangerous);
        assert_eq!(
            report.warnings,
            vec![
                "No valid SSL certificate - data may not be encrypted",
                "Direct IP address usage - potentially suspicious",
            ]
        );
        assert_eq!(report.recommendations.len(), 6);
        assert!(report.checks.is_empty());
        assert_eq!(report.technical_details.ssl_reason, "Not HTTPS");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_probe_only_adds_a_warning() {
        let response = engine(false).scan_url("https://example.com").await;
        let UrlScanResponse::Scanned(report) = response else {
            panic!("expected a successful scan");
        };
        assert_eq!(report.risk_score, 0);
        assert_eq!(report.warnings, vec!["No valid SSL certificate - data may not be encrypted"]);
        assert_eq!(report.checks, vec!["HTTPS protocol in use"]);
        assert!(!report.technical_details.has_ssl);
        assert_eq!(report.technical_details.ssl_reason, "SSL verification failed");
    }

    #[tokio::test]
    async fn malformed_urls_report_error_verdict() {
        for bad in ["", "no host here"] {
            let response = engine(true).scan_url(bad).await;
            assert!(!response.is_success());
            assert_eq!(response.risk_score(), 100);
            assert_eq!(response.verdict(), Verdict::Error);
        }
    }

    #[tokio::test]
    async fn assess_dispatches_on_input_kind() {
        let engine = engine(true);

        let text = engine
            .assess(AnalysisInput::RawText("Claim your prize now".into()))
            .await
            .unwrap();
        assert_eq!(text.matched_categories, vec!["Financial Threats"]);
        assert_eq!(text.verdict, Verdict::LowRisk);

        let url = engine
            .assess(AnalysisInput::TargetUrl("http://192.168.1.5/login".into()))
            .await
            .unwrap();
        assert_eq!(url.risk_score, 80);

        let err = engine.assess(AnalysisInput::TargetUrl("::".into())).await.unwrap_err();
        assert!(matches!(err, EngineError::MalformedUrl(_)));
    }

    #[tokio::test]
    async fn repeated_scans_differ_only_in_timing_fields() {
        let engine = engine(true);
        let input = AnalysisInput::TargetUrl("https://scam-site.net/update".into());
        let first = engine.assess(input.clone()).await.unwrap();
        let second = engine.assess(input).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.verdict, Verdict::Dangerous);
    }

    #[test]
    fn process_image_rejects_garbage() {
        let ImageScanResponse::Failed(failure) = ThreatEngine::default().process_image("%%%") else {
            panic!("expected a failure");
        };
        assert!(!failure.success);
        assert!(failure.error.starts_with("Image processing failed"));
        assert_eq!(failure.confidence, 0.0);
    }

    #[test]
    fn image_bytes_that_are_not_utf8_report_invalid_input() {
        let ImageScanResponse::Failed(failure) =
            ThreatEngine::default().process_image_bytes(&[0xff, 0xfe, 0x00])
        else {
            panic!("expected a failure");
        };
        assert!(failure.error.starts_with("Image processing failed: invalid input:"));
        assert!(failure.extracted_text.is_empty());
    }

    #[test]
    fn text_bytes_are_analyzed_or_rejected() {
        let engine = ThreatEngine::default();

        let TextScanResponse::Analyzed(assessment) = engine.analyze_text_bytes(b"verify now") else {
            panic!("expected an analysis");
        };
        assert_eq!(assessment.matched_categories, vec!["Verification Requests"]);

        let TextScanResponse::Failed(failure) = engine.analyze_text_bytes(&[0x76, 0xc3]) else {
            panic!("expected a failure");
        };
        assert!(!failure.success);
        assert!(failure.error.starts_with("Text analysis failed: invalid input:"));
    }
}
