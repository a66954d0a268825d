//! Static, read-only rule tables for both analyzers together with every
//! human-readable message the engine emits. Keeping the data here lets the
//! analyzers stay small and makes the rule set reviewable in one place.

use once_cell::sync::Lazy;
use regex::Regex;

// --- Text Rules ---

/// A named suspicion category checked against lower-cased extracted text.
pub struct SuspicionRule {
    /// Machine identifier, e.g. `urgent_action`.
    pub code: &'static str,
    pub pattern: &'static Lazy<Regex>,
    pub weight: i32,
}

impl SuspicionRule {
    /// `urgent_action` -> `Urgent Action`
    pub fn display_name(&self) -> String {
        display_name(self.code)
    }
}

pub const TEXT_RULE_WEIGHT: i32 = 20;

static RE_URGENT_ACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"urgent|immediate|suspend|expire|act now").unwrap());
static RE_FINANCIAL_THREATS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+|payment|due|claim|prize|winner").unwrap());
static RE_SUSPICIOUS_LINKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());
static RE_VERIFICATION_REQUESTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"verify|confirm|update|account|login").unwrap());
static RE_FEAR_TACTICS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"suspend|block|close|penalty|fine|legal").unwrap());

// Order is the order categories are reported in.
static SUSPICION_RULES: &[SuspicionRule] = &[
    SuspicionRule { code: "urgent_action", pattern: &RE_URGENT_ACTION, weight: TEXT_RULE_WEIGHT },
    SuspicionRule {
        code: "financial_threats",
        pattern: &RE_FINANCIAL_THREATS,
        weight: TEXT_RULE_WEIGHT,
    },
    SuspicionRule {
        code: "suspicious_links",
        pattern: &RE_SUSPICIOUS_LINKS,
        weight: TEXT_RULE_WEIGHT,
    },
    SuspicionRule {
        code: "verification_requests",
        pattern: &RE_VERIFICATION_REQUESTS,
        weight: TEXT_RULE_WEIGHT,
    },
    SuspicionRule { code: "fear_tactics", pattern: &RE_FEAR_TACTICS, weight: TEXT_RULE_WEIGHT },
];

pub fn suspicion_rules() -> &'static [SuspicionRule] {
    SUSPICION_RULES
}

// --- URL Rules ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRuleKind {
    DangerousHost,
    TrustedHost,
    IpLiteralHost,
    DeepSubdomains,
    UrgencyKeywords,
    InsecureScheme,
    LongHyphenatedHost,
}

pub struct UrlRuleDetail {
    pub kind: UrlRuleKind,
    pub code: &'static str,
    /// Signed: trusted hosts lower the score.
    pub weight: i32,
}

impl UrlRuleDetail {
    pub fn display_name(&self) -> String {
        display_name(self.code)
    }
}

static URL_RULES: &[UrlRuleDetail] = &[
    UrlRuleDetail { kind: UrlRuleKind::DangerousHost, code: "known_malicious_domain", weight: 80 },
    UrlRuleDetail { kind: UrlRuleKind::TrustedHost, code: "trusted_domain", weight: -20 },
    UrlRuleDetail { kind: UrlRuleKind::IpLiteralHost, code: "ip_address_host", weight: 40 },
    UrlRuleDetail { kind: UrlRuleKind::DeepSubdomains, code: "excessive_subdomains", weight: 20 },
    UrlRuleDetail { kind: UrlRuleKind::UrgencyKeywords, code: "urgency_keywords", weight: 15 },
    UrlRuleDetail { kind: UrlRuleKind::InsecureScheme, code: "insecure_protocol", weight: 25 },
    UrlRuleDetail {
        kind: UrlRuleKind::LongHyphenatedHost,
        code: "long_hyphenated_host",
        weight: 10,
    },
];

pub fn url_rules() -> &'static [UrlRuleDetail] {
    URL_RULES
}

/// Any of these anywhere in the URL adds to the score.
pub const URL_SCORING_KEYWORDS: &[&str] = &["urgent", "verify", "secure", "login", "update"];
/// The narrower subset that also raises a warning.
pub const URL_WARNING_KEYWORDS: &[&str] = &["urgent", "verify", "update"];

pub static RE_IPV4_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+").unwrap());

pub const MAX_HOST_LABELS: usize = 3;
pub const LONG_HOST_LEN: usize = 20;

// --- URL Advice ---

pub const WARNING_NO_SSL: &str = "No valid SSL certificate - data may not be encrypted";
pub const WARNING_MALICIOUS_DOMAIN: &str = "Known malicious domain - avoid interaction";
pub const WARNING_IP_ADDRESS: &str = "Direct IP address usage - potentially suspicious";
pub const WARNING_URGENCY_KEYWORDS: &str = "URL contains urgency keywords often used in phishing";

pub const HIGH_RISK_RECOMMENDATIONS: &[&str] = &[
    "Do not enter personal information on this site",
    "Verify the legitimate website URL independently",
    "Use caution if you received this link via email or message",
];

pub const BASELINE_RECOMMENDATIONS: &[&str] = &[
    "Check for HTTPS and valid SSL certificates",
    "Look for official contact information and privacy policy",
    "When in doubt, navigate directly to the official website",
];

pub const CHECK_VALID_SSL: &str = "Valid SSL certificate detected";
pub const CHECK_TRUSTED_DOMAIN: &str = "Domain is in trusted whitelist";
pub const CHECK_HTTPS: &str = "HTTPS protocol in use";

// --- OCR Stand-in Samples ---

pub const SAMPLE_EXTRACTED_TEXTS: &[&str] = &[
    "URGENT: Your account will be suspended unless you verify immediately! Click here: https://suspicious-bank.com/verify?id=12345",
    "Congratulations! You've won $10,000! Claim now at: winner-claim.net/prize",
    "Your payment of $299.99 is due immediately. Avoid late fees: pay-now-secure.com",
    "Security Alert: Unusual activity detected. Verify your identity: security-check.org/login",
    "Limited time offer! Make $5000 per week working from home. Join now: make-money-fast.biz",
];

/// Turns a snake_case identifier into a title-cased label.
pub fn display_name(code: &str) -> String {
    code.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
