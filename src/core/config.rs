// src/core/config.rs

//! Read-only configuration shared by every assessment: the domain reputation
//! lists and the TLS probe timeout. Nothing here changes after start-up.

use crate::core::error::{EngineError, EngineResult};
use crate::logging::PROJECT_NAME;
use lazy_static::lazy_static;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

lazy_static! {
    pub static ref PROBE_TIMEOUT_ENV: String =
        format!("{}_PROBE_TIMEOUT_SECS", PROJECT_NAME.clone());
}

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_TRUSTED: &[&str] = &[
    "google.com",
    "microsoft.com",
    "apple.com",
    "github.com",
    "stackoverflow.com",
    "wikipedia.org",
    "mozilla.org",
];

const DEFAULT_DANGEROUS: &[&str] = &[
    "suspicious-bank.com",
    "fake-security.org",
    "scam-site.net",
    "phishing-test.com",
    "malware-download.biz",
];

/// Where a host sits on the allow/deny lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reputation {
    Dangerous,
    Trusted,
    Neutral,
}

// On-disk shape of a reputation file.
#[derive(Debug, Deserialize)]
struct ReputationFile {
    #[serde(default)]
    trusted: Vec<String>,
    #[serde(default)]
    dangerous: Vec<String>,
}

/// Allow/deny host lists.
///
/// A host matches an entry when it equals it or is a subdomain of it, so
/// `www.google.com` is covered by `google.com` but `evilgoogle.com` is not.
/// If a host is covered by both lists the dangerous entry wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReputationList {
    trusted: HashSet<String>,
    dangerous: HashSet<String>,
}

impl ReputationList {
    pub fn new<T, D>(trusted: T, dangerous: D) -> Self
    where
        T: IntoIterator,
        T::Item: AsRef<str>,
        D: IntoIterator,
        D::Item: AsRef<str>,
    {
        let trusted = normalize_hosts(trusted);
        let dangerous = normalize_hosts(dangerous);

        for overlap in trusted.intersection(&dangerous) {
            warn!(
                host = %overlap,
                "Host is listed as both trusted and dangerous; dangerous takes precedence."
            );
        }

        Self { trusted, dangerous }
    }

    pub fn from_json_str(raw: &str) -> EngineResult<Self> {
        let file: ReputationFile = serde_json::from_str(raw)
            .map_err(|e| EngineError::Config(format!("invalid reputation list: {}", e)))?;
        Ok(Self::new(file.trusted, file.dangerous))
    }

    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        info!(path = %path.display(), "Loading reputation list.");
        let raw = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        let list = Self::from_json_str(&raw)?;
        info!(
            trusted = list.trusted.len(),
            dangerous = list.dangerous.len(),
            "Reputation list loaded."
        );
        Ok(list)
    }

    pub fn classify(&self, host: &str) -> Reputation {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        let reputation = if host_suffixes(&host).any(|s| self.dangerous.contains(s)) {
            Reputation::Dangerous
        } else if host_suffixes(&host).any(|s| self.trusted.contains(s)) {
            Reputation::Trusted
        } else {
            Reputation::Neutral
        };
        debug!(host = %host, ?reputation, "Classified host reputation.");
        reputation
    }

    pub fn is_dangerous(&self, host: &str) -> bool {
        self.classify(host) == Reputation::Dangerous
    }

    pub fn is_trusted(&self, host: &str) -> bool {
        self.classify(host) == Reputation::Trusted
    }
}

impl Default for ReputationList {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED.iter(), DEFAULT_DANGEROUS.iter())
    }
}

fn normalize_hosts<I>(hosts: I) -> HashSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    hosts
        .into_iter()
        .map(|h| h.as_ref().trim().trim_end_matches('.').to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect()
}

// "a.b.c" -> "a.b.c", "b.c", "c"
fn host_suffixes(host: &str) -> impl Iterator<Item = &str> {
    std::iter::once(host).chain(host.match_indices('.').map(move |(i, _)| &host[i + 1..]))
}

/// Engine-wide settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub probe_timeout: Duration,
    pub reputation: ReputationList,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { probe_timeout: DEFAULT_PROBE_TIMEOUT, reputation: ReputationList::default() }
    }
}

impl EngineConfig {
    /// Builds the default configuration, applying the probe timeout override
    /// from the environment when present.
    pub fn from_env() -> Self {
        let raw = std::env::var(PROBE_TIMEOUT_ENV.as_str()).ok();
        Self { probe_timeout: parse_probe_timeout(raw.as_deref()), ..Self::default() }
    }

    pub fn with_reputation(mut self, reputation: ReputationList) -> Self {
        self.reputation = reputation;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        if timeout.is_zero() {
            warn!("Ignoring zero probe timeout, keeping {:?}.", self.probe_timeout);
        } else {
            self.probe_timeout = timeout;
        }
        self
    }
}

fn parse_probe_timeout(raw: Option<&str>) -> Duration {
    match raw.map(str::trim) {
        None => DEFAULT_PROBE_TIMEOUT,
        Some(value) => match value.parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(
                    value,
                    env = %PROBE_TIMEOUT_ENV.as_str(),
                    "Invalid probe timeout, using default."
                );
                DEFAULT_PROBE_TIMEOUT
            }
        },
    }
}
