// src/core/scanner/domain_age.rs

use crate::core::config::{Reputation, ReputationList};
use crate::core::models::DomainAge;
use tracing::debug;

/// Estimates how long a domain has been registered.
pub trait DomainAgeLookup: Send + Sync {
    fn estimate(&self, host: &str) -> DomainAge;
}

/// Answers from the reputation lists alone: trusted domains are old,
/// known-dangerous ones are fresh, everything else is unknown. No I/O.
// TODO: add a WHOIS-backed lookup that reads the registration date.
#[derive(Debug, Clone)]
pub struct ReputationAgeLookup {
    reputation: ReputationList,
}

impl ReputationAgeLookup {
    pub fn new(reputation: ReputationList) -> Self {
        Self { reputation }
    }
}

impl DomainAgeLookup for ReputationAgeLookup {
    fn estimate(&self, host: &str) -> DomainAge {
        let age = match self.reputation.classify(host) {
            Reputation::Trusted => DomainAge::Established,
            Reputation::Dangerous => DomainAge::Fresh,
            Reputation::Neutral => DomainAge::Unknown,
        };
        debug!(host, %age, "Estimated domain age.");
        age
    }
}
