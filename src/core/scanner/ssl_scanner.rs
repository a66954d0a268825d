// src/core/scanner/ssl_scanner.rs

use tracing::{debug, error, info, warn};

use crate::core::error::{EngineError, EngineResult};
use crate::core::models::{CertificateInfo, SslProbeResult};
use chrono::{DateTime, Utc};
use native_tls::TlsConnector;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tokio::task::spawn_blocking;
use x509_parser::prelude::*;

pub const HTTPS_PORT: u16 = 443;

/// A handshake-only TLS check against `host:port`.
///
/// Implementations block; [`probe_ssl`] moves them onto the blocking pool and
/// bounds them with the configured timeout.
pub trait TlsProbe: Send + Sync {
    /// Returns the peer certificate summary when the handshake succeeds. A
    /// successful handshake whose certificate cannot be summarized yields `Ok(None)`.
    fn handshake(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> EngineResult<Option<CertificateInfo>>;
}

/// Probe backed by the platform TLS stack through `native-tls`.
///
/// The whole probe (resolution, connect attempts and handshake) shares a single
/// deadline, so it never runs longer than the timeout it is given.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeTlsProbe;

impl TlsProbe for NativeTlsProbe {
    fn handshake(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> EngineResult<Option<CertificateInfo>> {
        perform_tls_handshake(host, port, Instant::now() + timeout)
    }
}

/// Runs the TLS reachability probe for one URL.
///
/// Non-https schemes short-circuit without touching the network. Every failure,
/// including a timeout or a panicking probe, collapses into
/// [`SslProbeResult::failed`].
pub async fn probe_ssl(
    probe: Arc<dyn TlsProbe>,
    scheme: &str,
    host: &str,
    port: u16,
    timeout: Duration,
) -> SslProbeResult {
    if scheme != "https" {
        debug!(scheme, "Skipping TLS probe for non-https URL.");
        return SslProbeResult::not_https();
    }

    info!(host, port, timeout_ms = timeout.as_millis() as u64, "Starting TLS probe.");
    let host_owned = host.to_string();

    debug!("Spawning blocking task for TLS handshake.");
    let task = spawn_blocking(move || probe.handshake(&host_owned, port, timeout));

    let outcome = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            error!(panic = %e, "Blocking TLS probe task panicked!");
            Err(EngineError::ProbeFailure(format!("task panicked: {}", e)))
        }
        Err(_) => Err(EngineError::ProbeFailure(format!("timed out after {:?}", timeout))),
    };

    match outcome {
        Ok(certificate) => {
            info!(host, has_certificate = certificate.is_some(), "TLS probe succeeded.");
            SslProbeResult::verified(certificate)
        }
        Err(e) => {
            warn!(host, error = %e, "TLS probe failed.");
            SslProbeResult::failed()
        }
    }
}

/// Time left before `deadline`, or a `TimedOut` error once it has passed.
fn remaining_until(deadline: Instant) -> io::Result<Duration> {
    match deadline.checked_duration_since(Instant::now()) {
        Some(left) if !left.is_zero() => Ok(left),
        _ => Err(io::Error::new(io::ErrorKind::TimedOut, "probe deadline exceeded")),
    }
}

fn deadline_error(stage: &str, e: io::Error) -> EngineError {
    EngineError::ProbeFailure(format!("{}: {}", stage, e))
}

/// A TCP stream whose every read and write is limited to the time left before
/// a fixed deadline, however many round trips the handshake needs.
#[derive(Debug)]
struct DeadlineStream {
    inner: TcpStream,
    deadline: Instant,
}

impl Read for DeadlineStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.set_read_timeout(Some(remaining_until(self.deadline)?))?;
        self.inner.read(buf)
    }
}

impl Write for DeadlineStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.set_write_timeout(Some(remaining_until(self.deadline)?))?;
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn perform_tls_handshake(
    host: &str,
    port: u16,
    deadline: Instant,
) -> EngineResult<Option<CertificateInfo>> {
    // Bracketed IPv6 literals come straight from the URL host.
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let connector = TlsConnector::new().map_err(|e| {
        error!(error = %e, "Failed to create TlsConnector");
        EngineError::ProbeFailure(format!("TlsConnector error: {}", e))
    })?;

    debug!(host, port, "Resolving and connecting TCP stream.");
    let addrs = resolve_before(host, port, deadline)?;
    let stream = connect_before(host, &addrs, deadline)?;

    debug!(host, "Performing TLS handshake.");
    let stream = DeadlineStream { inner: stream, deadline };
    let stream = connector.connect(host, stream).map_err(|e| {
        debug!(error = %e, "TLS handshake failed");
        EngineError::ProbeFailure(format!("TLS handshake error: {}", e))
    })?;

    let cert = match stream.peer_certificate() {
        Ok(Some(cert)) => cert,
        Ok(None) => {
            debug!("Handshake completed without a peer certificate.");
            return Ok(None);
        }
        Err(e) => {
            debug!(error = %e, "Could not read peer certificate.");
            return Ok(None);
        }
    };

    Ok(cert.to_der().ok().and_then(|der| summarize_certificate(&der)))
}

// The system resolver has no timeout of its own, so the lookup runs on a
// detached thread and is abandoned at the deadline.
fn resolve_before(host: &str, port: u16, deadline: Instant) -> EngineResult<Vec<SocketAddr>> {
    let wait = remaining_until(deadline).map_err(|e| deadline_error("resolve", e))?;
    let (tx, rx) = mpsc::channel();
    let target = host.to_string();
    thread::spawn(move || {
        let resolved =
            (target.as_str(), port).to_socket_addrs().map(|addrs| addrs.collect::<Vec<_>>());
        let _ = tx.send(resolved);
    });

    match rx.recv_timeout(wait) {
        Ok(Ok(addrs)) => Ok(addrs),
        Ok(Err(e)) => Err(EngineError::ProbeFailure(format!("could not resolve {}: {}", host, e))),
        Err(_) => Err(EngineError::ProbeFailure(format!("resolving {} timed out", host))),
    }
}

fn connect_before(host: &str, addrs: &[SocketAddr], deadline: Instant) -> EngineResult<TcpStream> {
    let mut last_error = None;
    for addr in addrs {
        let wait = remaining_until(deadline).map_err(|e| deadline_error("connect", e))?;
        match TcpStream::connect_timeout(addr, wait) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!(%addr, error = %e, "TCP connect attempt failed.");
                last_error = Some(e);
            }
        }
    }

    Err(EngineError::ProbeFailure(match last_error {
        Some(e) => format!("TCP connection error: {}", e),
        None => format!("no addresses found for {}", host),
    }))
}

fn summarize_certificate(der: &[u8]) -> Option<CertificateInfo> {
    let (_, x509) = match parse_x509_certificate(der) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "Failed to parse X.509 certificate");
            return None;
        }
    };

    let not_after = asn1_time_to_chrono_utc(&x509.validity().not_after);
    debug!(subject = %x509.subject(), issuer = %x509.issuer(), "Parsed peer certificate.");

    Some(CertificateInfo {
        subject_name: x509.subject().to_string(),
        issuer_name: x509.issuer().to_string(),
        not_after,
        days_until_expiry: not_after.signed_duration_since(Utc::now()).num_days(),
    })
}

fn asn1_time_to_chrono_utc(time: &ASN1Time) -> DateTime<Utc> {
    DateTime::from_timestamp(time.timestamp(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::run_to_completion;
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type HandshakeOutcome = EngineResult<Option<CertificateInfo>>;

    struct CountingProbe {
        calls: AtomicUsize,
        outcome: HandshakeOutcome,
    }

    impl TlsProbe for CountingProbe {
        fn handshake(&self, _host: &str, _port: u16, _timeout: Duration) -> HandshakeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    struct SlowProbe(Duration);

    impl TlsProbe for SlowProbe {
        fn handshake(&self, _host: &str, _port: u16, _timeout: Duration) -> HandshakeOutcome {
            thread::sleep(self.0);
            Ok(None)
        }
    }

    struct PanickingProbe;

    impl TlsProbe for PanickingProbe {
        fn handshake(&self, _host: &str, _port: u16, _timeout: Duration) -> HandshakeOutcome {
            panic!("boom")
        }
    }

    fn counting(outcome: HandshakeOutcome) -> Arc<CountingProbe> {
        Arc::new(CountingProbe { calls: AtomicUsize::new(0), outcome })
    }

    #[tokio::test]
    async fn plain_http_never_touches_the_probe() {
        let probe = counting(Ok(None));
        let result =
            probe_ssl(probe.clone(), "http", "example.com", 80, Duration::from_secs(1)).await;
        assert_eq!(result, SslProbeResult::not_https());
        assert_eq!(result.reason, "Not HTTPS");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn successful_handshake_is_valid() {
        let probe = counting(Ok(None));
        let result =
            probe_ssl(probe.clone(), "https", "example.com", 443, Duration::from_secs(1)).await;
        assert!(result.valid);
        assert_eq!(result.reason, "Valid SSL certificate");
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn handshake_error_collapses_to_invalid() {
        let probe = counting(Err(EngineError::ProbeFailure("refused".into())));
        let result = probe_ssl(probe, "https", "example.com", 443, Duration::from_secs(1)).await;
        assert_eq!(result, SslProbeResult::failed());
        assert_eq!(result.reason, "SSL verification failed");
    }

    #[tokio::test]
    async fn timeout_collapses_to_invalid() {
        let probe = Arc::new(SlowProbe(Duration::from_millis(500)));
        let result =
            probe_ssl(probe, "https", "slow.example", 443, Duration::from_millis(50)).await;
        assert!(!result.valid);
        assert_eq!(result.reason, SslProbeResult::FAILED);
    }

    #[tokio::test]
    async fn panicking_probe_collapses_to_invalid() {
        let probe = Arc::new(PanickingProbe);
        let result = probe_ssl(probe, "https", "example.com", 443, Duration::from_secs(1)).await;
        assert!(!result.valid);
    }

    #[test]
    fn slow_handshake_cannot_hold_the_runtime_past_its_timeout() {
        let started = Instant::now();
        let probe = Arc::new(SlowProbe(Duration::from_secs(3)));

        let result = run_to_completion(async move {
            probe_ssl(probe, "https", "slow.example", 443, Duration::from_millis(100)).await
        })
        .unwrap();

        assert!(!result.valid);
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }

    #[test]
    fn silent_server_handshake_stops_at_the_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        // Accept and hold the connection without ever answering the ClientHello.
        let server = thread::spawn(move || {
            let (_conn, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_secs(2));
        });

        let started = Instant::now();
        let result = NativeTlsProbe.handshake("127.0.0.1", port, Duration::from_millis(300));

        assert!(matches!(result, Err(EngineError::ProbeFailure(_))));
        assert!(started.elapsed() < Duration::from_millis(1500), "took {:?}", started.elapsed());
        drop(server);
    }

    #[test]
    fn expired_deadline_refuses_to_start() {
        let past = Instant::now() - Duration::from_millis(1);
        assert_eq!(remaining_until(past).unwrap_err().kind(), io::ErrorKind::TimedOut);

        let result = perform_tls_handshake("127.0.0.1", 9, past);
        assert!(matches!(result, Err(EngineError::ProbeFailure(_))));
    }

    #[test]
    fn garbage_der_yields_no_summary() {
        assert!(summarize_certificate(&[0x30, 0x03, 0x01]).is_none());
    }
}
