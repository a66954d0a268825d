// src/runtime.rs

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::runtime::Builder;
use tracing::debug;

/// How long shutdown waits for blocking tasks that are still running.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Drives `future` to completion on a fresh multi-threaded runtime, then shuts
/// the runtime down without waiting more than [`SHUTDOWN_GRACE`] for leftover
/// blocking work such as an abandoned TLS handshake.
pub fn run_to_completion<F: Future>(future: F) -> io::Result<F::Output> {
    let runtime = Builder::new_multi_thread().enable_all().build()?;
    let output = runtime.block_on(future);
    debug!(grace_ms = SHUTDOWN_GRACE.as_millis() as u64, "Shutting down runtime.");
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn returns_the_future_output() {
        assert_eq!(run_to_completion(async { 6 * 7 }).unwrap(), 42);
    }

    #[test]
    fn leftover_blocking_work_does_not_delay_shutdown() {
        let started = Instant::now();
        run_to_completion(async {
            drop(tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(3))));
        })
        .unwrap();
        assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
    }
}
