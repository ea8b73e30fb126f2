//! Download PDB structures from RCSB by identifier.
//!
//! Each attempt bounds connecting and waiting for the response head; the body
//! itself may take as long as it needs. Failed attempts (transport errors or
//! any non-success status) are retried after a fixed delay up to a bounded
//! count.
//! The body is streamed into a temporary file beside the destination and only
//! renamed into place once complete.
use std::fs;
use std::path::Path;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::io::staging::stage_beside;

/// RCSB base URL for PDB text downloads
const RCSB_BASE_URL: &str = "https://files.rcsb.org/download";

/// User-Agent header for HTTP requests
const USER_AGENT: &str = concat!("protprep/", env!("CARGO_PKG_VERSION"));

/// Errors encountered while fetching a structure
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid PDB ID '{0}': must be exactly 4 alphanumeric characters")]
    InvalidId(String),
    #[error("Failed to download {id} after {attempts} attempts: {last}")]
    Exhausted {
        id: String,
        attempts: u32,
        last: String,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Retry and timeout settings for downloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Total number of attempts (0 is treated as 1)
    pub retries: u32,
    /// Pause between consecutive attempts
    pub retry_delay: Duration,
    /// Per-attempt limit on connecting and on receiving the response head
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retries: 3,
            retry_delay: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Source of structure files keyed by identifier.
pub trait StructureFetcher {
    /// Write the structure for `pdb_id` to `dest`, overwriting it.
    fn fetch(&self, pdb_id: &str, dest: &Path) -> Result<(), FetchError>;
}

/// True for 4-character ASCII alphanumeric identifiers.
pub fn is_valid_pdb_id(pdb_id: &str) -> bool {
    pdb_id.len() == 4 && pdb_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Build the RCSB download URL (uppercased identifier).
pub fn build_rcsb_url(pdb_id: &str) -> String {
    structure_url(RCSB_BASE_URL, pdb_id)
}

fn structure_url(base_url: &str, pdb_id: &str) -> String {
    format!(
        "{}/{}.pdb",
        base_url.trim_end_matches('/'),
        pdb_id.to_ascii_uppercase()
    )
}

/// Run `attempt` until it succeeds or `config.retries` attempts are used up.
///
/// The closure receives the 1-based attempt number. The last error message is
/// carried in [`FetchError::Exhausted`].
pub fn with_retries<F>(pdb_id: &str, config: &FetchConfig, mut attempt: F) -> Result<(), FetchError>
where
    F: FnMut(u32) -> Result<(), String>,
{
    let attempts = config.retries.max(1);
    let mut last = String::new();

    for n in 1..=attempts {
        match attempt(n) {
            Ok(()) => return Ok(()),
            Err(e) => {
                warn!("[DOWNLOAD] Attempt {}/{} failed: {}", n, attempts, e);
                last = e;
            }
        }
        if n < attempts && !config.retry_delay.is_zero() {
            thread::sleep(config.retry_delay);
        }
    }

    Err(FetchError::Exhausted {
        id: pdb_id.to_string(),
        attempts,
        last,
    })
}

/// Blocking HTTP fetcher backed by `ureq`.
pub struct RcsbFetcher {
    agent: ureq::Agent,
    config: FetchConfig,
    base_url: String,
}

impl RcsbFetcher {
    pub fn new(config: FetchConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_connect(Some(config.timeout))
            .timeout_recv_response(Some(config.timeout))
            .build()
            .into();
        Self {
            agent,
            config,
            base_url: RCSB_BASE_URL.to_string(),
        }
    }

    /// Serve downloads from a mirror instead of RCSB.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn download_once(&self, url: &str, dest: &Path) -> Result<(), String> {
        let response = self
            .agent
            .get(url)
            .header("User-Agent", USER_AGENT)
            .call()
            .map_err(|e| format!("Network error: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP error {}: {}", status.as_u16(), url));
        }

        let mut staged =
            stage_beside(dest).map_err(|e| format!("Failed to create temp file: {}", e))?;
        let mut reader = response.into_body().into_reader();
        let bytes = std::io::copy(&mut reader, &mut staged)
            .map_err(|e| format!("Failed to read response: {}", e))?;
        staged
            .persist(dest)
            .map_err(|e| format!("Failed to write {:?}: {}", dest, e.error))?;

        debug!("Wrote {} bytes to {:?}", bytes, dest);
        Ok(())
    }
}

impl Default for RcsbFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl StructureFetcher for RcsbFetcher {
    fn fetch(&self, pdb_id: &str, dest: &Path) -> Result<(), FetchError> {
        if !is_valid_pdb_id(pdb_id) {
            return Err(FetchError::InvalidId(pdb_id.to_string()));
        }
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let url = structure_url(&self.base_url, pdb_id);
        info!("[FETCH] Downloading {} from {}", pdb_id.to_ascii_uppercase(), url);
        with_retries(pdb_id, &self.config, |_| self.download_once(&url, dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    fn no_delay(retries: u32) -> FetchConfig {
        FetchConfig {
            retries,
            retry_delay: Duration::ZERO,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn validates_identifiers() {
        assert!(is_valid_pdb_id("1a4w"));
        assert!(is_valid_pdb_id("4HHB"));
        assert!(!is_valid_pdb_id("1a4"));
        assert!(!is_valid_pdb_id("1a4w5"));
        assert!(!is_valid_pdb_id("1a-w"));
        assert!(!is_valid_pdb_id("1aé"));
    }

    #[test]
    fn url_uses_uppercase_identifier() {
        assert_eq!(build_rcsb_url("1a4w"), "https://files.rcsb.org/download/1A4W.pdb");
    }

    #[test]
    fn defaults_match_documented_policy() {
        let cfg = FetchConfig::default();
        assert_eq!(cfg.retries, 3);
        assert_eq!(cfg.retry_delay, Duration::from_secs(2));
        assert_eq!(cfg.timeout, Duration::from_secs(10));
    }

    #[test]
    fn retries_until_success() {
        let calls = Cell::new(0);
        let result = with_retries("1abc", &no_delay(3), |n| {
            calls.set(n);
            if n < 2 { Err("HTTP error 503".into()) } else { Ok(()) }
        });
        assert!(result.is_ok());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn exhaustion_reports_attempts_and_last_error() {
        let calls = Cell::new(0);
        let err = with_retries("1abc", &no_delay(3), |n| {
            calls.set(calls.get() + 1);
            Err(format!("failure {}", n))
        })
        .unwrap_err();
        assert_eq!(calls.get(), 3);
        match err {
            FetchError::Exhausted { id, attempts, last } => {
                assert_eq!(id, "1abc");
                assert_eq!(attempts, 3);
                assert_eq!(last, "failure 3");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_retries_still_attempts_once() {
        let calls = Cell::new(0);
        let _ = with_retries("1abc", &no_delay(0), |_| {
            calls.set(calls.get() + 1);
            Err("nope".into())
        });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn invalid_id_is_rejected_before_any_request() {
        let dir = tempfile::TempDir::new().unwrap();
        let fetcher = RcsbFetcher::new(no_delay(1));
        let err = fetcher.fetch("bad id", &dir.path().join("x.pdb")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidId(_)));
    }

    /// Serve each canned HTTP response to one connection, in order.
    fn serve(responses: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn download_writes_body_to_destination() {
        let body = "ATOM      1  N   MET A   1      38.198  19.582  28.998  1.00 45.94           N\nEND\n";
        let base = serve(vec![format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )]);
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("1ABC.pdb");

        RcsbFetcher::new(no_delay(1))
            .with_base_url(base)
            .fetch("1abc", &dest)
            .unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), body);
    }

    #[test]
    fn truncated_body_then_server_error_leaves_no_file() {
        let base = serve(vec![
            "HTTP/1.1 200 OK\r\nContent-Length: 100\r\nConnection: close\r\n\r\nATOM  short".to_string(),
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        ]);
        let dir = tempfile::TempDir::new().unwrap();
        let dest = dir.path().join("1ABC.pdb");

        let err = RcsbFetcher::new(no_delay(2))
            .with_base_url(base)
            .fetch("1abc", &dest)
            .unwrap_err();

        assert!(matches!(err, FetchError::Exhausted { attempts: 2, .. }));
        assert!(!dest.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn mirror_url_keeps_rcsb_layout() {
        assert_eq!(
            structure_url("http://127.0.0.1:8080/", "4hhb"),
            "http://127.0.0.1:8080/4HHB.pdb"
        );
    }
}
