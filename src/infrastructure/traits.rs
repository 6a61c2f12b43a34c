//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;
use std::time::Duration;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
}

/// Body and status of a completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP GET abstraction.
pub trait HttpClient: Send + Sync {
    /// Issue a GET request. Transport failures are returned as `Err(message)`;
    /// any received response, whatever its status, is `Ok`.
    fn get(&self, url: &str) -> Result<HttpResponse, String>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }
}

/// Blocking HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct RealHttpClient {
    timeout: Duration,
}

impl Default for RealHttpClient {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

impl RealHttpClient {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl HttpClient for RealHttpClient {
    fn get(&self, url: &str) -> Result<HttpResponse, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("clubcodes/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| format!("create HTTP client: {}", e))?;

        let response = client.get(url).send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| format!("read response body: {}", e))?;
        Ok(HttpResponse { status, body })
    }
}
