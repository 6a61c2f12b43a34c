//! Remote sheet service
//!
//! Builds the published-sheet URL from the `[remote]` settings and fetches
//! the CSV body. The codec only ever sees the already-fetched text.

use std::sync::Arc;

use regex::{Captures, Regex};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::RemoteConfig;
use crate::infrastructure::traits::HttpClient;

const PLACEHOLDER: &str = r"\{(key|format|sheet|range|headers)\}";

/// Service fetching a published spreadsheet as CSV text.
pub struct RemoteService {
    http: Arc<dyn HttpClient>,
    remote: RemoteConfig,
    placeholder: Regex,
}

impl RemoteService {
    pub fn new(http: Arc<dyn HttpClient>, remote: RemoteConfig) -> ApplicationResult<Self> {
        let placeholder = Regex::new(PLACEHOLDER).map_err(|e| ApplicationError::Config {
            message: format!("invalid URL placeholder pattern: {}", e),
        })?;
        Ok(Self {
            http,
            remote,
            placeholder,
        })
    }

    /// Substitute `{key}`, `{format}`, `{sheet}`, `{range}`, `{headers}` into the URL template.
    ///
    /// Unknown placeholders are left untouched.
    pub fn link(&self) -> String {
        self.placeholder
            .replace_all(&self.remote.base_url, |caps: &Captures| {
                match &caps[1] {
                    "key" => self.remote.key.clone(),
                    "format" => self.remote.format.clone(),
                    "sheet" => self.remote.sheet.clone(),
                    "range" => self.remote.range.clone(),
                    "headers" => self.remote.headers.clone(),
                    other => format!("{{{}}}", other),
                }
            })
            .into_owned()
    }

    /// GET the sheet. Transport failures and non-200 statuses are `Fetch` errors.
    #[instrument(skip(self))]
    pub fn fetch_csv(&self) -> ApplicationResult<String> {
        if self.remote.key.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "remote.key is not set".into(),
            });
        }
        let url = self.link();
        debug!("fetching {}", url);

        let response = self.http.get(&url).map_err(|message| ApplicationError::Fetch {
            url: url.clone(),
            message,
        })?;
        if response.status != 200 {
            return Err(ApplicationError::Fetch {
                url,
                message: format!("HTTP status {}", response.status),
            });
        }
        debug!("fetched {} bytes", response.body.len());
        Ok(response.body)
    }
}
