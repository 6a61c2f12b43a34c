//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;
use std::time::Duration;

use crate::application::services::{ConversionService, RemoteService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, HttpClient, RealFileSystem, RealHttpClient};

/// Container holding settings and I/O boundaries; services are built on demand.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// HTTP abstraction
    pub http: Arc<dyn HttpClient>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let http = RealHttpClient::with_timeout(Duration::from_secs(settings.remote.timeout_secs));
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(http))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, http }
    }

    pub fn conversion_service(&self) -> ConversionService {
        ConversionService::new(self.fs.clone(), self.settings.clone())
    }

    pub fn remote_service(&self) -> ApplicationResult<RemoteService> {
        RemoteService::new(self.http.clone(), self.settings.remote.clone())
    }
}
