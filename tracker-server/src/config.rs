use std::{sync::Arc, time::Duration};
use tracker_engine::{DispatchMode, RollupEngine};
use tracker_notify::{LogNotifier, ReleaseNotifier};
use tracker_store::ReleaseStore;

/// Security configuration for the tracker server.
#[derive(Clone, Debug)]
pub struct SecurityConfig {
    /// Allowed origins for CORS (empty = allow all)
    pub allowed_origins: Vec<String>,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
    /// Request timeout duration (default: 30 seconds)
    pub request_timeout: Duration,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            max_body_size: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SecurityConfig {
    /// Permissive CORS and a longer timeout for local work
    pub fn development() -> Self {
        Self { request_timeout: Duration::from_secs(60), ..Self::default() }
    }

    /// Only the given origins may call the API from a browser
    pub fn production(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins, ..Self::default() }
    }
}

/// Configuration for the tracker server.
#[derive(Clone)]
pub struct ServerConfig {
    pub store: Arc<dyn ReleaseStore>,
    pub notifier: Arc<dyn ReleaseNotifier>,
    pub dispatch: DispatchMode,
    pub security: SecurityConfig,
}

impl ServerConfig {
    pub fn new(store: Arc<dyn ReleaseStore>) -> Self {
        Self {
            store,
            notifier: Arc::new(LogNotifier),
            dispatch: DispatchMode::default(),
            security: SecurityConfig::default(),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn ReleaseNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn with_security(mut self, security: SecurityConfig) -> Self {
        self.security = security;
        self
    }

    /// Configure allowed CORS origins
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.security.allowed_origins = origins;
        self
    }

    /// Configure maximum request body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.security.max_body_size = size;
        self
    }

    /// Configure request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.security.request_timeout = timeout;
        self
    }

    pub fn engine(&self) -> RollupEngine {
        RollupEngine::new(self.store.clone(), self.notifier.clone()).with_dispatch(self.dispatch)
    }
}
