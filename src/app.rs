//! Application assembly.
//!
//! # Responsibilities
//! - Build the session store and built-in middleware from a [`ServerConfig`]
//! - Compose built-ins, user middleware and the router into one handler
//! - Start the session housekeeper on request
//!
//! # Design Decisions
//! - Built-ins always run outside user middleware, so user code sees every
//!   request attribute they provide
//! - An app without routes fails to build instead of answering 404 forever

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{load_config, ConfigError, ServerConfig};
use crate::middleware::builtins::{
    AccessLogMiddleware, CompressionMiddleware, CookieMiddleware, LocaleMiddleware,
    RequestIdMiddleware, SessionMiddleware,
};
use crate::middleware::pipeline::{BoxHandler, Middleware, Pipeline};
use crate::routing::{Router, RoutingError};
use crate::session::{Housekeeper, HousekeepingHandle, InMemorySessionStore, SessionStore};

pub struct App {
    config: ServerConfig,
    store: Arc<dyn SessionStore>,
    middleware: Vec<Arc<dyn Middleware>>,
    router: Router,
}

impl App {
    /// An app with an in-memory session store configured from `config`.
    pub fn new(config: ServerConfig) -> Self {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::from_config(&config.session));
        Self {
            config,
            store,
            middleware: Vec::new(),
            router: Router::new(),
        }
    }

    /// Load, validate and apply a TOML configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(load_config(path)?))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Replace the session store.
    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    /// Add user middleware; it runs inside the built-ins, in insertion order.
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Register routes.
    pub fn routes(mut self, register: impl FnOnce(&mut Router)) -> Self {
        register(&mut self.router);
        self
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    /// Spawn the session housekeeper on the current tokio runtime.
    pub fn spawn_housekeeping(&self) -> HousekeepingHandle {
        let interval = Duration::from_secs(self.config.session.housekeeping_interval_secs.max(1));
        Housekeeper::new(self.store.clone(), interval).spawn()
    }

    /// Compose the full pipeline into a single handler.
    pub fn build(self) -> Result<BoxHandler, RoutingError> {
        let App {
            config,
            store,
            middleware,
            router,
        } = self;

        let route_count = router.len();
        let terminal = router.into_handler()?;

        let mut pipeline = Pipeline::new()
            .layer(RequestIdMiddleware::from_config(&config.observability))
            .layer(AccessLogMiddleware)
            .layer(CookieMiddleware)
            .layer(SessionMiddleware::new(store, &config.session))
            .layer(LocaleMiddleware::from_config(&config.i18n));
        if config.compression.enabled {
            pipeline = pipeline.layer(CompressionMiddleware::from_config(&config.compression));
        }
        let builtins = pipeline.len();
        for m in middleware {
            pipeline.push(m);
        }

        tracing::info!(
            routes = route_count,
            builtins,
            user_middleware = pipeline.len() - builtins,
            "Pipeline assembled"
        );
        Ok(pipeline.build(terminal))
    }
}
