//! Application state shared across all request handlers.
//!
//! This module defines the `AppState` struct which holds all shared resources and
//! dependencies needed by the application. The state is initialized once during startup
//! and then cloned for each request handler through Axum's state extraction.
//!
//! The state includes:
//! - Database connection pool for data persistence
//! - HTTP client for external API requests
//! - Payment gateway client for outbound payment verification
//! - Connection registry for real-time WebSocket delivery
//! - Application configuration

use sea_orm::DatabaseConnection;

use super::{
    config::Config, realtime::registry::ConnectionRegistry,
    service::payment::gateway::PaymentGatewayClient,
};

/// Application state containing shared resources and dependencies.
///
/// This struct holds all the shared state that needs to be accessible across
/// request handlers. It is initialized once during server startup and then
/// cloned (cheaply, as it contains reference-counted or cloneable types) for
/// each incoming request via Axum's state extraction.
///
/// All fields use cheap-to-clone types:
/// - `DatabaseConnection` is a connection pool (clones share the pool)
/// - `reqwest::Client` uses an `Arc` internally
/// - `PaymentGatewayClient` wraps the reqwest client plus configuration
/// - `ConnectionRegistry` uses an `Arc` for its shared tables
/// - `Config` is plain owned data
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for accessing persistent storage.
    ///
    /// This connection is shared across all requests and manages a pool of
    /// connections to the SQLite database.
    pub db: DatabaseConnection,

    /// HTTP client for making external API requests.
    ///
    /// Configured with security settings (no redirects) to prevent SSRF
    /// vulnerabilities, and a request timeout so that a stalled upstream
    /// surfaces as a transient failure instead of hanging the handler.
    pub http_client: reqwest::Client,

    /// Client for the external payment gateway.
    ///
    /// Used by the payment service to verify gateway references when a
    /// gateway base URL is configured.
    pub gateway: PaymentGatewayClient,

    /// Registry of live WebSocket connections.
    ///
    /// Tracks connection ids, their authenticated users, and room
    /// memberships, and routes outbound real-time messages.
    pub registry: ConnectionRegistry,

    /// Application configuration loaded from the environment.
    pub config: Config,
}

impl AppState {
    /// Creates a new application state with the provided dependencies.
    ///
    /// This constructor is called once during server startup after all
    /// dependencies have been initialized. The resulting state is then
    /// provided to the Axum router for use in request handlers.
    ///
    /// # Arguments
    /// - `db` - Database connection pool
    /// - `http_client` - HTTP client for external API requests
    /// - `gateway` - Payment gateway client
    /// - `registry` - Connection registry for real-time delivery
    /// - `config` - Application configuration
    ///
    /// # Returns
    /// - `AppState` - Initialized application state ready for use
    pub fn new(
        db: DatabaseConnection,
        http_client: reqwest::Client,
        gateway: PaymentGatewayClient,
        registry: ConnectionRegistry,
        config: Config,
    ) -> Self {
        Self {
            db,
            http_client,
            gateway,
            registry,
            config,
        }
    }
}
