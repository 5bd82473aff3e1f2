//! Server-side backend: ticketing API, real-time delivery, and business logic.
//!
//! Axum handles HTTP and the WebSocket upgrade, SeaORM handles persistence.
//! The ticket lifecycle (issue, verify, redeem, cancel) lives in the service
//! layer; the state transitions that must survive concurrent requests are
//! conditional updates in the data layer.
//!
//! # Layers
//!
//! - **Controller** (`controller/`) - HTTP handlers: access checks, DTO conversion
//! - **Service** (`service/`) - Domain rules between controllers and repositories
//! - **Data** (`data/`) - Repositories over the SeaORM entities
//! - **Model** (`model/`) - Parameter types passed between the layers
//! - **Error** (`error/`) - Error types and their HTTP response mapping
//! - **Middleware** (`middleware/`) - Session wrapper and auth guards
//!
//! # Infrastructure
//!
//! - **Configuration** (`config`) - Environment-based settings
//! - **State** (`state`) - Shared per-request state (db pool, clients, registry)
//! - **Startup** (`startup`) - Database, session store, and HTTP client setup
//! - **Router** (`router`) - Route table, security layers, API documentation
//! - **Scheduler** (`scheduler/`) - Cron sweeps (event completion)
//! - **Realtime** (`realtime/`) - Connection registry and per-socket dispatch
//!
//! A request enters through the router, passes the session middleware, and is
//! handled by a controller that resolves the caller through `AuthGuard`,
//! converts the DTO into a parameter model, and delegates to a service; the
//! service orchestrates repositories and hands a DTO back up. Real-time
//! notifications depart from the same controllers through the connection
//! registry rather than through the response.

pub mod config;
pub mod controller;
pub mod data;
pub mod error;
pub mod middleware;
pub mod model;
pub mod realtime;
pub mod router;
pub mod scheduler;
pub mod service;
pub mod startup;
pub mod state;
