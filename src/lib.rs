//! Multi-tenant authentication and license-gating engine.
//!
//! The crate is the single source of truth for three questions a product
//! module has to ask before doing anything on behalf of a caller: is this
//! caller who they claim to be, are they allowed to act, and is their
//! organization entitled to use the product right now.
//!
//! Routing, persistence and bootstrap live outside this crate and talk to it
//! through the [`services::Directory`], [`services::TokenStore`] and
//! [`services::AuditSink`] traits plus the [`services::AuthService`] entry
//! points.

pub mod config;
pub mod dtos;
pub mod models;
pub mod services;
pub mod utils;

pub use config::GatewayConfig;
pub use services::{AuthService, ServiceError, TokenError, TokenService};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured JSON logging for the process hosting the gateway.
///
/// `RUST_LOG` wins over the configured level when set.
pub fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .json()
                .flatten_event(true),
        )
        .init();
}
