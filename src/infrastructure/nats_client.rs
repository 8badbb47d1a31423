//! NATS client for the shared report store

use std::time::Duration;

use async_nats::jetstream::{self, Context as JetStreamContext};
use async_nats::{Client, ConnectOptions};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors that can occur when working with NATS
#[derive(Debug, Clone, Error)]
pub enum NatsError {
    /// Failed to establish connection to NATS server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Error occurred in JetStream operations
    #[error("JetStream error: {0}")]
    JetStreamError(String),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Configuration for NATS client connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NatsConfig {
    /// NATS server URL (e.g., "nats://localhost:4222")
    pub url: String,

    /// Optional username for authentication
    pub user: Option<String>,

    /// Optional password for authentication
    pub password: Option<String>,

    /// Whether TLS is required
    pub tls_required: bool,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Reconnect interval in seconds
    pub reconnect_interval_secs: u64,

    /// Maximum reconnect attempts (0 = infinite)
    pub max_reconnects: usize,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            url: "nats://localhost:4222".to_string(),
            user: None,
            password: None,
            tls_required: false,
            connection_timeout_secs: 10,
            reconnect_interval_secs: 5,
            max_reconnects: 0, // Infinite reconnects
        }
    }
}

impl NatsConfig {
    /// Configuration pointing at a specific server URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// NATS client wrapper with JetStream support
#[derive(Debug, Clone)]
pub struct NatsClient {
    /// The underlying NATS client
    client: Client,
    /// JetStream context for persistent storage
    jetstream: JetStreamContext,
    /// Configuration used to establish the connection
    config: NatsConfig,
}

impl NatsClient {
    /// Connect to NATS server with the provided configuration
    pub async fn connect(config: NatsConfig) -> Result<Self, NatsError> {
        let mut options = ConnectOptions::new()
            .connection_timeout(Duration::from_secs(config.connection_timeout_secs))
            .reconnect_delay_callback(move |attempts| {
                if config.max_reconnects > 0 && attempts >= config.max_reconnects {
                    // Stop reconnecting after max attempts
                    Duration::from_secs(0)
                } else {
                    Duration::from_secs(config.reconnect_interval_secs)
                }
            })
            .event_callback(|event| async move {
                match event {
                    async_nats::Event::Disconnected => warn!("NATS disconnected"),
                    async_nats::Event::Connected => info!("NATS connected"),
                    async_nats::Event::ClientError(err) => warn!("NATS client error: {err}"),
                    _ => {}
                }
            });

        // Add authentication if provided
        if let (Some(user), Some(password)) = (&config.user, &config.password) {
            options = options.user_and_password(user.clone(), password.clone());
        }

        // Add TLS if required
        if config.tls_required {
            options = options.require_tls(true);
        }

        let client = options.connect(&config.url).await.map_err(|e| {
            NatsError::ConnectionFailed(format!("Failed to connect to {}: {}", config.url, e))
        })?;

        let jetstream = jetstream::new(client.clone());

        Ok(Self {
            client,
            jetstream,
            config,
        })
    }

    /// Get the underlying NATS client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the JetStream context
    pub fn jetstream(&self) -> &JetStreamContext {
        &self.jetstream
    }

    /// Get the configuration
    pub fn config(&self) -> &NatsConfig {
        &self.config
    }

    /// Check if the client is connected
    pub async fn is_connected(&self) -> bool {
        // Try to flush to check connection
        self.client.flush().await.is_ok()
    }
}
