// src/telemetry.rs - Best-effort remote log sink
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::LogSinkConfig;
use crate::errors::SinkError;

/// Severity of a remote log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

/// Record posted to the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub stack: String,
    pub level: LogLevel,
    pub package: String,
    pub message: String,
}

/// Destination for remote log lines
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError>;
}

/// Posts entries as JSON to a fixed collector endpoint
pub struct RemoteLogSink {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl RemoteLogSink {
    pub fn new(
        endpoint: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token,
        })
    }
}

#[async_trait]
impl LogSink for RemoteLogSink {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError> {
        let mut request = self.client.post(&self.endpoint).json(entry);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(SinkError::Status(response.status().as_u16()));
        }

        Ok(())
    }
}

/// Drops every entry
#[derive(Debug, Default)]
pub struct NoopLogSink;

#[async_trait]
impl LogSink for NoopLogSink {
    async fn send(&self, _entry: &LogEntry) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Keeps entries in memory
#[derive(Debug, Default)]
pub struct BufferedLogSink {
    entries: Mutex<Vec<LogEntry>>,
}

impl BufferedLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything received so far
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl LogSink for BufferedLogSink {
    async fn send(&self, entry: &LogEntry) -> Result<(), SinkError> {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry.clone()),
            Err(poisoned) => poisoned.into_inner().push(entry.clone()),
        }
        Ok(())
    }
}

type FailureObserver = Arc<dyn Fn(&SinkError) + Send + Sync>;

/// Fire-and-forget handle used by the rest of the service.
///
/// `emit` returns immediately. Sending happens on a spawned task and its
/// outcome never reaches the caller; failures only go to the observer.
#[derive(Clone)]
pub struct Telemetry {
    sink: Arc<dyn LogSink>,
    stack: String,
    on_failure: Option<FailureObserver>,
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("stack", &self.stack)
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

impl Telemetry {
    pub fn new(sink: Arc<dyn LogSink>, stack: impl Into<String>) -> Self {
        Self {
            sink,
            stack: stack.into(),
            on_failure: None,
        }
    }

    /// Telemetry that goes nowhere
    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopLogSink), "backend")
    }

    /// Builds the sink described by the configuration
    pub fn from_config(config: &LogSinkConfig) -> Result<Self, SinkError> {
        if !config.enabled {
            log::info!("Remote log sink disabled");
            return Ok(Self::new(Arc::new(NoopLogSink), config.stack.clone()));
        }

        let sink = RemoteLogSink::new(
            config.endpoint.clone(),
            config.token.clone(),
            Duration::from_secs(config.timeout_seconds),
        )?;
        log::info!("Remote log sink enabled, posting to {}", config.endpoint);

        Ok(Self::new(Arc::new(sink), config.stack.clone()))
    }

    /// Installs a callback that sees every failed send
    pub fn with_failure_observer<F>(mut self, observer: F) -> Self
    where
        F: Fn(&SinkError) + Send + Sync + 'static,
    {
        self.on_failure = Some(Arc::new(observer));
        self
    }

    /// Queues one log line for the remote collector
    pub fn emit(&self, level: LogLevel, package: &str, message: impl Into<String>) {
        let entry = LogEntry {
            stack: self.stack.clone(),
            level,
            package: package.to_string(),
            message: message.into(),
        };

        // outside a runtime there is nothing to send on
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };

        let sink = self.sink.clone();
        let on_failure = self.on_failure.clone();
        handle.spawn(async move {
            if let Err(e) = sink.send(&entry).await {
                if let Some(observer) = on_failure {
                    observer(&e);
                }
            }
        });
    }

    pub fn info(&self, package: &str, message: impl Into<String>) {
        self.emit(LogLevel::Info, package, message);
    }

    pub fn warn(&self, package: &str, message: impl Into<String>) {
        self.emit(LogLevel::Warn, package, message);
    }

    pub fn error(&self, package: &str, message: impl Into<String>) {
        self.emit(LogLevel::Error, package, message);
    }

    pub fn debug(&self, package: &str, message: impl Into<String>) {
        self.emit(LogLevel::Debug, package, message);
    }
}
