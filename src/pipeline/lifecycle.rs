use super::assembler::Pipeline;
use crate::domain::error::{ConfigError, Result};
use crate::registry::constructors;
use crate::schema::ValidationFinding;
use opentelemetry::global;
use opentelemetry_sdk::trace::TracerProvider;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Set once a provider has been made the process-wide provider.
static GLOBAL_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Attaches a bounded, run-once shutdown to an assembled pipeline.
#[derive(Debug, Clone, Copy)]
pub struct LifecycleBinder {
    timeout: Duration,
}

impl LifecycleBinder {
    /// Shutdown bound used when none is configured.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Takes ownership of `pipeline` and returns it with its shutdown bound.
    ///
    /// The returned value shuts the pipeline down when dropped, so holding it
    /// for the life of the process (in `main`, or a static the caller owns)
    /// is how exit-time flushing is arranged.
    #[must_use]
    pub fn bind(&self, pipeline: Pipeline) -> BoundPipeline {
        let handle = ShutdownHandle {
            state: Arc::new(ShutdownState {
                provider: pipeline.provider.clone(),
                timeout: self.timeout,
                done: AtomicBool::new(false),
            }),
        };
        tracing::debug!(
            processors = pipeline.processor_count(),
            timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            "pipeline bound"
        );
        BoundPipeline {
            pipeline,
            handle,
            findings: Vec::new(),
        }
    }
}

impl Default for LifecycleBinder {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

struct ShutdownState {
    provider: Option<TracerProvider>,
    timeout: Duration,
    done: AtomicBool,
}

/// A cloneable trigger for a pipeline's shutdown.
///
/// Hand this to a signal handler or an exit routine. All clones share one
/// run-once flag with the [`BoundPipeline`] they came from.
#[derive(Clone)]
pub struct ShutdownHandle {
    state: Arc<ShutdownState>,
}

impl ShutdownHandle {
    /// Flushes every processor, then shuts the provider down.
    ///
    /// Only the first call does anything; later calls return `Ok(())`. The
    /// work runs on a helper thread and is abandoned after the configured
    /// timeout, so a stuck exporter cannot hold the process open.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ShutdownTimedOut`] if flushing did not finish in time
    /// - [`ConfigError::Shutdown`] if a processor reported a flush or shutdown error
    /// - [`ConfigError::Io`] if the helper thread could not be started
    pub fn shutdown(&self) -> Result<()> {
        if self.state.done.swap(true, Ordering::SeqCst) {
            tracing::debug!("pipeline already shut down");
            return Ok(());
        }
        let Some(provider) = self.state.provider.clone() else {
            return Ok(());
        };

        let span = tracing::debug_span!("shutdown_pipeline");
        let _enter = span.enter();

        let (tx, rx) = mpsc::channel();
        std::thread::Builder::new()
            .name("otel-shutdown".to_string())
            .spawn(move || {
                let mut errors: Vec<String> = provider
                    .force_flush()
                    .into_iter()
                    .filter_map(|result| result.err())
                    .map(|e| format!("flush: {e}"))
                    .collect();
                if let Err(e) = provider.shutdown() {
                    errors.push(e.to_string());
                }
                let _ = tx.send(errors);
            })?;

        let timeout = self.state.timeout;
        match rx.recv_timeout(timeout) {
            Ok(errors) if errors.is_empty() => {
                tracing::debug!("pipeline shut down");
                Ok(())
            }
            Ok(errors) => Err(ConfigError::Shutdown(errors.join("; "))),
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(timeout = ?timeout, "pipeline shutdown timed out");
                Err(ConfigError::ShutdownTimedOut(timeout))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ConfigError::Shutdown(
                "shutdown thread exited without reporting".to_string(),
            )),
        }
    }

    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.state.done.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ShutdownHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownHandle")
            .field("timeout", &self.state.timeout)
            .field("done", &self.state.done)
            .finish_non_exhaustive()
    }
}

/// An assembled pipeline with its lifecycle attached.
///
/// Dropping it shuts the pipeline down if nobody did so explicitly.
pub struct BoundPipeline {
    pipeline: Pipeline,
    handle: ShutdownHandle,
    findings: Vec<ValidationFinding>,
}

impl BoundPipeline {
    pub(crate) fn with_findings(mut self, findings: Vec<ValidationFinding>) -> Self {
        self.findings = findings;
        self
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn processor_count(&self) -> usize {
        self.pipeline.processor_count()
    }

    #[must_use]
    pub fn tracer_provider(&self) -> Option<&TracerProvider> {
        self.pipeline.tracer_provider()
    }

    /// Schema findings reported while the configuration was applied.
    ///
    /// Always empty under the strict validation policy, which refuses to
    /// assemble when there are any.
    #[must_use]
    pub fn findings(&self) -> &[ValidationFinding] {
        &self.findings
    }

    /// See [`ShutdownHandle::shutdown`].
    ///
    /// # Errors
    ///
    /// As [`ShutdownHandle::shutdown`].
    pub fn shutdown(&self) -> Result<()> {
        self.handle.shutdown()
    }

    #[must_use]
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn is_shut_down(&self) -> bool {
        self.handle.is_shut_down()
    }

    /// Makes this pipeline's provider, and its propagators if any, the
    /// process-wide ones used by `opentelemetry::global`.
    ///
    /// A disabled pipeline has nothing to install and returns `Ok(())`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::GlobalProviderInstalled`] if any pipeline was installed before
    /// - [`ConfigError::Shutdown`] if this pipeline is already shut down
    pub fn install_global(&self) -> Result<()> {
        let Some(provider) = self.pipeline.tracer_provider() else {
            tracing::debug!("SDK disabled, no provider to install");
            return Ok(());
        };
        if self.is_shut_down() {
            return Err(ConfigError::Shutdown(
                "cannot install a pipeline that is already shut down".to_string(),
            ));
        }
        if GLOBAL_INSTALLED.swap(true, Ordering::SeqCst) {
            return Err(ConfigError::GlobalProviderInstalled);
        }

        global::set_tracer_provider(provider.clone());
        let propagators = self.pipeline.propagators();
        if !propagators.is_empty() {
            global::set_text_map_propagator(constructors::propagator(propagators));
        }
        tracing::debug!(
            processors = self.pipeline.processor_count(),
            propagators = propagators.len(),
            "installed process-wide tracer provider"
        );
        Ok(())
    }
}

impl Drop for BoundPipeline {
    fn drop(&mut self) {
        if self.handle.is_shut_down() {
            return;
        }
        if let Err(e) = self.handle.shutdown() {
            tracing::warn!(error = %e, "pipeline shutdown on drop failed");
        }
    }
}

impl fmt::Debug for BoundPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundPipeline")
            .field("pipeline", &self.pipeline)
            .field("shut_down", &self.handle.is_shut_down())
            .field("findings", &self.findings)
            .finish()
    }
}
