//! Probe events and the observers that receive them.
//!
//! The engine never logs directly; it reports what it sees to an injected
//! [`Observer`]. [`TracingObserver`] forwards events to `tracing`, which is
//! what the CLI uses.

use crate::signature::TypeRef;
use std::sync::Mutex;

/// Something noteworthy that happened while probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeEvent {
    /// A probe document is about to be sent.
    ProbeSent { document: String },
    /// A response carried no diagnostics where some were expected.
    NoSignal { document: String },
    /// A diagnostic carried a code the classifier does not know.
    UnrecognizedDiagnostic { code: Option<String>, message: String },
    /// A diagnostic carried a type name that is not a valid signature.
    MalformedSignature { signature: String },
    RootTypename { operation: &'static str, name: Option<String> },
    ContainerTypename { name: String },
    FieldFound { field: String },
    ArgumentFound { field: String, argument: String },
    TypeResolved { subject: String, type_ref: TypeRef },
    /// No probe in the battery leaked a type; the subject is skipped.
    TypeUnresolved { subject: String },
    /// Argument discovery was skipped because the field is a built-in scalar.
    ScalarFieldSkipped { field: String, type_name: String },
}

/// Receives [`ProbeEvent`]s from the engine.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &ProbeEvent);
}

/// Forwards events to `tracing` at levels matching their importance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_event(&self, event: &ProbeEvent) {
        match event {
            ProbeEvent::ProbeSent { document } => {
                tracing::trace!(%document, "Sending probe");
            }
            ProbeEvent::NoSignal { document } => {
                tracing::warn!(%document, "Probe returned no diagnostics");
            }
            ProbeEvent::UnrecognizedDiagnostic { code, message } => {
                tracing::debug!(code = ?code, %message, "Unrecognized diagnostic");
            }
            ProbeEvent::MalformedSignature { signature } => {
                tracing::warn!(%signature, "Ignoring malformed type signature");
            }
            ProbeEvent::RootTypename { operation, name } => {
                tracing::debug!(operation, name = ?name, "Resolved root typename");
            }
            ProbeEvent::ContainerTypename { name } => {
                tracing::info!(typename = %name, "Resolved container typename");
            }
            ProbeEvent::FieldFound { field } => {
                tracing::debug!(%field, "Found valid field");
            }
            ProbeEvent::ArgumentFound { field, argument } => {
                tracing::debug!(%field, %argument, "Found valid argument");
            }
            ProbeEvent::TypeResolved { subject, type_ref } => {
                tracing::debug!(%subject, type_ref = %type_ref, "Resolved type");
            }
            ProbeEvent::TypeUnresolved { subject } => {
                tracing::warn!(%subject, "Could not resolve type, skipping");
            }
            ProbeEvent::ScalarFieldSkipped { field, type_name } => {
                tracing::debug!(%field, %type_name, "Skipping argument discovery for scalar field");
            }
        }
    }
}

/// Keeps every event in memory. Useful in tests and for post-run reports.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProbeEvent>>,
}

impl RecordingObserver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    #[must_use]
    pub fn events(&self) -> Vec<ProbeEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &ProbeEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
