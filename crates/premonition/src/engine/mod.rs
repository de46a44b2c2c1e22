//! The reconstruction engine.
//!
//! [`Premonition`] owns the transport, the observer and the request limiter.
//! Discovery and type resolution live in the `discover` and `resolve`
//! submodules; this module sequences them into a full run.

mod discover;
mod resolve;

pub use resolve::RootTypenames;

use crate::observer::{Observer, ProbeEvent, TracingObserver};
use crate::schema::{Field, InputValue, Schema};
use crate::signature::TypeKind;
use crate::template::{DocumentTemplate, Wordlist};
use crate::transport::Transport;
use crate::{Config, GraphQLResponse, Result};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Where a run starts from.
#[derive(Debug, Clone, Default)]
pub enum InitialState {
    /// Probe the root operation typenames first.
    #[default]
    Fresh,
    /// Continue from a previously reconstructed schema.
    Snapshot(Schema),
}

/// The result of a run, including what had to be skipped.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub schema: Schema,
    /// The type whose fields were enumerated.
    pub container: String,
    /// Fields found by name whose type could not be resolved.
    pub skipped_fields: Vec<String>,
    /// `(field, argument)` pairs whose argument type could not be resolved.
    pub skipped_arguments: Vec<(String, String)>,
    /// Number of documents sent.
    pub requests: usize,
}

impl Reconstruction {
    /// Whether anything was skipped for lack of type information.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped_fields.is_empty() && self.skipped_arguments.is_empty()
    }
}

/// Per-field pipeline outcome, applied to the schema by a single writer.
enum FieldOutcome {
    Resolved {
        field: Field,
        skipped_arguments: Vec<String>,
    },
    Unresolved(String),
}

/// Blind schema reconstruction against one oracle.
///
/// ```no_run
/// use premonition::{Config, DocumentTemplate, HttpTransport, InitialState, Premonition, Wordlist};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Config::new("https://api.example.com/graphql").with_bucket_size(32);
/// let transport = HttpTransport::new(&config)?;
/// let engine = Premonition::new(config, transport)?;
///
/// let template = DocumentTemplate::new("mutation { FUZZ }")?;
/// let wordlist: Wordlist = ["createUser", "deleteUser"].into_iter().collect();
/// let run = engine.run(&template, &wordlist, InitialState::Fresh).await?;
/// println!("{}", run.schema.to_json_string_pretty()?);
/// # Ok(())
/// # }
/// ```
pub struct Premonition<T> {
    transport: T,
    config: Config,
    observer: Arc<dyn Observer>,
    permits: Semaphore,
    requests: AtomicUsize,
}

impl<T: Transport> Premonition<T> {
    /// Creates an engine that reports to a [`TracingObserver`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::PremonitionError::InvalidConfig`] if `config` fails
    /// validation.
    pub fn new(config: Config, transport: T) -> Result<Self> {
        config.validate()?;
        let permits = Semaphore::new(config.concurrency.min(Semaphore::MAX_PERMITS));
        Ok(Self {
            transport,
            config,
            observer: Arc::new(TracingObserver),
            permits,
            requests: AtomicUsize::new(0),
        })
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Documents sent so far by this engine.
    #[must_use]
    pub fn requests_sent(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn emit(&self, event: ProbeEvent) {
        self.observer.on_event(&event);
    }

    /// Sends one document, waiting for a free slot under the concurrency limit.
    async fn send(&self, document: &str) -> Result<GraphQLResponse> {
        let _permit = self.permits.acquire().await.ok();
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.emit(ProbeEvent::ProbeSent {
            document: document.to_string(),
        });
        self.transport.post(document).await
    }

    /// Runs a full reconstruction of the template's container type.
    ///
    /// The schema is only mutated here, after every field pipeline has
    /// finished, so field order in the output is the sorted order of the
    /// discovered names regardless of concurrency.
    ///
    /// # Errors
    ///
    /// Transport failures and a missing container typename abort the run.
    /// Unresolvable types do not; they are reported in the
    /// [`Reconstruction`].
    #[tracing::instrument(skip_all, fields(template = template.as_str(), words = wordlist.len()))]
    pub async fn run(
        &self,
        template: &DocumentTemplate,
        wordlist: &Wordlist,
        initial: InitialState,
    ) -> Result<Reconstruction> {
        let mut schema = match initial {
            InitialState::Fresh => self.fetch_root_typenames().await?.into_schema(),
            InitialState::Snapshot(schema) => {
                tracing::info!(types = schema.types.len(), "Resuming from schema snapshot");
                schema
            }
        };

        let container = self.probe_container_typename(template).await?;
        schema.register_type(&container, TypeKind::Object);

        let field_names = self.discover_fields(template, wordlist).await?;
        tracing::info!(%container, fields = field_names.len(), "Field discovery complete");

        let outcomes = join_all(
            field_names
                .iter()
                .map(|name| self.probe_field(template, wordlist, name)),
        )
        .await;

        let mut skipped_fields = Vec::new();
        let mut skipped_arguments = Vec::new();
        for outcome in outcomes {
            match outcome? {
                FieldOutcome::Resolved {
                    field,
                    skipped_arguments: skipped,
                } => {
                    for argument in &field.args {
                        schema.register_type(
                            &argument.type_ref.name,
                            role_kind(argument.type_ref.kind, TypeKind::InputObject),
                        );
                    }
                    let field_type = field.type_ref.clone();
                    skipped_arguments.extend(
                        skipped
                            .into_iter()
                            .map(|argument| (field.name.clone(), argument)),
                    );
                    schema.add_field(&container, field);
                    schema.register_type(
                        &field_type.name,
                        role_kind(field_type.kind, TypeKind::Object),
                    );
                }
                FieldOutcome::Unresolved(name) => skipped_fields.push(name),
            }
        }

        let requests = self.requests_sent();
        tracing::info!(
            types = schema.types.len(),
            skipped_fields = skipped_fields.len(),
            skipped_arguments = skipped_arguments.len(),
            requests,
            "Reconstruction complete"
        );

        Ok(Reconstruction {
            schema,
            container,
            skipped_fields,
            skipped_arguments,
            requests,
        })
    }

    /// Resolves one field's type and, for non-scalar fields, its arguments.
    async fn probe_field(
        &self,
        template: &DocumentTemplate,
        wordlist: &Wordlist,
        name: &str,
    ) -> Result<FieldOutcome> {
        let Some(type_ref) = self.resolve_field_type(template, name).await? else {
            return Ok(FieldOutcome::Unresolved(name.to_string()));
        };
        let mut field = Field::new(name, type_ref);
        let mut skipped_arguments = Vec::new();

        if field.type_ref.is_scalar() {
            self.emit(ProbeEvent::ScalarFieldSkipped {
                field: name.to_string(),
                type_name: field.type_ref.name.clone(),
            });
            return Ok(FieldOutcome::Resolved {
                field,
                skipped_arguments,
            });
        }

        let arguments = self.discover_arguments(template, name, wordlist).await?;
        let resolved = join_all(
            arguments
                .iter()
                .map(|argument| self.resolve_argument_type(template, name, argument)),
        )
        .await;

        for (argument, type_ref) in arguments.into_iter().zip(resolved) {
            match type_ref? {
                Some(type_ref) => field.args.push(InputValue::new(argument, type_ref)),
                None => skipped_arguments.push(argument),
            }
        }

        Ok(FieldOutcome::Resolved {
            field,
            skipped_arguments,
        })
    }
}

/// Built-in scalars keep their kind; other types take the kind implied by
/// where they were referenced.
const fn role_kind(decoded: TypeKind, role: TypeKind) -> TypeKind {
    match decoded {
        TypeKind::Scalar => TypeKind::Scalar,
        _ => role,
    }
}
