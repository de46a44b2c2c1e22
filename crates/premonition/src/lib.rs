//! Blind GraphQL schema reconstruction.
//!
//! When introspection is disabled, a GraphQL server still validates every
//! document it receives, and its validation errors leak schema details: which
//! names are real fields, which arguments a field accepts and what type a
//! field or argument expects. This crate sends carefully shaped probe
//! documents and reads those diagnostics back to rebuild the schema.
//!
//! # Examples
//!
//! ## One-step reconstruction
//!
//! ```no_run
//! use premonition::{reconstruct, Config, DocumentTemplate, Wordlist};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://api.example.com/graphql");
//!     let template = DocumentTemplate::new("mutation { FUZZ }")?;
//!     let wordlist: Wordlist = ["createUser", "login"].into_iter().collect();
//!
//!     let schema = reconstruct(config, &template, &wordlist).await?;
//!     println!("{}", schema.to_json_string_pretty()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom transport and observer
//!
//! Anything implementing [`Transport`] can stand in for HTTP, and an
//! [`Observer`] receives every [`ProbeEvent`]:
//!
//! ```no_run
//! use premonition::{Config, DocumentTemplate, HttpTransport, InitialState, Premonition,
//!     RecordingObserver, Wordlist};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://api.example.com/graphql")
//!         .with_header("Authorization", "Bearer my-token")
//!         .with_concurrency(4);
//!     let observer = Arc::new(RecordingObserver::new());
//!     let engine = Premonition::new(config.clone(), HttpTransport::new(&config)?)?
//!         .with_observer(observer.clone());
//!
//!     let template = DocumentTemplate::new("query { FUZZ }")?;
//!     let wordlist: Wordlist = ["user", "users"].into_iter().collect();
//!     let run = engine.run(&template, &wordlist, InitialState::Fresh).await?;
//!     println!("{} events, complete: {}", observer.events().len(), run.is_complete());
//!     Ok(())
//! }
//! ```

pub mod classify;
mod config;
mod engine;
mod error;
mod observer;
mod response;
mod schema;
mod signature;
mod template;
mod transport;

pub use config::{
    Config, DEFAULT_BUCKET_SIZE, DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_TIMEOUT_SECS,
};
pub use engine::{InitialState, Premonition, Reconstruction, RootTypenames};
pub use error::{PremonitionError, Result};
pub use observer::{Observer, ProbeEvent, RecordingObserver, TracingObserver};
pub use response::{ErrorExtensions, GraphQLError, GraphQLResponse, PathSegment};
pub use schema::{Field, InputValue, NamedType, Schema};
pub use signature::{is_builtin_scalar, SignatureError, TypeKind, TypeRef, BUILTIN_SCALARS};
pub use template::{DocumentTemplate, RootOperation, Wordlist, PLACEHOLDER, WRONG_FIELD};
pub use transport::{HttpTransport, Transport};

/// Reconstructs the template's container type over HTTP from a fresh start.
///
/// This is a convenience wrapper around [`HttpTransport`] and
/// [`Premonition::run`].
///
/// # Errors
///
/// Returns an error if the configuration is invalid, a request fails, or the
/// oracle does not reveal the container typename.
#[tracing::instrument(skip_all, fields(url = %config.url))]
pub async fn reconstruct(
    config: Config,
    template: &DocumentTemplate,
    wordlist: &Wordlist,
) -> Result<Schema> {
    tracing::info!("Starting reconstruction");
    let transport = HttpTransport::new(&config)?;
    let engine = Premonition::new(config, transport)?;
    let run = engine.run(template, wordlist, InitialState::Fresh).await?;
    Ok(run.schema)
}
