//! A deterministic in-memory oracle for integration tests.
//!
//! The mock understands exactly the probe shapes the engine sends against the
//! `mutation { FUZZ }` template and answers the way a validating GraphQL
//! server with introspection disabled would.

#![allow(dead_code)]

use async_trait::async_trait;
use premonition::{GraphQLResponse, PremonitionError, Result, Transport};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const TEMPLATE: &str = "mutation { FUZZ }";

#[derive(Debug, Clone, Default)]
pub struct MockField {
    /// Signature leaked when the field is selected bare.
    pub bare: Option<&'static str>,
    /// Signature leaked when the field is selected with `{ lol }`.
    pub nested: Option<&'static str>,
    /// Accepted arguments and the signature each one leaks, if any.
    pub args: BTreeMap<&'static str, Option<&'static str>>,
}

impl MockField {
    pub fn bare(signature: &'static str) -> Self {
        Self {
            bare: Some(signature),
            ..Self::default()
        }
    }

    pub fn nested(signature: &'static str) -> Self {
        Self {
            nested: Some(signature),
            ..Self::default()
        }
    }

    pub fn silent() -> Self {
        Self::default()
    }

    pub fn arg(mut self, name: &'static str, signature: Option<&'static str>) -> Self {
        self.args.insert(name, signature);
        self
    }
}

#[derive(Debug)]
pub struct MockOracle {
    container: &'static str,
    fields: BTreeMap<&'static str, MockField>,
    subscriptions: bool,
    /// Report accepted argument names as a list instead of a joined string.
    list_arguments: bool,
    /// Answer every document with data and no diagnostics.
    silent: bool,
    documents: Mutex<Vec<String>>,
}

impl MockOracle {
    pub fn new(container: &'static str) -> Self {
        Self {
            container,
            fields: BTreeMap::new(),
            subscriptions: false,
            list_arguments: false,
            silent: false,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// An oracle that never reports a diagnostic.
    pub fn silent() -> Self {
        Self {
            silent: true,
            ..Self::new("Mutation")
        }
    }

    pub fn field(mut self, name: &'static str, field: MockField) -> Self {
        self.fields.insert(name, field);
        self
    }

    pub fn with_list_arguments(mut self) -> Self {
        self.list_arguments = true;
        self
    }

    /// Every document received so far, in arrival order.
    pub fn documents(&self) -> Vec<String> {
        self.documents.lock().unwrap().clone()
    }

    fn respond(&self, document: &str) -> Value {
        if self.silent {
            return json!({ "data": { "ok": true } });
        }
        match document {
            "query { __typename }" => return json!({ "data": { "__typename": "Query" } }),
            "mutation { __typename }" => {
                return json!({ "data": { "__typename": self.container } })
            }
            "subscription { __typename }" => {
                return if self.subscriptions {
                    json!({ "data": { "__typename": "Subscription" } })
                } else {
                    json!({ "errors": [{ "message": "Subscriptions are not supported" }] })
                };
            }
            _ => {}
        }

        let fragment = document
            .strip_prefix("mutation { ")
            .and_then(|rest| rest.strip_suffix(" }"))
            .unwrap_or_else(|| panic!("unexpected document: {document}"));

        let errors = if let Some(call) = fragment.strip_suffix("{lol}") {
            self.argument_bucket(call)
        } else if let Some(field) = fragment.strip_suffix(" { lol }") {
            self.nested_selection(field)
        } else if fragment.contains('(') {
            self.argument_value(fragment)
        } else {
            fragment
                .split_whitespace()
                .map(|token| self.selection(token))
                .collect()
        };
        json!({ "errors": errors })
    }

    fn selection(&self, token: &str) -> Value {
        match self.fields.get(token) {
            Some(field) => json!({
                "message": format!("Field \"{token}\" must have a selection of subfields."),
                "path": ["mutation", token],
                "extensions": { "code": "selectionMismatch", "typeName": field.bare }
            }),
            None => json!({
                "message": format!("Cannot query field \"{token}\" on type \"{}\".", self.container),
                "path": ["mutation", token],
                "extensions": { "code": "undefinedField", "typeName": self.container }
            }),
        }
    }

    fn nested_selection(&self, field: &str) -> Vec<Value> {
        let signature = self.fields.get(field).and_then(|field| field.nested);
        vec![json!({
            "message": format!("Cannot query field \"lol\" on \"{field}\"."),
            "path": ["mutation", field, "lol"],
            "extensions": { "code": "undefinedField", "typeName": signature }
        })]
    }

    fn argument_bucket(&self, call: &str) -> Vec<Value> {
        let (field, offered) = split_call(call);
        let accepted = self.fields.get(field).map(|field| &field.args);
        let mut errors = Vec::new();
        let mut valid = Vec::new();
        for name in offered {
            if accepted.is_some_and(|args| args.contains_key(name)) {
                valid.push(name);
            } else {
                errors.push(json!({
                    "message": format!("Unknown argument \"{name}\" on field \"{field}\"."),
                    "extensions": { "code": "argumentNotAccepted", "argumentName": name }
                }));
            }
        }
        if !valid.is_empty() {
            let arguments = if self.list_arguments {
                json!(valid)
            } else {
                json!(valid.join(", "))
            };
            errors.push(json!({
                "message": "Argument literals are incompatible.",
                "extensions": { "code": "argumentLiteralsIncompatible", "arguments": arguments }
            }));
        }
        errors
    }

    fn argument_value(&self, call: &str) -> Vec<Value> {
        let (field, offered) = split_call(call);
        let name = offered.first().copied().unwrap_or_default();
        let signature = self
            .fields
            .get(field)
            .and_then(|field| field.args.get(name));
        match signature {
            Some(signature) => vec![json!({
                "message": format!("Argument \"{name}\" has invalid value."),
                "extensions": {
                    "code": "argumentLiteralsIncompatible",
                    "typeName": signature,
                    "argumentName": name
                }
            })],
            None => vec![json!({
                "message": format!("Unknown argument \"{name}\" on field \"{field}\"."),
                "extensions": { "code": "argumentNotAccepted", "argumentName": name }
            })],
        }
    }
}

fn split_call(call: &str) -> (&str, Vec<&str>) {
    let open = call.find('(').expect("call has an opening paren");
    let close = call.rfind(')').expect("call has a closing paren");
    let names = call[open + 1..close]
        .split(", ")
        .filter_map(|pair| pair.split(':').next())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();
    (&call[..open], names)
}

#[async_trait]
impl Transport for MockOracle {
    async fn post(&self, document: &str) -> Result<GraphQLResponse> {
        self.documents.lock().unwrap().push(document.to_string());
        serde_json::from_value(self.respond(document))
            .map_err(|e| PremonitionError::Parse(e.to_string()))
    }
}

/// A transport whose every request fails at the network level.
#[derive(Debug, Default)]
pub struct UnreachableOracle;

#[async_trait]
impl Transport for UnreachableOracle {
    async fn post(&self, _document: &str) -> Result<GraphQLResponse> {
        Err(PremonitionError::Network("connection refused".to_string()))
    }
}

/// Wraps an oracle, holds every request open briefly and records the highest
/// number of requests that were in flight at once.
#[derive(Debug)]
pub struct InFlightOracle {
    inner: MockOracle,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightOracle {
    pub fn new(inner: MockOracle) -> Self {
        Self {
            inner,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for InFlightOracle {
    async fn post(&self, document: &str) -> Result<GraphQLResponse> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let response = self.inner.post(document).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
        response
    }
}

/// The oracle used by the end-to-end tests.
pub fn widget_oracle() -> MockOracle {
    MockOracle::new("Mutation")
        .field(
            "createWidget",
            MockField::bare("[WidgetPayload!]!")
                .arg("input", Some("CreateWidgetInput!"))
                .arg("dryRun", Some("Boolean"))
                .arg("secret", None),
        )
        .field("ok", MockField::bare("Boolean!"))
        .field("ghost", MockField::silent())
        .field(
            "deleteWidget",
            MockField::nested("DeletePayload").arg("id", Some("ID!")),
        )
}

/// Field names, argument names and noise, in a deliberately mixed order.
pub fn widget_wordlist() -> Vec<&'static str> {
    vec![
        "alpha", "createWidget", "input", "beta", "ok", "dryRun", "gamma", "ghost", "secret",
        "delta", "deleteWidget", "id", "epsilon",
    ]
}
