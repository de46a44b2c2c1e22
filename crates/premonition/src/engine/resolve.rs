//! Type signatures, root operation typenames and the container typename.

use super::Premonition;
use crate::classify::{self, SignatureScan};
use crate::observer::ProbeEvent;
use crate::schema::Schema;
use crate::signature::TypeRef;
use crate::template::{DocumentTemplate, RootOperation, ROOT_TYPENAME_DOCUMENTS};
use crate::transport::Transport;
use crate::{PremonitionError, Result};

/// Names of the root operation types. `None` means the server does not
/// support that operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootTypenames {
    pub query: Option<String>,
    pub mutation: Option<String>,
    pub subscription: Option<String>,
}

impl RootTypenames {
    fn set(&mut self, operation: RootOperation, name: Option<String>) {
        match operation {
            RootOperation::Query => self.query = name,
            RootOperation::Mutation => self.mutation = name,
            RootOperation::Subscription => self.subscription = name,
        }
    }

    #[must_use]
    pub fn into_schema(self) -> Schema {
        Schema::new(self.query, self.mutation, self.subscription)
    }
}

const fn operation_label(operation: RootOperation) -> &'static str {
    match operation {
        RootOperation::Query => "queryType",
        RootOperation::Mutation => "mutationType",
        RootOperation::Subscription => "subscriptionType",
    }
}

impl<T: Transport> Premonition<T> {
    /// Resolves a field's type from the bare and nested-selection probes.
    ///
    /// Returns `Ok(None)` when neither probe leaks a signature.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a probe could not be sent.
    pub async fn resolve_field_type(
        &self,
        template: &DocumentTemplate,
        field: &str,
    ) -> Result<Option<TypeRef>> {
        self.resolve_type(field.to_string(), template.field_type_battery(field))
            .await
    }

    /// Resolves an argument's type by offering values of the wrong shape.
    ///
    /// Returns `Ok(None)` when no probe in the battery leaks a signature.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a probe could not be sent.
    pub async fn resolve_argument_type(
        &self,
        template: &DocumentTemplate,
        field: &str,
        argument: &str,
    ) -> Result<Option<TypeRef>> {
        self.resolve_type(
            format!("{field}.{argument}"),
            template.argument_type_battery(field, argument),
        )
        .await
    }

    /// Tries `battery` in order; the first parseable signature wins.
    #[tracing::instrument(skip(self, battery), fields(probes = battery.len()))]
    async fn resolve_type(&self, subject: String, battery: Vec<String>) -> Result<Option<TypeRef>> {
        for document in battery {
            let response = self.send(&document).await?;
            match classify::leaked_signature(&response) {
                SignatureScan::Found(type_ref) => {
                    self.emit(ProbeEvent::TypeResolved {
                        subject,
                        type_ref: type_ref.clone(),
                    });
                    return Ok(Some(type_ref));
                }
                SignatureScan::Malformed(signatures) => {
                    for signature in signatures {
                        self.emit(ProbeEvent::MalformedSignature { signature });
                    }
                }
                SignatureScan::Absent => match response.diagnostics() {
                    None => self.emit(ProbeEvent::NoSignal { document }),
                    Some(errors) => {
                        for error in errors {
                            self.emit(ProbeEvent::UnrecognizedDiagnostic {
                                code: error.code().map(str::to_string),
                                message: error.message.clone(),
                            });
                        }
                    }
                },
            }
        }

        self.emit(ProbeEvent::TypeUnresolved { subject });
        Ok(None)
    }

    /// Asks the server for the `__typename` of each root operation.
    ///
    /// An operation whose response has no data payload is recorded as absent.
    ///
    /// # Errors
    ///
    /// Returns a transport error if a probe could not be sent.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_root_typenames(&self) -> Result<RootTypenames> {
        let mut typenames = RootTypenames::default();
        for (operation, document) in ROOT_TYPENAME_DOCUMENTS {
            let response = self.send(document).await?;
            let name = if response.has_data() {
                response
                    .data
                    .as_ref()
                    .and_then(|data| data.get("__typename"))
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_string)
            } else {
                None
            };
            self.emit(ProbeEvent::RootTypename {
                operation: operation_label(operation),
                name: name.clone(),
            });
            typenames.set(operation, name);
        }
        Ok(typenames)
    }

    /// Names the template's container type from the `undefinedField`
    /// diagnostic a guaranteed-invalid field produces.
    ///
    /// # Errors
    ///
    /// Returns [`PremonitionError::MissingContainerTypename`] if the oracle
    /// does not answer with such a diagnostic, or a transport error.
    #[tracing::instrument(skip_all, fields(template = template.as_str()))]
    pub async fn probe_container_typename(&self, template: &DocumentTemplate) -> Result<String> {
        let document = template.typename_probe();
        let response = self.send(&document).await?;
        let name = classify::container_typename(&response)
            .ok_or(PremonitionError::MissingContainerTypename { document })?;
        self.emit(ProbeEvent::ContainerTypename { name: name.clone() });
        Ok(name)
    }
}
