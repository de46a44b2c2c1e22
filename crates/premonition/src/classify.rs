//! The oracle classifier.
//!
//! Turns one response's diagnostics into a decision for the caller. Only a
//! fixed set of diagnostic codes is understood; anything else is either
//! mined for argument names (during argument discovery) or ignored.

use crate::response::{GraphQLError, GraphQLResponse};
use crate::signature::{bare_name, TypeRef};
use serde_json::Value;
use std::collections::BTreeSet;

/// Diagnostic codes the classifier recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// A real field was selected without its required sub-selection.
    SelectionMismatch,
    /// The selected name is not a field of the container type.
    UndefinedField,
    /// The offered argument name is not accepted by the field.
    ArgumentNotAccepted,
    Other(String),
}

impl DiagnosticCode {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "selectionMismatch" => Self::SelectionMismatch,
            "undefinedField" => Self::UndefinedField,
            "argumentNotAccepted" => Self::ArgumentNotAccepted,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn of(error: &GraphQLError) -> Option<Self> {
        error.code().map(Self::from_code)
    }

    /// Codes other than the three known ones may enumerate accepted arguments.
    #[must_use]
    pub const fn is_informative(&self) -> bool {
        matches!(self, Self::Other(_))
    }
}

/// What a single response says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<T> {
    /// The response carried no diagnostics at all.
    NoSignal,
    Signal(T),
}

impl<T: Default> Verdict<T> {
    /// Collapses "no signal" into the empty result.
    pub fn unwrap_or_default(self) -> T {
        match self {
            Self::NoSignal => T::default(),
            Self::Signal(value) => value,
        }
    }
}

/// Field names confirmed by `selectionMismatch` diagnostics, matched against
/// the last segment of each diagnostic's path.
#[must_use]
pub fn confirmed_fields(response: &GraphQLResponse) -> Verdict<BTreeSet<String>> {
    let Some(errors) = response.diagnostics() else {
        return Verdict::NoSignal;
    };
    let fields = errors
        .iter()
        .filter(|error| DiagnosticCode::of(error) == Some(DiagnosticCode::SelectionMismatch))
        .filter_map(GraphQLError::last_path_key)
        .map(str::to_string)
        .collect();
    Verdict::Signal(fields)
}

/// Argument names leaked by informative diagnostics.
#[must_use]
pub fn informative_arguments(response: &GraphQLResponse) -> Verdict<BTreeSet<String>> {
    let Some(errors) = response.diagnostics() else {
        return Verdict::NoSignal;
    };
    let mut names = BTreeSet::new();
    for error in errors {
        let Some(code) = DiagnosticCode::of(error) else {
            continue;
        };
        if !code.is_informative() {
            continue;
        }
        if let Some(extensions) = &error.extensions {
            names.extend(decode_argument_names(
                extensions.arguments.as_ref(),
                extensions.argument_name.as_deref(),
            ));
        }
    }
    Verdict::Signal(names)
}

/// Normalizes every argument payload shape into one set of names.
///
/// `arguments` may be a list of names or a comma-delimited string;
/// `argument_name` holds a single name. All shapes are tried and the results
/// unioned. Unrecognized shapes contribute nothing.
#[must_use]
pub fn decode_argument_names(
    arguments: Option<&Value>,
    argument_name: Option<&str>,
) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    match arguments {
        Some(Value::Array(items)) => {
            names.extend(items.iter().filter_map(Value::as_str).map(str::to_string));
        }
        Some(Value::String(joined)) => {
            names.extend(split_names(joined));
        }
        _ => {}
    }
    if let Some(name) = argument_name.map(str::trim).filter(|name| !name.is_empty()) {
        names.insert(name.to_string());
    }
    names
}

fn split_names(joined: &str) -> impl Iterator<Item = String> + '_ {
    joined
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

/// The container type named by an `undefinedField` diagnostic, wrappers stripped.
///
/// The type name is read per diagnostic; a diagnostic without one contributes
/// nothing. When several qualify, the last wins.
#[must_use]
pub fn container_typename(response: &GraphQLResponse) -> Option<String> {
    response
        .diagnostics()?
        .iter()
        .filter(|error| DiagnosticCode::of(error) == Some(DiagnosticCode::UndefinedField))
        .filter_map(GraphQLError::type_name)
        .map(bare_name)
        .filter(|name| !name.is_empty())
        .last()
}

/// Outcome of scanning a response for a leaked type signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureScan {
    Found(TypeRef),
    /// Type names were present but none parsed.
    Malformed(Vec<String>),
    Absent,
}

/// The first diagnostic carrying a parseable printed type signature.
#[must_use]
pub fn leaked_signature(response: &GraphQLResponse) -> SignatureScan {
    let Some(errors) = response.diagnostics() else {
        return SignatureScan::Absent;
    };
    let mut malformed = Vec::new();
    for signature in errors.iter().filter_map(GraphQLError::type_name) {
        match TypeRef::parse(signature) {
            Ok(type_ref) => return SignatureScan::Found(type_ref),
            Err(_) => malformed.push(signature.to_string()),
        }
    }
    if malformed.is_empty() {
        SignatureScan::Absent
    } else {
        SignatureScan::Malformed(malformed)
    }
}
