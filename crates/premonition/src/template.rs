//! Probe document construction.
//!
//! Every probe is built by substituting a fragment at the single `FUZZ`
//! marker of a caller-supplied [`DocumentTemplate`]. The builders here are the
//! only place probe syntax is spelled out.

use crate::{PremonitionError, Result};

/// The injection marker a template must contain exactly once.
pub const PLACEHOLDER: &str = "FUZZ";

/// A field name no real schema defines, used to elicit `undefinedField`.
pub const WRONG_FIELD: &str = "imwrongfield";

/// Trivial nested selection used to satisfy object-typed fields.
const NESTED_SELECTION: &str = "lol";

/// A query document with one injection point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentTemplate {
    source: String,
}

impl DocumentTemplate {
    /// Validates and wraps a template.
    ///
    /// # Errors
    ///
    /// Returns [`PremonitionError::InvalidTemplate`] unless `source` contains
    /// exactly one [`PLACEHOLDER`].
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let found = source.matches(PLACEHOLDER).count();
        if found != 1 {
            return Err(PremonitionError::InvalidTemplate {
                marker: PLACEHOLDER,
                found,
            });
        }
        Ok(Self { source })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Substitutes `fragment` at the injection point.
    #[must_use]
    pub fn render(&self, fragment: &str) -> String {
        self.source.replacen(PLACEHOLDER, fragment, 1)
    }

    /// Sibling field selections, one per candidate name.
    #[must_use]
    pub fn fields_probe<S: AsRef<str>>(&self, names: &[S]) -> String {
        let joined = names
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(" ");
        self.render(&joined)
    }

    /// Every candidate offered as an argument at once, e.g. `f(a: 7, b: 7){lol}`.
    #[must_use]
    pub fn arguments_probe<S: AsRef<str>>(&self, field: &str, names: &[S]) -> String {
        let args = names
            .iter()
            .map(|name| format!("{}: 7", name.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        self.render(&format!("{field}({args}){{{NESTED_SELECTION}}}"))
    }

    /// Documents that leak a field's printed type, in the order they are tried.
    #[must_use]
    pub fn field_type_battery(&self, field: &str) -> Vec<String> {
        vec![
            self.render(field),
            self.render(&format!("{field} {{ {NESTED_SELECTION} }}")),
        ]
    }

    /// Documents that leak an argument's printed type, in the order they are tried.
    #[must_use]
    pub fn argument_type_battery(&self, field: &str, argument: &str) -> Vec<String> {
        let truncated = truncate_last_char(argument);
        vec![
            self.render(&format!("{field}({argument}: 7)")),
            self.render(&format!("{field}({argument}: {{}})")),
            self.render(&format!("{field}({truncated}: 7)")),
            self.render(&format!("{field}({argument}: \"7\")")),
            self.render(&format!("{field}({argument}: false)")),
        ]
    }

    /// References [`WRONG_FIELD`] so the server names the container type.
    #[must_use]
    pub fn typename_probe(&self) -> String {
        self.render(WRONG_FIELD)
    }
}

fn truncate_last_char(name: &str) -> &str {
    name.char_indices()
        .next_back()
        .map_or(name, |(index, _)| &name[..index])
}

/// The three zero-argument root probes, keyed by operation.
pub const ROOT_TYPENAME_DOCUMENTS: [(RootOperation, &str); 3] = [
    (RootOperation::Query, "query { __typename }"),
    (RootOperation::Mutation, "mutation { __typename }"),
    (RootOperation::Subscription, "subscription { __typename }"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootOperation {
    Query,
    Mutation,
    Subscription,
}

/// Ordered candidate identifiers.
///
/// Order only decides how names are grouped into buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    #[must_use]
    pub fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Consecutive slices of `size` words; the last one may be shorter.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero. [`crate::Config::validate`] rejects that.
    pub fn buckets(&self, size: usize) -> impl Iterator<Item = &[String]> {
        self.words.chunks(size)
    }
}

impl<S: Into<String>> FromIterator<S> for Wordlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> DocumentTemplate {
        DocumentTemplate::new("mutation { FUZZ }").expect("valid template")
    }

    #[test]
    fn test_rejects_missing_marker() {
        let err = DocumentTemplate::new("mutation { a }").unwrap_err();
        assert!(matches!(
            err,
            PremonitionError::InvalidTemplate { found: 0, .. }
        ));
    }

    #[test]
    fn test_rejects_repeated_marker() {
        let err = DocumentTemplate::new("mutation { FUZZ FUZZ }").unwrap_err();
        assert!(matches!(
            err,
            PremonitionError::InvalidTemplate { found: 2, .. }
        ));
    }

    #[test]
    fn test_fields_probe_joins_with_spaces() {
        assert_eq!(
            template().fields_probe(&["a", "b", "c"]),
            "mutation { a b c }"
        );
    }

    #[test]
    fn test_arguments_probe() {
        assert_eq!(
            template().arguments_probe("createWidget", &["name", "size"]),
            "mutation { createWidget(name: 7, size: 7){lol} }"
        );
    }

    #[test]
    fn test_field_type_battery() {
        assert_eq!(
            template().field_type_battery("widget"),
            vec!["mutation { widget }", "mutation { widget { lol } }"]
        );
    }

    #[test]
    fn test_argument_type_battery_order() {
        let battery = template().argument_type_battery("createWidget", "input");
        assert_eq!(
            battery,
            vec![
                "mutation { createWidget(input: 7) }",
                "mutation { createWidget(input: {}) }",
                "mutation { createWidget(inpu: 7) }",
                "mutation { createWidget(input: \"7\") }",
                "mutation { createWidget(input: false) }",
            ]
        );
    }

    #[test]
    fn test_typename_probe() {
        assert_eq!(template().typename_probe(), "mutation { imwrongfield }");
    }

    #[test]
    fn test_truncate_handles_multibyte_and_empty() {
        assert_eq!(truncate_last_char("naïve"), "naïv");
        assert_eq!(truncate_last_char("é"), "");
        assert_eq!(truncate_last_char(""), "");
    }

    #[test]
    fn test_buckets_last_may_be_short() {
        let wordlist: Wordlist = ["a", "b", "c", "d", "e"].into_iter().collect();
        let sizes: Vec<usize> = wordlist.buckets(2).map(<[String]>::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }
}
