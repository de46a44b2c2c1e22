//! Bucketed enumeration of field and argument names.

use super::Premonition;
use crate::classify::{self, Verdict};
use crate::observer::ProbeEvent;
use crate::template::{DocumentTemplate, Wordlist};
use crate::transport::Transport;
use crate::{PremonitionError, Result};
use futures::future::join_all;
use std::collections::BTreeSet;

impl<T: Transport> Premonition<T> {
    /// Enumerates the valid field names of the template's container type.
    ///
    /// Each bucket of the wordlist is sent as sibling selections in one
    /// document. A name is confirmed when the oracle reports a
    /// `selectionMismatch` whose path ends in it. Buckets are independent and
    /// their results are unioned, so bucket size and probing order never
    /// change the result.
    ///
    /// # Errors
    ///
    /// Returns a transport error if any bucket could not be sent.
    #[tracing::instrument(skip_all, fields(words = wordlist.len(), bucket_size = self.config.bucket_size))]
    pub async fn discover_fields(
        &self,
        template: &DocumentTemplate,
        wordlist: &Wordlist,
    ) -> Result<BTreeSet<String>> {
        let probes = wordlist
            .buckets(self.config.bucket_size)
            .map(|bucket| async move {
                let document = template.fields_probe(bucket);
                let response = self.send(&document).await?;
                let confirmed = match classify::confirmed_fields(&response) {
                    Verdict::Signal(names) => names,
                    Verdict::NoSignal => {
                        self.emit(ProbeEvent::NoSignal { document });
                        BTreeSet::new()
                    }
                };
                Ok::<_, PremonitionError>(
                    confirmed
                        .into_iter()
                        .filter(|name| bucket.contains(name))
                        .collect::<BTreeSet<_>>(),
                )
            });

        let mut fields = BTreeSet::new();
        for result in join_all(probes).await {
            fields.extend(result?);
        }

        for field in &fields {
            self.emit(ProbeEvent::FieldFound {
                field: field.clone(),
            });
        }
        Ok(fields)
    }

    /// Enumerates the valid argument names of `field`.
    ///
    /// Each bucket is offered as arguments in one document. Diagnostics with
    /// codes other than the three known ones are mined for the names the
    /// field accepts.
    ///
    /// # Errors
    ///
    /// Returns a transport error if any bucket could not be sent.
    #[tracing::instrument(skip(self, template, wordlist), fields(words = wordlist.len()))]
    pub async fn discover_arguments(
        &self,
        template: &DocumentTemplate,
        field: &str,
        wordlist: &Wordlist,
    ) -> Result<BTreeSet<String>> {
        let probes = wordlist
            .buckets(self.config.bucket_size)
            .map(|bucket| self.probe_argument_bucket(template, field, bucket));

        let mut arguments = BTreeSet::new();
        for result in join_all(probes).await {
            arguments.extend(result?);
        }

        for argument in &arguments {
            self.emit(ProbeEvent::ArgumentFound {
                field: field.to_string(),
                argument: argument.clone(),
            });
        }
        Ok(arguments)
    }

    /// Probes one bucket of candidate argument names for `field`.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the document could not be sent.
    pub async fn probe_argument_bucket(
        &self,
        template: &DocumentTemplate,
        field: &str,
        bucket: &[String],
    ) -> Result<BTreeSet<String>> {
        let document = template.arguments_probe(field, bucket);
        let response = self.send(&document).await?;
        Ok(match classify::informative_arguments(&response) {
            Verdict::Signal(names) => names,
            Verdict::NoSignal => {
                self.emit(ProbeEvent::NoSignal { document });
                BTreeSet::new()
            }
        })
    }
}
