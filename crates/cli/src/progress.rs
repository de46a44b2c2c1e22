use indicatif::{ProgressBar, ProgressStyle};
use premonition::{Observer, ProbeEvent, TracingObserver};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Detect if we're running in a CI environment
fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

/// Create a spinner with a message
/// Returns a hidden spinner in CI environments or when `visible` is false
pub fn spinner(message: &str, visible: bool) -> ProgressBar {
    let pb = if !visible || is_ci() {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };

    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.cyan} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Keeps a spinner current with the engine's progress and forwards every
/// event to `tracing`.
pub struct ProgressObserver {
    bar: ProgressBar,
    requests: AtomicUsize,
    fields: AtomicUsize,
    arguments: AtomicUsize,
}

impl ProgressObserver {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            requests: AtomicUsize::new(0),
            fields: AtomicUsize::new(0),
            arguments: AtomicUsize::new(0),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn status(&self) -> String {
        format!(
            "Probing... {} requests, {} fields, {} arguments",
            self.requests.load(Ordering::Relaxed),
            self.fields.load(Ordering::Relaxed),
            self.arguments.load(Ordering::Relaxed),
        )
    }
}

impl Observer for ProgressObserver {
    fn on_event(&self, event: &ProbeEvent) {
        TracingObserver.on_event(event);
        match event {
            ProbeEvent::ProbeSent { .. } => {
                self.requests.fetch_add(1, Ordering::Relaxed);
            }
            ProbeEvent::FieldFound { .. } => {
                self.fields.fetch_add(1, Ordering::Relaxed);
            }
            ProbeEvent::ArgumentFound { .. } => {
                self.arguments.fetch_add(1, Ordering::Relaxed);
            }
            ProbeEvent::ContainerTypename { name } => {
                self.bar.println(format!("Enumerating fields of {name}"));
            }
            _ => return,
        }
        self.bar.set_message(self.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_ci_detects_ci_env() {
        // Save original values
        let ci_orig = std::env::var("CI").ok();

        // Set CI environment variable
        std::env::set_var("CI", "true");
        assert!(is_ci());

        // Restore original value
        if let Some(val) = ci_orig {
            std::env::set_var("CI", val);
        } else {
            std::env::remove_var("CI");
        }
    }

    #[test]
    fn test_hidden_spinner() {
        let pb = spinner("Loading...", false);
        assert!(pb.is_hidden());
        pb.finish_and_clear();
    }

    #[test]
    fn test_observer_counts_events() {
        let observer = ProgressObserver::new(spinner("", false));
        observer.on_event(&ProbeEvent::ProbeSent {
            document: "mutation { a }".to_string(),
        });
        observer.on_event(&ProbeEvent::ProbeSent {
            document: "mutation { b }".to_string(),
        });
        observer.on_event(&ProbeEvent::FieldFound {
            field: "a".to_string(),
        });
        observer.on_event(&ProbeEvent::NoSignal {
            document: "mutation { b }".to_string(),
        });

        assert_eq!(
            observer.status(),
            "Probing... 2 requests, 1 fields, 0 arguments"
        );
        observer.finish();
    }
}
