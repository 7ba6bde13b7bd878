//! Hand-off of finished Apis to a documentation target.
//!
//! A [`Publisher`] receives one [`Api`] at a time. [`publish_batch`] pushes a batch
//! through a publisher one item after another, recording failures per item so that one
//! rejected Api never stops the rest; [`spawn_batch`] does the same on a worker thread.

use log::{debug, info, warn};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crate::error::{Error, Result};
use crate::model::Api;
use crate::serializer::{write_to_file, Format};

pub trait Publisher {
    /// Publishes one Api and returns where it went.
    fn publish(&self, api: &Api) -> Result<String>;
}

/// Outcome of a batch: locations of published Apis and the failures, keyed by Api.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub published: Vec<String>,
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total(&self) -> usize {
        self.published.len() + self.failures.len()
    }
}

pub fn publish_batch(publisher: &dyn Publisher, apis: &[Api]) -> BatchReport {
    let mut report = BatchReport::default();
    for api in apis {
        match publisher.publish(api) {
            Ok(location) => {
                debug!("Published {} to {}", api.key(), location);
                report.published.push(location);
            }
            Err(e) => {
                warn!("Failed to publish {}: {}", api.key(), e);
                report.failures.push((api.key(), e.to_string()));
            }
        }
    }
    info!(
        "Published {} of {} api(s)",
        report.published.len(),
        report.total()
    );
    report
}

/// Runs [`publish_batch`] on a separate thread.
pub fn spawn_batch<P>(publisher: P, apis: Vec<Api>) -> JoinHandle<BatchReport>
where
    P: Publisher + Send + 'static,
{
    thread::spawn(move || publish_batch(&publisher, &apis))
}

/// Writes each Api to `<root>/<category>/<METHOD><path>.<ext>`.
#[derive(Debug, Clone)]
pub struct DirectoryPublisher {
    root: PathBuf,
    format: Format,
}

impl DirectoryPublisher {
    pub fn new(root: PathBuf, format: Format) -> Self {
        Self { root, format }
    }

    pub fn document_path(&self, api: &Api) -> PathBuf {
        let category = api.category.as_deref().map(sanitize).unwrap_or_default();
        let category = if category.is_empty() {
            "default".to_string()
        } else {
            category
        };
        let file_name = format!(
            "{}{}.{}",
            api.method,
            sanitize(&api.path),
            self.format.extension()
        );
        self.root.join(category).join(file_name)
    }
}

impl Publisher for DirectoryPublisher {
    fn publish(&self, api: &Api) -> Result<String> {
        let path = self.document_path(api);
        let to_publish_error = |e: Error| Error::Publish {
            target: path.display().to_string(),
            message: e.to_string(),
        };
        let content = self.format.render(api).map_err(to_publish_error)?;
        write_to_file(&content, &path).map_err(to_publish_error)?;
        Ok(path.display().to_string())
    }
}

/// Keeps ASCII letters, digits and `-`; runs of anything else become one `_`.
/// A leading separator is kept, a trailing one dropped.
fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            out.push(ch);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    while out.len() > 1 && out.ends_with('_') {
        out.pop();
    }
    if out == "_" {
        out.clear();
    }
    out
}
