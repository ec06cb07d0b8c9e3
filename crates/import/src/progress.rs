use serde::Serialize;
use std::collections::BTreeMap;

/// Receives progress and per-row errors from an import run. Append-only.
pub trait ProgressSink {
    fn add_error(&mut self, index: usize, message: &str);
    fn add_steps_done(&mut self, count: usize);
    fn set_total_steps(&mut self, _total: usize) {}
}

impl<T: ProgressSink + ?Sized> ProgressSink for &mut T {
    fn add_error(&mut self, index: usize, message: &str) {
        (**self).add_error(index, message)
    }

    fn add_steps_done(&mut self, count: usize) {
        (**self).add_steps_done(count)
    }

    fn set_total_steps(&mut self, total: usize) {
        (**self).set_total_steps(total)
    }
}

/// In-memory job progress: step counters plus errors keyed by row index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportProgress {
    steps_done: usize,
    total_steps: Option<usize>,
    errors: BTreeMap<usize, Vec<String>>,
}

impl ImportProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps_done(&self) -> usize {
        self.steps_done
    }

    pub fn total_steps(&self) -> Option<usize> {
        self.total_steps
    }

    pub fn errors(&self) -> &BTreeMap<usize, Vec<String>> {
        &self.errors
    }

    pub fn errors_at(&self, index: usize) -> &[String] {
        self.errors.get(&index).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn error_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }
}

impl ProgressSink for ImportProgress {
    fn add_error(&mut self, index: usize, message: &str) {
        self.errors.entry(index).or_default().push(message.to_string());
    }

    fn add_steps_done(&mut self, count: usize) {
        self.steps_done += count;
    }

    fn set_total_steps(&mut self, total: usize) {
        self.total_steps = Some(total);
    }
}
