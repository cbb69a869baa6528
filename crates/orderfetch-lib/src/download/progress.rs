use super::types::{DownloadTask, FailedTask};

/// Running tally of one batch. Only the batch coordinator mutates it.
#[derive(Debug)]
pub struct BatchState {
    total: usize,
    completed: usize,
    failed: Vec<FailedTask>,
}

impl BatchState {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, task: &DownloadTask) {
        debug_assert!(self.resolved() < self.total, "more outcomes than tasks");
        tracing::trace!(output = %task.destination_path.display(), "Task succeeded");
        self.completed += 1;
    }

    pub fn record_failure(&mut self, failed: FailedTask) {
        debug_assert!(self.resolved() < self.total, "more outcomes than tasks");
        self.failed.push(failed);
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn failed(&self) -> &[FailedTask] {
        &self.failed
    }

    /// Tasks that reached a terminal state.
    pub fn resolved(&self) -> usize {
        self.completed + self.failed.len()
    }

    pub fn is_finished(&self) -> bool {
        self.resolved() == self.total
    }

    pub fn into_parts(self) -> (usize, usize, Vec<FailedTask>) {
        (self.total, self.completed, self.failed)
    }
}

/// Emits a progress line after every terminal task outcome.
#[derive(Debug, Default)]
pub struct ProgressReporter;

impl ProgressReporter {
    pub fn report(&self, state: &BatchState) {
        tracing::info!(
            completed = state.completed(),
            failed = state.failed().len(),
            total = state.total(),
            "{}",
            progress_line(state)
        );
    }
}

pub fn progress_line(state: &BatchState) -> String {
    format!(
        "[{}/{}] failed={}",
        state.completed(),
        state.total(),
        state.failed().len()
    )
}
