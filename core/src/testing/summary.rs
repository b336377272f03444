use std::{path::PathBuf, time::Duration};

use super::{language::Language, result::ResultStatus};

/// Live state of one judge run.
///
/// Owned by a single [`Judge`](super::Judge); the summary is folded from
/// the collected statuses each time it is asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestInformation {
    pub language: Language,
    pub source_path: PathBuf,
    pub expected_case_count: usize,
    pub compiler_message: String,
    pub compile_time_ms: Option<u64>,
    results: Vec<ResultStatus>,
    compile_failed: bool,
}

impl TestInformation {
    pub fn new(language: Language, source_path: impl Into<PathBuf>, expected_case_count: usize) -> Self {
        Self {
            language,
            source_path: source_path.into(),
            expected_case_count,
            compiler_message: String::new(),
            compile_time_ms: None,
            results: Vec::with_capacity(expected_case_count),
            compile_failed: false,
        }
    }

    pub fn results(&self) -> &[ResultStatus] {
        &self.results
    }

    pub fn is_compile_failed(&self) -> bool {
        self.compile_failed
    }

    /// Every sample has been judged, or compilation failed.
    pub fn is_finished(&self) -> bool {
        self.compile_failed || self.results.len() == self.expected_case_count
    }

    pub fn record_compilation(&mut self, message: String, elapsed: Duration, success: bool) {
        self.compiler_message = message;
        self.compile_time_ms = Some(elapsed.as_millis() as u64);
        self.compile_failed = !success;
    }

    pub fn update(&mut self, status: ResultStatus) {
        if self.is_finished() {
            log::warn!(
                "Ignored extra result {} for {:?} (already finished)",
                status,
                self.source_path
            );
            return;
        }
        self.results.push(status);
    }

    pub fn summary(&self) -> ResultStatus {
        if self.compile_failed {
            return ResultStatus::CompilationError;
        }
        let worst = self::worst_status(self.results.iter().copied());
        if worst.is_accepted() && self.results.len() < self.expected_case_count {
            ResultStatus::Judging
        } else {
            worst
        }
    }

    pub fn count(&self, status: ResultStatus) -> usize {
        self.results.iter().filter(|&&s| s == status).count()
    }
}

/// Folds statuses by severity. Empty input is `Accepted`.
pub fn worst_status(statuses: impl IntoIterator<Item = ResultStatus>) -> ResultStatus {
    statuses
        .into_iter()
        .fold(ResultStatus::Accepted, ResultStatus::worse)
}
