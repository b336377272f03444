use std::time::Duration;

use super::testcase::TestCase;

/// Verdict of a sample (or of a whole judge run).
///
/// Declared from the most severe to the least severe; see [`ResultStatus::severity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum ResultStatus {
    #[strum(serialize = "CE")]
    CompilationError,

    #[strum(serialize = "RE")]
    RuntimeError,

    #[strum(serialize = "WA")]
    WrongAnswer,

    #[strum(serialize = "TLE")]
    TimeLimitExceeded,

    #[strum(serialize = "MLE")]
    MemoryLimitExceeded,

    /// Pending: some samples have not been judged yet.
    #[strum(serialize = "WJ")]
    Judging,

    #[strum(serialize = "AC")]
    Accepted,
}

impl ResultStatus {
    /// Larger is worse. `CE > RE > WA > TLE > MLE > WJ > AC`
    pub const fn severity(&self) -> u8 {
        use ResultStatus::*;
        match self {
            CompilationError => 6,
            RuntimeError => 5,
            WrongAnswer => 4,
            TimeLimitExceeded => 3,
            MemoryLimitExceeded => 2,
            Judging => 1,
            Accepted => 0,
        }
    }

    pub const fn description(&self) -> &'static str {
        use ResultStatus::*;
        match self {
            CompilationError => "Compilation Error",
            RuntimeError => "Runtime Error",
            WrongAnswer => "Wrong Answer",
            TimeLimitExceeded => "Time Limit Exceeded",
            MemoryLimitExceeded => "Memory Limit Exceeded",
            Judging => "Judging",
            Accepted => "Accepted",
        }
    }

    pub fn is_accepted(&self) -> bool {
        *self == ResultStatus::Accepted
    }

    pub fn worse(self, other: Self) -> Self {
        if other.severity() > self.severity() {
            other
        } else {
            self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCaseResult {
    /// Trimmed stdout for AC/WA, stdout+stderr for RE/TLE/MLE,
    /// or the spawn error message.
    pub raw_output: String,

    /// `None` unless the process ran to completion.
    pub executed_time_ms: Option<u64>,

    pub status: ResultStatus,
}

impl TestCaseResult {
    pub fn new(
        status: ResultStatus,
        raw_output: impl Into<String>,
        executed_time: Option<Duration>,
    ) -> Self {
        Self {
            raw_output: raw_output.into(),
            executed_time_ms: executed_time.map(|d| d.as_millis() as u64),
            status,
        }
    }

    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self::new(ResultStatus::RuntimeError, message, None)
    }

    pub fn time_limit_exceeded(partial_output: impl Into<String>) -> Self {
        Self::new(ResultStatus::TimeLimitExceeded, partial_output, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTestCaseResult {
    pub label: String,
    pub testcase: TestCase,
    pub result: TestCaseResult,
}

#[cfg(test)]
mod test {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn declaration_order_matches_severity() {
        let severities: Vec<_> = ResultStatus::iter().map(|s| s.severity()).collect();
        let mut sorted = severities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(severities, sorted);
    }

    #[test]
    fn worse_picks_more_severe() {
        use ResultStatus::*;
        assert_eq!(Accepted.worse(WrongAnswer), WrongAnswer);
        assert_eq!(WrongAnswer.worse(RuntimeError), RuntimeError);
        assert_eq!(RuntimeError.worse(WrongAnswer), RuntimeError);
        assert_eq!(TimeLimitExceeded.worse(MemoryLimitExceeded), TimeLimitExceeded);
        assert_eq!(CompilationError.worse(RuntimeError), CompilationError);
        assert_eq!(Accepted.worse(Accepted), Accepted);
    }

    #[test]
    fn display_uses_short_code() {
        assert_eq!(ResultStatus::Accepted.to_string(), "AC");
        assert_eq!(ResultStatus::TimeLimitExceeded.to_string(), "TLE");
        assert_eq!(ResultStatus::Judging.to_string(), "WJ");
    }
}
