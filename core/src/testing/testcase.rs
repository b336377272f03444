use acsb_webclient::SampleTestcase;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledTestCase {
    /// e.g. "Sample 1"
    pub label: String,
    pub case: TestCase,
}

impl TestCase {
    pub fn new(input: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected_output: expected_output.into(),
        }
    }
}

impl LabeledTestCase {
    pub fn new(
        label: impl Into<String>,
        input: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            case: TestCase::new(input, expected_output),
        }
    }
}

impl From<SampleTestcase> for LabeledTestCase {
    fn from(t: SampleTestcase) -> Self {
        Self::new(format!("Sample {}", t.ord), t.input, t.output)
    }
}

/// Keeps the order in which the samples appear on the problem page.
pub fn label_samples(samples: impl IntoIterator<Item = SampleTestcase>) -> Vec<LabeledTestCase> {
    samples.into_iter().map(LabeledTestCase::from).collect()
}
