use std::path::{Path, PathBuf};

use anyhow::Context as _;

use super::{
    compiler::{self, TempArtifactDir},
    error::JudgeError,
    language::{self, Language, Toolchain},
    result::LabeledTestCaseResult,
    runner::ProcessRunner,
    summary::TestInformation,
    testcase::LabeledTestCase,
};
use crate::config::TestConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JudgeState {
    NotStarted,
    /// A previous pull was dropped while compiling; the next pull starts over.
    Compiling,
    /// Index of the sample to run on the next pull.
    Running(usize),
    Finished,
}

/// Judges a source file against labeled samples, one sample per pull.
///
/// ```no_run
/// # async fn f(testcases: Vec<acsb_core::testing::LabeledTestCase>) -> anyhow::Result<()> {
/// use acsb_core::testing::Judge;
///
/// let mut judge = Judge::new("main.cpp", testcases)?;
/// while let Some(res) = judge.next().await? {
///     println!("{}: {}", res.label, res.result.status);
/// }
/// println!("summary: {}", judge.info().summary());
/// # Ok(())
/// # }
/// ```
///
/// Dropping the judge (even halfway) removes the temporary executable.
#[derive(Debug)]
pub struct Judge {
    state: JudgeState,
    info: TestInformation,
    testcases: Vec<LabeledTestCase>,
    toolchain: Toolchain,
    runner: ProcessRunner,
    warmup: bool,
    run_cmd: Vec<String>,
    artifact: Option<TempArtifactDir>,
}

impl Judge {
    /// Fails before spawning anything if the language is unknown or there is nothing to judge.
    pub fn new(
        source_path: impl Into<PathBuf>,
        testcases: Vec<LabeledTestCase>,
    ) -> Result<Self, JudgeError> {
        let source_path = source_path.into();
        let language = Language::detect(&source_path)?;
        if testcases.is_empty() {
            return Err(JudgeError::NoTestcases);
        }
        Ok(Self {
            state: JudgeState::NotStarted,
            info: TestInformation::new(language, source_path, testcases.len()),
            testcases,
            toolchain: language.default_toolchain(),
            runner: ProcessRunner::new(),
            warmup: true,
            run_cmd: Vec::new(),
            artifact: None,
        })
    }

    pub fn with_config(
        source_path: impl Into<PathBuf>,
        testcases: Vec<LabeledTestCase>,
        cfg: &TestConfig,
    ) -> Result<Self, JudgeError> {
        let judge = Self::new(source_path, testcases)?;
        let toolchain = cfg.toolchain_for(judge.info.language);
        Ok(judge
            .toolchain(toolchain)?
            .runner(cfg.runner())
            .warmup(cfg.warmup))
    }

    pub fn toolchain(mut self, toolchain: Toolchain) -> Result<Self, JudgeError> {
        toolchain.validate()?;
        self.toolchain = toolchain;
        Ok(self)
    }

    pub fn runner(mut self, runner: ProcessRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn warmup(mut self, enabled: bool) -> Self {
        self.warmup = enabled;
        self
    }

    pub fn info(&self) -> &TestInformation {
        &self.info
    }

    pub fn state(&self) -> JudgeState {
        self.state
    }

    pub fn get_toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    pub fn testcases(&self) -> &[LabeledTestCase] {
        &self.testcases
    }

    /// Directory of the temporary executable, while it exists.
    pub fn artifact_dir(&self) -> Option<&Path> {
        self.artifact.as_ref().map(TempArtifactDir::path)
    }

    /// Compiles if needed. Pulling the first result calls this implicitly;
    /// calling it again is a no-op.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if !matches!(self.state, JudgeState::NotStarted | JudgeState::Compiling) {
            return Ok(());
        }
        let res = self.prepare().await;
        if res.is_err() {
            self.finish();
        }
        res
    }

    async fn prepare(&mut self) -> anyhow::Result<()> {
        let source = self.info.source_path.clone();

        let (compile, run) = match &self.toolchain {
            Toolchain::Interpreted { run } => {
                self.run_cmd = run.bind(&language::command_vars(&source, None, None))?;
                log::info!("Running: {}", self.run_cmd.join(" "));
                self.state = JudgeState::Running(0);
                return Ok(());
            }
            Toolchain::Compiled { compile, run } => (compile.clone(), run.clone()),
        };

        self.state = JudgeState::Compiling;
        // replacing drops (and removes) an artifact left by an interrupted pull
        let artifact = self.artifact.insert(
            TempArtifactDir::create()
                .context("Failed to create a temporary dir for the executable")?,
        );
        let exe = artifact.executable_path();
        let vars = language::command_vars(&source, Some(artifact.path()), Some(&exe));
        let compile_cmd = compile.bind(&vars)?;
        let run_cmd = run.bind(&vars)?;

        log::info!("Compiling: {}", compile_cmd.join(" "));
        let c = compiler::compile(&compile_cmd).await?;
        log::info!(
            "Compilation {} in {}ms",
            if c.success { "succeeded" } else { "failed" },
            c.elapsed.as_millis()
        );
        let success = c.success;
        self.info.record_compilation(c.diagnostics, c.elapsed, success);
        if !success {
            self.finish();
            return Ok(());
        }

        self.run_cmd = run_cmd;
        if self.warmup {
            self.runner.warm_up(&self.run_cmd).await;
        }
        log::info!("Running: {}", self.run_cmd.join(" "));
        self.state = JudgeState::Running(0);
        Ok(())
    }

    /// Runs the next sample and returns its result, or `None` when every
    /// sample is done or compilation failed.
    pub async fn next(&mut self) -> anyhow::Result<Option<LabeledTestCaseResult>> {
        self.start().await?;

        let JudgeState::Running(i) = self.state else {
            return Ok(None);
        };
        let t = &self.testcases[i];

        let result = match self.runner.run(&self.run_cmd, &t.case).await {
            Ok(result) => result,
            Err(e) => {
                let e = e.context(format!("Failed to run {}", t.label));
                self.finish();
                return Err(e);
            }
        };
        log::debug!("{}: {}", t.label, result.status);

        let res = LabeledTestCaseResult {
            label: t.label.clone(),
            testcase: t.case.clone(),
            result,
        };
        self.info.update(res.result.status);

        if i + 1 < self.testcases.len() {
            self.state = JudgeState::Running(i + 1);
        } else {
            self.finish();
        }
        Ok(Some(res))
    }

    /// Drains the remaining samples.
    pub async fn run_to_end(&mut self) -> anyhow::Result<Vec<LabeledTestCaseResult>> {
        let mut results = Vec::with_capacity(self.testcases.len());
        while let Some(res) = self.next().await? {
            results.push(res);
        }
        Ok(results)
    }

    fn finish(&mut self) {
        self.state = JudgeState::Finished;
        if let Some(artifact) = self.artifact.take() {
            artifact.remove();
        }
    }
}
