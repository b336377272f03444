use std::{
    io,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::{bail, Context as _};
use tokio::{
    io::{AsyncReadExt as _, AsyncWriteExt as _},
    process::Command,
    time::Instant,
};

use super::{result::*, testcase::TestCase};

/// Runs one program against one input at a time.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    time_limit: Duration,
    memory_limit_bytes: Option<u64>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(4);

    pub fn new() -> Self {
        Self {
            time_limit: Self::DEFAULT_TIME_LIMIT,
            memory_limit_bytes: None,
        }
    }

    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    /// A limit too large to express in bytes is clamped, i.e. effectively unlimited.
    pub fn memory_limit_mb(mut self, limit: Option<u64>) -> Self {
        self.memory_limit_bytes = limit.map(|mb| mb.saturating_mul(1024 * 1024));
        self
    }

    pub fn get_time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn get_memory_limit_bytes(&self) -> Option<u64> {
        self.memory_limit_bytes
    }

    fn command(&self, program: &str, args: &[String]) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(bytes) = self.memory_limit_bytes {
            memory::limit_address_space(&mut cmd, bytes);
        }
        cmd
    }

    /// Runs `cmd` with the input of `testcase` and judges its stdout.
    ///
    /// Only failures of the host (e.g. broken pipes to the child) are returned as `Err`.
    /// A program that cannot be spawned is judged as RE.
    pub async fn run(&self, cmd: &[String], testcase: &TestCase) -> anyhow::Result<TestCaseResult> {
        let Some((program, args)) = cmd.split_first() else {
            bail!("Empty run command")
        };

        let mut proc = match self.command(program, args).spawn() {
            Ok(proc) => proc,
            Err(e) => {
                log::debug!("Failed to spawn '{}': {}", cmd.join(" "), e);
                return Ok(TestCaseResult::spawn_failure(format!(
                    "Failed to spawn '{}': {}",
                    cmd.join(" "),
                    e
                )));
            }
        };
        let start_at = Instant::now();

        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let res = {
            let input = testcase.input.as_bytes();
            let fut_stdin = async move {
                let res = stdin.write_all(input).await;
                drop(stdin); // the child must see EOF
                match res {
                    // the program exited without reading all of its input
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    res => res,
                }
            };
            let fut_stdout = stdout.read_to_end(&mut stdout_buf);
            let fut_stderr = stderr.read_to_end(&mut stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.time_limit, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
            })
            .await
        };
        let elapsed = start_at.elapsed();

        let stdout = String::from_utf8_lossy(&stdout_buf).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_buf).into_owned();

        let result = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                TestCaseResult::time_limit_exceeded(stdout + &stderr)
            }

            Ok(Err(e)) => {
                return Err(e).context("Failed to communicate with subprocess");
            }

            Ok(Ok((_, _, _, exit_status))) => {
                self.judge(exit_status, stdout, stderr, &testcase.expected_output, elapsed)
            }
        };
        log::debug!(
            "'{}' finished: {} ({:?})",
            cmd.join(" "),
            result.status,
            result.executed_time_ms
        );
        Ok(result)
    }

    fn judge(
        &self,
        exit_status: ExitStatus,
        stdout: String,
        stderr: String,
        expected_output: &str,
        elapsed: Duration,
    ) -> TestCaseResult {
        use ResultStatus::*;

        if !exit_status.success() {
            let status = if self.memory_limit_bytes.is_some() && memory::is_exhausted(&stderr) {
                MemoryLimitExceeded
            } else {
                RuntimeError
            };
            return TestCaseResult::new(status, stdout + &stderr, Some(elapsed));
        }

        let actual = stdout.trim();
        let status = if actual == expected_output.trim() {
            Accepted
        } else {
            WrongAnswer
        };
        TestCaseResult::new(status, actual, Some(elapsed))
    }

    /// Runs the program once with empty input so that the first sample
    /// does not pay for cold caches. The outcome is discarded.
    pub async fn warm_up(&self, cmd: &[String]) {
        let empty = TestCase::new("", "");
        match self.run(cmd, &empty).await {
            Ok(res) => log::debug!("Warm-up finished: {}", res.status),
            Err(e) => log::debug!("Warm-up failed: {:#}", e),
        }
    }
}

mod memory {
    use tokio::process::Command;

    /// Messages printed by common runtimes when an allocation fails.
    const EXHAUSTION_MARKERS: &[&str] = &[
        "std::bad_alloc",
        "MemoryError",
        "memory allocation of",
        "OutOfMemoryError",
        "out of memory",
        "Cannot allocate memory",
        "failed to reserve memory",
        // JVM heap reservation under RLIMIT_AS
        "Could not reserve enough space",
    ];

    pub fn is_exhausted(stderr: &str) -> bool {
        EXHAUSTION_MARKERS.iter().any(|m| stderr.contains(m))
    }

    #[cfg(unix)]
    pub fn limit_address_space(cmd: &mut Command, bytes: u64) {
        // SAFETY: the closure only calls `setrlimit`, which is async-signal-safe.
        unsafe {
            cmd.pre_exec(move || {
                let limit = libc::rlimit {
                    rlim_cur: bytes as libc::rlim_t,
                    rlim_max: bytes as libc::rlim_t,
                };
                if libc::setrlimit(libc::RLIMIT_AS, &limit) != 0 {
                    return Err(std::io::Error::last_os_error());
                }
                Ok(())
            });
        }
    }

    #[cfg(not(unix))]
    pub fn limit_address_space(_cmd: &mut Command, _bytes: u64) {
        log::warn!("Memory limit is not supported on this platform; ignored");
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct X {
        input: &'static str,
        expected: &'static str,
        script: &'static str,
        want_status: ResultStatus,
        want_output: &'static str,
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".into(), "-c".into(), script.into()]
    }

    async fn run_test(x: X) -> TestCaseResult {
        let t = TestCase::new(x.input, x.expected);
        let r = ProcessRunner::new().time_limit(Duration::from_millis(500));

        let res = dbg!(r.run(&sh(x.script), &t).await).unwrap();
        assert_eq!(res.status, x.want_status);
        assert_eq!(res.raw_output, x.want_output);
        res
    }

    #[tokio::test]
    async fn should_be_ac() {
        let res = run_test(X {
            input: "1 2\n",
            expected: "3\n",
            script: r#"read a b; echo $((a + b))"#,
            want_status: ResultStatus::Accepted,
            want_output: "3",
        })
        .await;
        assert!(res.executed_time_ms.is_some());
    }

    #[tokio::test]
    async fn should_be_ac_ignoring_surrounding_whitespace() {
        run_test(X {
            input: "",
            expected: "3",
            script: r#"printf '\n  3\n\n'"#,
            want_status: ResultStatus::Accepted,
            want_output: "3",
        })
        .await;
    }

    #[tokio::test]
    async fn should_be_ac_even_if_stdin_is_not_read() {
        run_test(X {
            input: "123\n",
            expected: "hello_123\n",
            script: "echo hello_123",
            want_status: ResultStatus::Accepted,
            want_output: "hello_123",
        })
        .await;
    }

    #[tokio::test]
    async fn should_be_wa_on_inner_whitespace() {
        let res = run_test(X {
            input: "",
            expected: "1 2\n",
            script: "echo '1  2'",
            want_status: ResultStatus::WrongAnswer,
            want_output: "1  2",
        })
        .await;
        assert!(res.executed_time_ms.is_some());
    }

    #[tokio::test]
    async fn should_be_wa_if_answer_is_on_stderr() {
        run_test(X {
            input: "",
            expected: "hello\n",
            script: "echo hello >&2",
            want_status: ResultStatus::WrongAnswer,
            want_output: "",
        })
        .await;
    }

    #[tokio::test]
    async fn should_be_re_even_if_stdout_is_correct() {
        let res = run_test(X {
            input: "",
            expected: "hello\n",
            script: "echo hello; echo boom >&2; exit 42",
            want_status: ResultStatus::RuntimeError,
            want_output: "hello\nboom\n",
        })
        .await;
        assert!(res.executed_time_ms.is_some());
    }

    #[tokio::test]
    async fn should_be_tle_keeping_partial_output() {
        let res = run_test(X {
            input: "",
            expected: "done\n",
            script: "echo partial; exec sleep 3",
            want_status: ResultStatus::TimeLimitExceeded,
            want_output: "partial\n",
        })
        .await;
        assert_eq!(res.executed_time_ms, None);
    }

    #[tokio::test]
    async fn spawn_failure_is_re_without_time() {
        let t = TestCase::new("", "");
        let cmd = vec!["./definitely-not-existing-program-acsb".to_owned()];
        let res = ProcessRunner::new().run(&cmd, &t).await.unwrap();
        assert_eq!(res.status, ResultStatus::RuntimeError);
        assert_eq!(res.executed_time_ms, None);
        assert!(res.raw_output.contains("definitely-not-existing-program-acsb"));
    }

    #[tokio::test]
    async fn large_input_does_not_deadlock() {
        let input = "x".repeat(1 << 20) + "\n";
        let t = TestCase::new(input, "1048577\n");
        let res = ProcessRunner::new()
            .run(&sh("wc -c | tr -d ' '"), &t)
            .await
            .unwrap();
        assert_eq!(res.status, ResultStatus::Accepted);
    }

    #[test]
    fn memory_exhaustion_markers() {
        assert!(memory::is_exhausted(
            "terminate called after throwing an instance of 'std::bad_alloc'"
        ));
        assert!(memory::is_exhausted("Traceback ...\nMemoryError\n"));
        assert!(!memory::is_exhausted("ZeroDivisionError: division by zero"));
        assert!(memory::is_exhausted(
            "Error occurred during initialization of VM\nCould not reserve enough space for object heap\n"
        ));
    }

    #[test]
    fn huge_memory_limit_is_clamped() {
        let r = ProcessRunner::new().memory_limit_mb(Some(u64::MAX / 2));
        assert_eq!(r.get_memory_limit_bytes(), Some(u64::MAX));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn allocation_beyond_cap_is_mle() {
        let has_python = std::process::Command::new("python3")
            .arg("--version")
            .output()
            .is_ok();
        if !has_python {
            eprintln!("python3 not found; skipped");
            return;
        }
        let t = TestCase::new("", "");
        let cmd: Vec<String> = ["python3", "-c", "x = bytearray(800 * 1024 * 1024)"]
            .map(String::from)
            .into();

        let res = ProcessRunner::new()
            .memory_limit_mb(Some(256))
            .run(&cmd, &t)
            .await
            .unwrap();
        assert_eq!(res.status, ResultStatus::MemoryLimitExceeded);
        assert!(res.raw_output.contains("MemoryError"));
        assert!(res.executed_time_ms.is_some());
    }

    #[cfg(unix)]
    #[test]
    fn judge_attributes_allocation_failure_to_mle_only_when_limited() {
        use std::os::unix::process::ExitStatusExt;
        let failed = ExitStatus::from_raw(1 << 8);
        let stderr = "MemoryError\n".to_owned();

        let limited = ProcessRunner::new().memory_limit_mb(Some(256));
        let res = limited.judge(failed, "".into(), stderr.clone(), "", Duration::ZERO);
        assert_eq!(res.status, ResultStatus::MemoryLimitExceeded);

        let unlimited = ProcessRunner::new();
        let res = unlimited.judge(failed, "".into(), stderr, "", Duration::ZERO);
        assert_eq!(res.status, ResultStatus::RuntimeError);
    }
}
