use std::time::Duration;

use colored::{Color, Colorize};
use crossterm::terminal;
use indicatif::{ProgressBar, ProgressStyle};
use strum::IntoEnumIterator;

use crate::error::*;
use crate::style::{self, ColorTheme as _};
use crate::testing::{
    Judge, JudgeState, LabeledTestCaseResult, ResultStatus, TestCaseResult, TestInformation,
};

/// Lines shown per block in the failure detail.
const MAX_DETAIL_LINES: usize = 30;

const BOLD_LINE: &str = "━";
const THIN_LINE: &str = "─";

/// Drives `judge` to the end, printing each result as soon as it arrives.
pub async fn render_judge(judge: &mut Judge) -> Result<Vec<LabeledTestCaseResult>> {
    print_header(judge.info());

    if judge.state() == JudgeState::NotStarted && judge.get_toolchain().is_compiled() {
        let bar = spinner(format!("Compiling {} ...", judge.info().language));
        let res = judge.start().await;
        bar.finish_and_clear();
        res?;
        print_compilation(judge.info());
    } else {
        judge.start().await?;
    }

    let mut results = Vec::with_capacity(judge.testcases().len());
    loop {
        let JudgeState::Running(i) = judge.state() else {
            break;
        };
        let label = judge.testcases()[i].label.clone();

        let bar = spinner(format!("{} ...", label));
        let res = judge.next().await;
        bar.finish_and_clear();

        let Some(res) = res? else {
            break;
        };
        println!("{}", status_line(&res.label, &res.result));
        if !res.result.status.is_accepted() {
            print_detail(&res);
        }
        results.push(res);
    }

    println!("\n{}", summary_line(judge.info()));
    Ok(results)
}

fn spinner(msg: String) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new_spinner().with_style(style).with_message(msg);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

fn terminal_cols() -> usize {
    let (cols, _) = terminal::size().unwrap_or((60, 40));
    cols.max(20) as usize
}

fn print_header(info: &TestInformation) {
    println!(
        "{} {} ({})\n{}",
        "Testing".bold(),
        info.source_path.to_string_lossy().bright_white().bold(),
        info.language,
        "-".repeat(20).bright_black(),
    );
}

fn print_compilation(info: &TestInformation) {
    let time = format_elapsed(info.compile_time_ms);
    if info.is_compile_failed() {
        println!(
            "{} {} [{}]",
            "Compilation failed".bright_red().bold(),
            style::status_badge(ResultStatus::CompilationError),
            time
        );
    } else {
        println!("{} [{}]", "Compiled".green(), time);
    }

    let msg = info.compiler_message.trim_end();
    if msg.is_empty() {
        return;
    }
    let title = if info.is_compile_failed() {
        "[compiler-error]"
    } else {
        "[compiler-warning]"
    };
    print_sub_title(title, terminal_cols());
    println!("{}", msg);
}

pub fn format_elapsed(ms: Option<u64>) -> String {
    match ms {
        Some(ms) => format!("{}ms", ms),
        None => "--".to_owned(),
    }
}

pub fn status_line(label: &str, result: &TestCaseResult) -> String {
    format!(
        "{} ... {} [{}]",
        label.cyan(),
        style::status_badge(result.status),
        format_elapsed(result.executed_time_ms),
    )
}

/// Keeps the first `max_lines` lines and returns how many were dropped.
pub fn truncate_lines(s: &str, max_lines: usize) -> (Vec<&str>, usize) {
    let lines: Vec<&str> = s.lines().collect();
    if lines.len() <= max_lines {
        return (lines, 0);
    }
    let omitted = lines.len() - max_lines;
    (lines.into_iter().take(max_lines).collect(), omitted)
}

fn print_sub_title(s: &str, cols: usize) {
    println!(
        "{}{}",
        s.cyan().bold(),
        THIN_LINE
            .repeat(cols.saturating_sub(s.chars().count() + 1))
            .bright_black(),
    )
}

fn print_block(text: &str) {
    let (lines, omitted) = truncate_lines(text, MAX_DETAIL_LINES);
    if lines.is_empty() {
        println!("{}", "<EMPTY>".magenta().dimmed());
        return;
    }
    for line in lines {
        let trimmed = line.trim_end();
        print!("{}", trimmed);
        let num_trailing_whitespace = line.len() - trimmed.len();
        if num_trailing_whitespace > 0 {
            print!(
                "{}{}",
                " ".repeat(num_trailing_whitespace).on_red(),
                "(Trailing whitespace)".bright_red().bold()
            );
        }
        println!();
    }
    if omitted > 0 {
        println!("{}", format!("... ({} more lines)", omitted).dimmed());
    }
}

fn print_detail(res: &LabeledTestCaseResult) {
    let cols = terminal_cols();
    let bold_bar = BOLD_LINE.repeat(cols).blue().bold();

    println!(
        "\n{}: {} [{}]\n{}",
        res.label.color(Color::BrightYellow).bold(),
        style::status_badge(res.result.status),
        format_elapsed(res.result.executed_time_ms),
        bold_bar,
    );

    print_sub_title("[input]", cols);
    print_block(&res.testcase.input);

    print_sub_title("[expected]", cols);
    print_block(&res.testcase.expected_output);

    let output_title = match res.result.status {
        ResultStatus::WrongAnswer => "[stdout]",
        _ => "[stdout+stderr]",
    };
    print_sub_title(output_title, cols);
    print_block(&res.result.raw_output);

    println!("{}", bold_bar);
}

pub fn summary_line(info: &TestInformation) -> String {
    let summary = info.summary();
    let bar = "-".repeat(5);
    let total = info.expected_case_count;
    let passed = info.count(ResultStatus::Accepted);

    let msg = match summary {
        ResultStatus::CompilationError => "Compilation failed 🔥".bright_red().to_string(),
        ResultStatus::Accepted => format!("All {} tests passed ✨", total).green().to_string(),
        ResultStatus::Judging => {
            format!("{}/{} tests passed (unfinished)", passed, total).yellow().to_string()
        }
        _ => {
            let failed = info.results().len() - passed;
            let head = if passed > 0 {
                format!("{}/{} tests failed 💣", failed, total)
            } else {
                format!("All {} tests failed 💀", total)
            };
            let detail = ResultStatus::iter()
                .filter(|s| !s.is_accepted())
                .filter_map(|s| match info.count(s) {
                    0 => None,
                    n => Some(format!(
                        "{}{}{}",
                        style::status_badge(s),
                        "x".dimmed(),
                        n.to_string().bold().bright_white()
                    )),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} ({})", head.bright_red(), detail)
        }
    };

    format!(
        "{} {} {} {}",
        bar,
        summary.description().color(summary.color()).bold(),
        msg,
        bar
    )
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::testing::Language;

    fn plain() {
        colored::control::set_override(false);
    }

    fn info_with(expected: usize, results: &[ResultStatus]) -> TestInformation {
        let mut info = TestInformation::new(Language::Cpp, "main.cpp", expected);
        results.iter().for_each(|&s| info.update(s));
        info
    }

    #[test]
    fn truncate_keeps_head() {
        assert_eq!(truncate_lines("a\nb\nc\n", 5), (vec!["a", "b", "c"], 0));
        assert_eq!(truncate_lines("a\nb\nc\nd", 2), (vec!["a", "b"], 2));
        assert_eq!(truncate_lines("", 2), (vec![], 0));
    }

    #[test]
    fn elapsed_is_dashed_without_time() {
        assert_eq!(format_elapsed(Some(12)), "12ms");
        assert_eq!(format_elapsed(None), "--");
    }

    #[test]
    fn status_line_shows_badge_and_time() {
        plain();
        let res = TestCaseResult::new(ResultStatus::WrongAnswer, "3", Some(Duration::from_millis(7)));
        assert_eq!(status_line("Sample 1", &res), "Sample 1 ...  WA   [7ms]");

        let res = TestCaseResult::time_limit_exceeded("");
        assert_eq!(status_line("Sample 2", &res), "Sample 2 ...  TLE  [--]");
    }

    #[test]
    fn summary_lines() {
        use ResultStatus::*;
        plain();

        let line = summary_line(&info_with(3, &[Accepted, Accepted, Accepted]));
        assert!(line.contains("Accepted"));
        assert!(line.contains("All 3 tests passed"));

        let line = summary_line(&info_with(3, &[Accepted, WrongAnswer, RuntimeError]));
        assert!(line.contains("Runtime Error"));
        assert!(line.contains("2/3 tests failed"));
        assert!(line.contains(" WA  x1"));
        assert!(line.contains(" RE  x1"));

        let line = summary_line(&info_with(2, &[TimeLimitExceeded, TimeLimitExceeded]));
        assert!(line.contains("All 2 tests failed"));

        let mut info = info_with(2, &[]);
        info.record_compilation("error".into(), Duration::from_millis(5), false);
        assert!(summary_line(&info).contains("Compilation Error"));
    }

    #[tokio::test]
    async fn render_stops_after_compile_failure() {
        use crate::testing::{CommandTemplate, LabeledTestCase, Toolchain};
        plain();

        let toolchain = Toolchain::Compiled {
            compile: CommandTemplate::new(["sh", "-c", "echo bad >&2; exit 1"]),
            run: CommandTemplate::new(["#{exe}"]),
        };
        let testcases = vec![
            LabeledTestCase::new("Sample 1", "1 2\n", "3\n"),
            LabeledTestCase::new("Sample 2", "3 4\n", "7\n"),
        ];
        let mut judge = Judge::new(std::env::temp_dir().join("main.c"), testcases)
            .unwrap()
            .toolchain(toolchain)
            .unwrap();

        let results = render_judge(&mut judge).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(judge.state(), JudgeState::Finished);
        assert_eq!(judge.info().summary(), ResultStatus::CompilationError);
        assert!(judge.info().compiler_message.contains("bad"));
    }
}
