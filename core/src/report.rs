//! Plain-text failure report, meant to be pasted into a prompt asking for a fix.

use std::fmt::Write as _;

use crate::testing::{LabeledTestCaseResult, TestInformation};

/// Describes every non-AC sample of a finished run. No colors, stable layout.
pub fn failure_report(info: &TestInformation, results: &[LabeledTestCaseResult]) -> String {
    let mut out = String::new();
    let summary = info.summary();

    let _ = writeln!(
        out,
        "Source file: {} ({})",
        info.source_path.to_string_lossy(),
        info.language
    );
    let _ = writeln!(out, "Result: {} ({})", summary, summary.description());

    if info.is_compile_failed() {
        out.push('\n');
        out.push_str("## Compilation Error\n");
        push_fenced(&mut out, &info.compiler_message);
        return out;
    }

    let failures: Vec<_> = results
        .iter()
        .filter(|r| !r.result.status.is_accepted())
        .collect();
    if failures.is_empty() {
        let _ = writeln!(out, "\nAll {} samples passed.", results.len());
        return out;
    }

    let _ = writeln!(
        out,
        "{} of {} samples failed.",
        failures.len(),
        info.expected_case_count
    );
    for r in failures {
        let _ = writeln!(
            out,
            "\n## {}: {} ({})",
            r.label,
            r.result.status,
            r.result.status.description()
        );
        out.push_str("### Input\n");
        push_fenced(&mut out, &r.testcase.input);
        out.push_str("### Expected output\n");
        push_fenced(&mut out, &r.testcase.expected_output);
        out.push_str("### Actual output\n");
        push_fenced(&mut out, &r.result.raw_output);
    }
    out
}

fn push_fenced(out: &mut String, body: &str) {
    out.push_str("```\n");
    out.push_str(body.trim_end_matches('\n'));
    out.push_str("\n```\n");
}
