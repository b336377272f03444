use ::lazy_regex::{lazy_regex, Lazy, Regex};
use scraper::{ElementRef, Html};

use crate::{model::SampleTestcase, util};

/// Tried in order; the first one yielding samples wins.
/// Current pages carry both languages, old ones have a flat statement.
const PART_SELECTORS: &[&str] = &[
    "#task-statement .lang-ja > .part",
    "#task-statement .lang-en > .part",
    "#task-statement > .part",
    "section",
];

static RE_PROTOCOL_RELATIVE_IMG: Lazy<Regex> = lazy_regex!(r#"(["'(])//img\.atcoder\.jp"#);

fn extract_testcase(pre: ElementRef) -> String {
    let text: String = pre.text().collect();
    let text = text.trim();
    // `<pre></pre>`
    if text.is_empty() {
        return String::new();
    }
    let mut s = text.to_owned();
    s.push('\n');
    s
}

enum Kind {
    Input,
    Output,
}

fn classify(title: &str) -> Option<Kind> {
    let title = title.trim().to_lowercase();
    if title.starts_with("入力例") || title.starts_with("sample input") {
        Some(Kind::Input)
    } else if title.starts_with("出力例") || title.starts_with("sample output") {
        Some(Kind::Output)
    } else {
        None
    }
}

fn scrape_with(doc: &Html, part_selector: &'static str) -> Vec<SampleTestcase> {
    let sel_part = util::selector_must_parsed(part_selector);
    let sel_h3 = util::selector_must_parsed("h3");
    let sel_pre = util::selector_must_parsed("pre");

    let mut in_cases = Vec::with_capacity(5);
    let mut out_cases = Vec::with_capacity(5);

    for node in doc.select(&sel_part) {
        let Some(h3) = node.select(&sel_h3).next() else {
            continue
        };
        let title: String = h3.text().collect();
        let Some(kind) = classify(&title) else {
            continue
        };
        let case = node
            .select(&sel_pre)
            .next()
            .map(extract_testcase)
            .unwrap_or_default();
        match kind {
            Kind::Input => in_cases.push(case),
            Kind::Output => out_cases.push(case),
        }
    }

    if in_cases.len() != out_cases.len() {
        log::warn!(
            "Found {} sample inputs but {} sample outputs; unpaired ones are ignored",
            in_cases.len(),
            out_cases.len()
        );
    }
    in_cases
        .into_iter()
        .zip(out_cases)
        .enumerate()
        .map(|(i, (input, output))| SampleTestcase {
            ord: (i + 1) as u32,
            input,
            output,
        })
        .collect()
}

/// Samples in page order. Empty if the page has none.
pub fn scrape_samples(html: &str) -> Vec<SampleTestcase> {
    let doc = Html::parse_document(html);
    PART_SELECTORS
        .iter()
        .map(|&sel| scrape_with(&doc, sel))
        .find(|cases| !cases.is_empty())
        .unwrap_or_default()
}

/// `<title>A - Hello World</title>` => `Hello World`
pub fn scrape_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = util::selector_must_parsed("title");
    let s: String = doc.select(&sel).next()?.text().collect();
    let s = s.trim();
    let title = s.split_once(" - ").map_or(s, |(_, t)| t).trim();
    (!title.is_empty()).then(|| title.to_owned())
}

/// Makes protocol-relative image links absolute so that a saved page renders offline.
pub fn repair_html(html: &str) -> String {
    RE_PROTOCOL_RELATIVE_IMG
        .replace_all(html, "${1}https://img.atcoder.jp")
        .into_owned()
}
