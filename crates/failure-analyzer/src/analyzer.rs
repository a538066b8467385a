//! Report parsing: structured XML suites and unstructured text logs

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use tapmend_core_types::{FailureKind, SelectorFailure};
use tracing::{debug, info};

use crate::errors::AnalyzerError;
use crate::patterns::{classify_failure_kind, extract_selector, is_selector_failure};

/// Stored error text is cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 200;

static PYTEST_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^_{3,}\s+(\S+)\s+_{3,}\s*$").expect("valid regex"));

/// Detects test failures caused by stale locators.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureAnalyzer;

impl FailureAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Analyze report text, auto-detecting XML versus a plain text log.
    pub fn analyze(&self, report: &str) -> Result<Vec<SelectorFailure>, AnalyzerError> {
        let failures = if report.trim_start().starts_with('<') {
            self.analyze_xml(report)?
        } else {
            self.analyze_text_log(report)
        };
        info!(failures = failures.len(), "analyzed test report");
        Ok(failures)
    }

    /// Read and analyze a report file.
    pub fn analyze_path(&self, path: &Path) -> Result<Vec<SelectorFailure>, AnalyzerError> {
        if !path.exists() {
            return Err(AnalyzerError::ReportMissing(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.analyze(&content)
    }

    /// Walk every `testcase` element, at any nesting depth.
    pub fn analyze_xml(&self, xml: &str) -> Result<Vec<SelectorFailure>, AnalyzerError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut failures = Vec::new();
        let mut case: Option<CaseState> = None;

        loop {
            let event = reader.read_event().map_err(|e| AnalyzerError::MalformedXml {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;
            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"testcase" => case = Some(CaseState::open(&e)),
                    b"failure" | b"error" => {
                        if let Some(state) = case.as_mut() {
                            state.begin_failure(&e);
                        }
                    }
                    b"skipped" => {
                        if let Some(state) = case.as_mut() {
                            state.skipped = true;
                        }
                    }
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"failure" | b"error" => {
                        if let Some(state) = case.as_mut() {
                            state.begin_failure(&e);
                            state.in_failure = false;
                        }
                    }
                    b"skipped" => {
                        if let Some(state) = case.as_mut() {
                            state.skipped = true;
                        }
                    }
                    _ => {}
                },
                Event::Text(text) => {
                    if let Some(state) = case.as_mut().filter(|s| s.in_failure) {
                        let body = text.unescape().map_err(|e| AnalyzerError::MalformedXml {
                            position: reader.buffer_position() as u64,
                            message: e.to_string(),
                        })?;
                        state.body.push_str(&body);
                    }
                }
                Event::CData(data) => {
                    if let Some(state) = case.as_mut().filter(|s| s.in_failure) {
                        state
                            .body
                            .push_str(&String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(e) => match e.name().as_ref() {
                    b"testcase" => {
                        if let Some(failure) = case.take().and_then(CaseState::into_failure) {
                            failures.push(failure);
                        }
                    }
                    b"failure" | b"error" => {
                        if let Some(state) = case.as_mut() {
                            state.in_failure = false;
                        }
                    }
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(failures)
    }

    /// Scan a text log (pytest style) line by line for test blocks.
    pub fn analyze_text_log(&self, output: &str) -> Vec<SelectorFailure> {
        let mut failures = Vec::new();
        let mut current: Option<TextBlock> = None;

        for line in output.lines() {
            if let Some(header) = boundary(line) {
                if let Some(block) = current.take() {
                    failures.extend(block.into_failure());
                }
                current = header;
            } else if let Some(block) = current.as_mut() {
                block.lines.push(line.to_string());
            }
        }
        if let Some(block) = current.take() {
            failures.extend(block.into_failure());
        }

        failures
    }
}

struct CaseState {
    name: String,
    file: PathBuf,
    message: String,
    body: String,
    failed: bool,
    skipped: bool,
    in_failure: bool,
}

impl CaseState {
    fn open(element: &BytesStart<'_>) -> Self {
        let mut name = None;
        let mut classname = None;
        let mut file = None;
        for attr in element.attributes().flatten() {
            let value = match attr.unescape_value() {
                Ok(value) => value.into_owned(),
                Err(_) => continue,
            };
            match attr.key.as_ref() {
                b"name" => name = Some(value),
                b"classname" => classname = Some(value),
                b"file" => file = Some(value),
                _ => {}
            }
        }
        let file = file
            .filter(|f| !f.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(classname.unwrap_or_default().replace('.', "/")));
        Self {
            name: name.unwrap_or_else(|| "Unknown".to_string()),
            file,
            message: String::new(),
            body: String::new(),
            failed: false,
            skipped: false,
            in_failure: false,
        }
    }

    fn begin_failure(&mut self, element: &BytesStart<'_>) {
        // Only the first failure or error child is considered
        if self.failed {
            return;
        }
        self.failed = true;
        self.in_failure = true;
        for attr in element.attributes().flatten() {
            if attr.key.as_ref() == b"message" {
                if let Ok(value) = attr.unescape_value() {
                    self.message = value.into_owned();
                }
            }
        }
    }

    fn into_failure(self) -> Option<SelectorFailure> {
        if !self.failed || self.skipped {
            return None;
        }
        let full_error = format!("{}\n{}", self.message, self.body);
        let error_message = if self.message.is_empty() {
            truncate(&self.body, MAX_ERROR_CHARS)
        } else {
            self.message.clone()
        };
        build_failure(self.name, self.file, &full_error, error_message)
    }
}

struct TextBlock {
    test_name: String,
    test_file: PathBuf,
    lines: Vec<String>,
}

impl TextBlock {
    fn into_failure(self) -> Option<SelectorFailure> {
        if self.lines.iter().all(|line| line.trim().is_empty()) {
            return None;
        }
        let error_text = self.lines.join("\n");
        let error_message = truncate(&error_text, MAX_ERROR_CHARS);
        build_failure(self.test_name, self.test_file, &error_text, error_message)
    }
}

/// `Some(header)` when `line` starts a new test block; the header is `None` when the
/// boundary carries no test name.
///
/// A `FAILED` line only opens a block when it names a test id (`path::test`); otherwise it
/// is ordinary content of the current block.
fn boundary(line: &str) -> Option<Option<TextBlock>> {
    if let Some(caps) = PYTEST_SECTION.captures(line.trim()) {
        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let test_name = name.rsplit("::").next().unwrap_or(name).to_string();
        return Some(Some(TextBlock {
            test_name,
            test_file: PathBuf::from("unknown"),
            lines: Vec::new(),
        }));
    }
    if !line.contains("::test_") && !line.contains("FAILED") {
        return None;
    }
    let Some((head, tail)) = line.rsplit_once("::") else {
        return None;
    };
    let test_name = tail.split_whitespace().next().unwrap_or_default().to_string();
    if test_name.is_empty() {
        return Some(None);
    }
    let test_file = head
        .split("::")
        .next()
        .and_then(|prefix| prefix.split_whitespace().last())
        .filter(|path| !path.is_empty())
        .unwrap_or("unknown");
    let mut lines = Vec::new();
    // Summary lines carry the message after the test id: `FAILED a.py::test_x - msg`
    if let Some((_, message)) = tail.split_once(" - ") {
        if !message.trim().is_empty() {
            lines.push(message.trim().to_string());
        }
    }
    Some(Some(TextBlock {
        test_name,
        test_file: PathBuf::from(test_file),
        lines,
    }))
}

fn build_failure(
    test_name: String,
    test_file: PathBuf,
    full_error: &str,
    error_message: String,
) -> Option<SelectorFailure> {
    if !is_selector_failure(full_error) {
        debug!(test = %test_name, "failure text is not a locator failure");
        return None;
    }
    let Some(selector) = extract_selector(full_error) else {
        debug!(test = %test_name, "locator failure without an extractable selector");
        return None;
    };
    let kind = match classify_failure_kind(full_error) {
        FailureKind::Timeout => FailureKind::Timeout,
        _ => FailureKind::SelectorNotFound,
    };
    debug!(test = %test_name, selector = %selector, kind = kind.name(), "selector failure");
    Some(SelectorFailure::new(
        test_name,
        test_file,
        selector,
        kind,
        error_message,
    ))
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
