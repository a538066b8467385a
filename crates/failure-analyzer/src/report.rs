use std::fmt::Write;

use tapmend_core_types::SelectorFailure;

const RULE_WIDTH: usize = 80;

/// Numbered, human-readable summary of detected selector failures.
pub fn generate_report(failures: &[SelectorFailure]) -> String {
    if failures.is_empty() {
        return "No selector failures detected.".to_string();
    }

    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "SELECTOR FAILURE ANALYSIS");
    let _ = writeln!(out, "{rule}\n");
    let _ = writeln!(out, "Found {} selector failure(s):\n", failures.len());

    for (i, failure) in failures.iter().enumerate() {
        let _ = writeln!(out, "{}. Test: {}", i + 1, failure.test_name);
        let _ = writeln!(
            out,
            "   Selector: ({}, '{}')",
            failure.selector.strategy, failure.selector.value
        );
        let _ = writeln!(out, "   Kind: {}", failure.kind.name());
        let _ = writeln!(out, "   File: {}", failure.test_file.display());
        if let Some(definition) = &failure.definition {
            let _ = writeln!(out, "   Definition: {}", definition.file.display());
            if let Some(container) = &definition.container {
                let _ = writeln!(out, "   Class: {container}");
            }
            if let Some(symbol) = &definition.symbol {
                let _ = writeln!(out, "   Symbol: {symbol}");
            }
        }
        if let Some(path) = &failure.screenshot {
            let _ = writeln!(out, "   Screenshot: {}", path.display());
        }
        if let Some(path) = &failure.ui_snapshot {
            let _ = writeln!(out, "   UI Snapshot: {}", path.display());
        }
        let error: String = failure.error_message.chars().take(100).collect();
        let _ = writeln!(out, "   Error: {error}...\n");
    }

    let _ = writeln!(out, "{rule}");
    out
}
