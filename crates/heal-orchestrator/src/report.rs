use crate::result::HealingResult;

const RULE_WIDTH: usize = 80;

/// Plain-text healing report. Every result appears exactly once, healed or not.
pub fn generate_report(results: &[HealingResult]) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let total = results.len();
    let healed: Vec<&HealingResult> = results.iter().filter(|r| r.success).collect();
    let failed: Vec<&HealingResult> = results.iter().filter(|r| !r.success).collect();
    let percent = if total == 0 {
        0.0
    } else {
        healed.len() as f64 / total as f64 * 100.0
    };

    let mut lines = vec![
        rule.clone(),
        "HEALING REPORT".to_string(),
        rule.clone(),
        String::new(),
        format!("Total failures: {total}"),
        format!("Successfully healed: {} ({percent:.1}%)", healed.len()),
        format!("Failed to heal: {}", failed.len()),
        String::new(),
        rule.clone(),
        String::new(),
    ];

    if !healed.is_empty() {
        lines.push("SUCCESSFUL HEALINGS:".to_string());
        lines.push(String::new());
        for (i, result) in healed.iter().enumerate() {
            let failure = &result.failure;
            lines.push(format!("{}. {}", i + 1, failure.test_name));
            lines.push(format!("   Element: {}", failure.symbol().unwrap_or("unknown")));
            lines.push(format!("   Old: {}", failure.selector.display_tuple()));
            if let Some(best) = &result.best_match {
                lines.push(format!("   New: {}", best.selector.selector.display_tuple()));
                lines.push(format!("   Confidence: {:.2}", best.combined_confidence));
                lines.push(format!("   Strategy: {}", best.selector.strategy()));
            }
            if let Some(update) = &result.update {
                lines.push(format!("   File: {}", update.file.display()));
            }
            lines.push(String::new());
        }
    }

    if !failed.is_empty() {
        lines.push("FAILED HEALINGS:".to_string());
        lines.push(String::new());
        for (i, result) in failed.iter().enumerate() {
            let failure = &result.failure;
            lines.push(format!("{}. {}", i + 1, failure.test_name));
            lines.push(format!("   Element: {}", failure.symbol().unwrap_or("unknown")));
            lines.push(format!("   Selector: {}", failure.selector.display_tuple()));
            lines.push(format!("   State: {}", result.state));
            lines.push(format!("   Reason: {}", result.reason_message()));
            lines.push(String::new());
        }
    }

    lines.push(rule);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::HealingState;
    use tapmend_core_types::{FailureKind, HealFailureReason, Selector, SelectorFailure, SelectorStrategy};

    fn failure(name: &str) -> SelectorFailure {
        SelectorFailure::new(
            name,
            "tests/test_login.py",
            Selector::new(SelectorStrategy::Id, "old_submit"),
            FailureKind::SelectorNotFound,
            "NoSuchElementException",
        )
    }

    #[test]
    fn test_empty_report() {
        let report = generate_report(&[]);
        assert!(report.contains("Total failures: 0"));
        assert!(report.contains("Successfully healed: 0 (0.0%)"));
        assert!(!report.contains("FAILED HEALINGS:"));
    }

    #[test]
    fn test_failures_carry_reason() {
        let results = vec![
            HealingResult::failed(
                failure("test_login"),
                HealingState::RejectedLowConfidence,
                HealFailureReason::LowConfidence {
                    confidence: 0.55,
                    threshold: 0.7,
                },
            ),
            HealingResult::failed(
                failure("test_logout"),
                HealingState::NoPageSource,
                HealFailureReason::input_missing("no UI snapshot"),
            ),
        ];
        let report = generate_report(&results);
        assert!(report.contains("Failed to heal: 2"));
        assert!(report.contains("1. test_login"));
        assert!(report.contains("   Reason: LowConfidence: confidence too low: 0.55 < 0.70"));
        assert!(report.contains("2. test_logout"));
        assert!(report.contains("   State: no_page_source"));
        assert!(report.ends_with(&"=".repeat(80)));
    }
}
