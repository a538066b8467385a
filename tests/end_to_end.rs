use std::fs;
use std::path::Path;
use std::sync::Arc;

use tapmend::{
    analyze_failures, run_healing, HealingConfig, HealingInputs, HealingState, NoopSignal,
    SelectorStrategy,
};

const LOGIN_PAGE: &str = "class LoginPage:\n    username = (\"id\", \"user_field\")\n    submit = (\"id\", \"old_submit\")\n";

const JUNIT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="login" tests="3" failures="2">
    <testcase name="test_login" classname="tests.test_login" time="3.2">
      <failure message="NoSuchElementException">Unable to find element By.id: old_submit</failure>
    </testcase>
    <testcase name="test_totals" classname="tests.test_cart" time="0.4">
      <failure message="AssertionError: expected 3 items">assert 2 == 3</failure>
    </testcase>
    <testcase name="test_logout" classname="tests.test_login" time="1.1"/>
  </testsuite>
</testsuites>"#;

const SNAPSHOT: &str = r#"<hierarchy>
  <node class="android.widget.LinearLayout">
    <node resource-id="submit_button" class="android.widget.Button" text="Submit" clickable="true"/>
  </node>
</hierarchy>"#;

fn project(root: &Path) -> HealingInputs {
    fs::create_dir_all(root.join("pages")).unwrap();
    fs::create_dir_all(root.join("page_source")).unwrap();
    fs::create_dir_all(root.join("reports")).unwrap();
    fs::write(root.join("pages/login_page.py"), LOGIN_PAGE).unwrap();
    fs::write(root.join("page_source/test_login.xml"), SNAPSHOT).unwrap();
    fs::write(root.join("reports/junit.xml"), JUNIT).unwrap();

    HealingInputs {
        page_source_dir: Some(root.join("page_source")),
        page_objects_dir: Some(root.join("pages")),
        screenshots_dir: Some(root.join("screenshots")),
        ..HealingInputs::new(root.join("reports/junit.xml"), root)
    }
}

#[test]
fn analysis_links_snapshot_and_definition() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = project(dir.path());

    let failures = analyze_failures(&inputs).unwrap();
    assert_eq!(failures.len(), 1);
    let failure = &failures[0];
    assert_eq!(failure.test_name, "test_login");
    assert_eq!(failure.selector.strategy, SelectorStrategy::Id);
    assert_eq!(failure.selector.value, "old_submit");
    assert_eq!(
        failure.ui_snapshot.as_deref(),
        Some(dir.path().join("page_source/test_login.xml").as_path())
    );
    let definition = failure.definition.as_ref().unwrap();
    assert_eq!(definition.symbol.as_deref(), Some("submit"));
    assert_eq!(definition.container.as_deref(), Some("LoginPage"));
    assert!(failure.screenshot.is_none());
}

#[tokio::test]
async fn report_to_patched_page_object() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = project(dir.path());

    let outcome = run_healing(&inputs, HealingConfig::default(), Arc::new(NoopSignal))
        .await
        .unwrap();

    assert_eq!(outcome.batch.results.len(), 1);
    let result = &outcome.batch.results[0];
    assert_eq!(result.state, HealingState::Applied);
    assert!(result.success);

    let page = fs::read_to_string(dir.path().join("pages/login_page.py")).unwrap();
    assert!(page.contains("    submit = (\"id\", \"submit_button\")"));
    assert!(page.contains("    username = (\"id\", \"user_field\")"));
    assert!(outcome.report.contains("Successfully healed: 1 (100.0%)"));
    assert!(outcome.report.contains("   Element: submit"));
    assert!(outcome.batch.commit.is_none());
}

#[tokio::test]
async fn dry_run_leaves_sources_alone() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = project(dir.path());
    inputs.dry_run = true;

    let outcome = run_healing(&inputs, HealingConfig::default(), Arc::new(NoopSignal))
        .await
        .unwrap();

    assert_eq!(outcome.batch.healed(), 1);
    assert_eq!(outcome.batch.results[0].state, HealingState::Matched);
    assert_eq!(
        fs::read_to_string(dir.path().join("pages/login_page.py")).unwrap(),
        LOGIN_PAGE
    );
}

#[tokio::test]
async fn text_log_reports_are_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = project(dir.path());
    let log = dir.path().join("reports/pytest.log");
    fs::write(
        &log,
        "tests/test_login.py::test_login FAILED\nE   selenium.common.exceptions.NoSuchElementException: Unable to find element By.id: old_submit\n",
    )
    .unwrap();
    inputs.report = log;

    let outcome = run_healing(&inputs, HealingConfig::default(), Arc::new(NoopSignal))
        .await
        .unwrap();
    assert_eq!(outcome.failures.len(), 1);
    assert!(outcome.batch.results[0].success);
}

#[test]
fn missing_report_is_a_hard_error() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = HealingInputs::new(dir.path().join("absent.xml"), dir.path());

    let err = tokio_test::block_on(run_healing(
        &inputs,
        HealingConfig::default(),
        Arc::new(NoopSignal),
    ))
    .unwrap_err();
    assert!(format!("{err:#}").contains("absent.xml"));
}
