use std::fs;

use selector_discovery::{DiscoveryLimits, SelectorDiscovery, SnapshotError, UiSnapshot};
use tapmend_core_types::{ElementAttributes, HealFailureReason, Selector, SelectorStrategy};

const LOGIN_SCREEN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hierarchy rotation="0">
  <node class="android.widget.FrameLayout">
    <node class="android.widget.LinearLayout">
      <node class="android.widget.EditText" resource-id="email" text="Email address" clickable="true"/>
      <node class="android.widget.Button" resource-id="login_btn" text="Login" clickable="true"/>
      <node class="android.widget.ImageView" content-desc="Company logo"/>
      <node class="android.widget.Button" text="OK" clickable="true"/>
    </node>
  </node>
</hierarchy>"#;

#[test]
fn identifier_candidate_ranks_before_text() {
    let markup = r#"<hierarchy><node class="android.widget.Button" resource-id="login_btn" text="Login" clickable="true"/></hierarchy>"#;
    let set = SelectorDiscovery::default()
        .discover_from_str(markup, &Selector::new(SelectorStrategy::Id, "old_login"))
        .unwrap();

    let id_pos = set
        .iter()
        .position(|c| c.selector == Selector::new(SelectorStrategy::Id, "login_btn"))
        .unwrap();
    let text_pos = set
        .iter()
        .position(|c| c.selector == Selector::new(SelectorStrategy::Text, "Login"))
        .unwrap();
    assert_eq!(id_pos, 0);
    assert_eq!(set.as_slice()[id_pos].confidence, 0.95);
    assert_eq!(set.as_slice()[text_pos].confidence, 0.70);
    assert!(id_pos < text_pos);
}

#[test]
fn candidates_are_sorted_and_match_their_source_element() {
    let limits = DiscoveryLimits::default();
    let snapshot = UiSnapshot::parse(LOGIN_SCREEN, &limits).unwrap();
    let set = SelectorDiscovery::new(limits)
        .discover(&snapshot, &Selector::new(SelectorStrategy::Id, "gone"))
        .unwrap();

    assert!(!set.is_empty());
    for pair in set.as_slice().windows(2) {
        assert!(pair[0].confidence >= pair[1].confidence);
    }

    let sources: Vec<_> = snapshot
        .iter()
        .map(|(_, node)| node.attributes.to_map())
        .collect();
    for candidate in &set {
        assert!(
            sources
                .iter()
                .any(|source| ElementAttributes::matches_all(source, &candidate.attributes)),
            "candidate {candidate} does not match any element"
        );
    }

    let content_desc = set
        .iter()
        .find(|c| c.value() == "Company logo")
        .unwrap();
    assert_eq!(content_desc.selector.strategy, SelectorStrategy::Text);
    assert_eq!(content_desc.confidence, 0.75);

    assert!(set.iter().any(|c| c.value()
        == "//hierarchy/node/node/node[2]"
        && c.selector.strategy == SelectorStrategy::XPath));
}

#[test]
fn snapshot_files_are_bounded_before_reading() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screen.xml");
    fs::write(&path, LOGIN_SCREEN).unwrap();

    let discovery = SelectorDiscovery::new(DiscoveryLimits {
        max_snapshot_bytes: 64,
        ..DiscoveryLimits::default()
    });
    let err = discovery
        .discover_from_path(&path, &Selector::new(SelectorStrategy::Id, "x"))
        .unwrap_err();
    assert!(matches!(err, SnapshotError::LimitExceeded { .. }));
    assert!(matches!(err.reason(), HealFailureReason::NoCandidates { .. }));

    let missing = SelectorDiscovery::default()
        .discover_from_path(&dir.path().join("nope.xml"), &Selector::new(SelectorStrategy::Id, "x"))
        .unwrap_err();
    assert!(matches!(missing.reason(), HealFailureReason::InputMissing { .. }));
}

#[test]
fn limits_round_trip_through_json() {
    let limits: DiscoveryLimits =
        serde_json::from_str(r#"{"max_depth": 32, "structural_path": "flat"}"#).unwrap();
    assert_eq!(limits.max_depth, 32);
    assert_eq!(limits.max_elements, DiscoveryLimits::default().max_elements);
}

#[test]
fn wide_snapshots_discover_within_the_deadline() {
    let mut markup = String::from("<hierarchy>");
    for i in 0..20_000 {
        markup.push_str(&format!(r#"<node resource-id="row_{i}" clickable="true"/>"#));
    }
    markup.push_str("</hierarchy>");

    let set = SelectorDiscovery::default()
        .discover_from_str(&markup, &Selector::new(SelectorStrategy::Id, "gone"))
        .unwrap();
    assert_eq!(set.len(), 40_000);
    assert!(set
        .iter()
        .any(|c| c.value() == "//hierarchy/node[20000]"));
}
