//! UI snapshot tree
//!
//! Nodes live in an arena indexed by position; each node records its parent and children so
//! structural paths can be rebuilt from any element up to the root.

use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tapmend_core_types::ElementAttributes;
use tracing::debug;

use crate::errors::SnapshotError;
use crate::limits::DiscoveryLimits;

/// Events processed between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Tags that carry no type information of their own.
const GENERIC_TAGS: [&str; 2] = ["node", "hierarchy"];

/// One element of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotNode {
    pub tag: String,
    pub attributes: ElementAttributes,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    /// 1-based rank among same-tag siblings, set only when the tag repeats under the parent
    pub position: Option<usize>,
}

/// Parsed snapshot; node `0` is the root.
#[derive(Debug, Clone, Default)]
pub struct UiSnapshot {
    nodes: Vec<SnapshotNode>,
}

impl UiSnapshot {
    /// Read and parse a snapshot file, rejecting files above the size limit before reading.
    pub fn load(path: &Path, limits: &DiscoveryLimits) -> Result<Self, SnapshotError> {
        let io_err = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > limits.max_snapshot_bytes {
            return Err(SnapshotError::LimitExceeded {
                limit: "max_snapshot_bytes",
                value: size,
                max: limits.max_snapshot_bytes,
            });
        }
        let content = std::fs::read_to_string(path).map_err(io_err)?;
        Self::parse(&content, limits)
    }

    pub fn parse(markup: &str, limits: &DiscoveryLimits) -> Result<Self, SnapshotError> {
        let size = markup.len() as u64;
        if size > limits.max_snapshot_bytes {
            return Err(SnapshotError::LimitExceeded {
                limit: "max_snapshot_bytes",
                value: size,
                max: limits.max_snapshot_bytes,
            });
        }

        let started = Instant::now();
        let deadline = limits.timeout();
        let mut reader = Reader::from_str(markup);
        reader.config_mut().trim_text(true);

        let mut nodes: Vec<SnapshotNode> = Vec::new();
        let mut stack: Vec<usize> = Vec::new();
        let mut events = 0usize;

        loop {
            events += 1;
            if events % DEADLINE_CHECK_INTERVAL == 0 && started.elapsed() > deadline {
                return Err(SnapshotError::LimitExceeded {
                    limit: "timeout_ms",
                    value: started.elapsed().as_millis() as u64,
                    max: limits.timeout_ms,
                });
            }

            let event = reader.read_event().map_err(|e| SnapshotError::Malformed {
                position: reader.buffer_position() as u64,
                message: e.to_string(),
            })?;
            match event {
                Event::Start(e) => {
                    let index = push_node(&mut nodes, &stack, &e, limits)?;
                    stack.push(index);
                    if stack.len() > limits.max_depth {
                        return Err(SnapshotError::LimitExceeded {
                            limit: "max_depth",
                            value: stack.len() as u64,
                            max: limits.max_depth as u64,
                        });
                    }
                }
                Event::Empty(e) => {
                    push_node(&mut nodes, &stack, &e, limits)?;
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if nodes.is_empty() {
            return Err(SnapshotError::Empty);
        }
        assign_sibling_positions(&mut nodes);
        debug!(elements = nodes.len(), "parsed ui snapshot");
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&SnapshotNode> {
        self.nodes.get(index)
    }

    /// Nodes in document order, with their arena index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SnapshotNode)> {
        self.nodes.iter().enumerate()
    }

    /// Structural path from the root: `//root/child[2]/leaf`.
    ///
    /// A step carries a 1-based position only when its parent has more than one child with
    /// the same tag.
    pub fn structural_path(&self, index: usize) -> String {
        let mut steps = Vec::new();
        let mut current = Some(index);
        while let Some(node) = current.and_then(|i| self.nodes.get(i)) {
            steps.push(match node.position {
                Some(pos) => format!("{}[{}]", node.tag, pos),
                None => node.tag.clone(),
            });
            current = node.parent;
        }
        steps.reverse();
        format!("//{}", steps.join("/"))
    }
}

/// One pass over every child list; each node is ranked exactly once.
fn assign_sibling_positions(nodes: &mut [SnapshotNode]) {
    let mut ranked: Vec<(usize, usize)> = Vec::new();
    for parent in nodes.iter() {
        if parent.children.len() < 2 {
            continue;
        }
        let mut totals: HashMap<&str, usize> = HashMap::new();
        for &child in &parent.children {
            *totals.entry(nodes[child].tag.as_str()).or_default() += 1;
        }
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for &child in &parent.children {
            let tag = nodes[child].tag.as_str();
            if totals.get(tag).copied().unwrap_or(0) > 1 {
                let rank = seen.entry(tag).or_default();
                *rank += 1;
                ranked.push((child, *rank));
            }
        }
    }
    for (child, rank) in ranked {
        nodes[child].position = Some(rank);
    }
}

fn push_node(
    nodes: &mut Vec<SnapshotNode>,
    stack: &[usize],
    element: &BytesStart<'_>,
    limits: &DiscoveryLimits,
) -> Result<usize, SnapshotError> {
    if nodes.len() >= limits.max_elements {
        return Err(SnapshotError::LimitExceeded {
            limit: "max_elements",
            value: nodes.len() as u64 + 1,
            max: limits.max_elements as u64,
        });
    }
    let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let attributes = normalize_attributes(&tag, element);
    let parent = stack.last().copied();
    let index = nodes.len();
    nodes.push(SnapshotNode {
        tag,
        attributes,
        parent,
        children: Vec::new(),
        position: None,
    });
    if let Some(parent) = parent {
        nodes[parent].children.push(index);
    }
    Ok(index)
}

/// Map Android and iOS attribute dialects onto [`ElementAttributes`].
fn normalize_attributes(tag: &str, element: &BytesStart<'_>) -> ElementAttributes {
    let mut raw: Vec<(String, String)> = Vec::new();
    for attr in element.attributes().flatten() {
        if let Ok(value) = attr.unescape_value() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            raw.push((key, value.into_owned()));
        }
    }
    let get = |key: &str| {
        raw.iter()
            .find(|(k, v)| k == key && !v.is_empty())
            .map(|(_, v)| v.clone())
    };

    let class_name = get("class").or_else(|| get("type")).or_else(|| {
        (!GENERIC_TAGS.contains(&tag)).then(|| tag.to_string())
    });
    let bounds = get("bounds").or_else(|| ios_bounds(&get));

    ElementAttributes {
        identifier: get("resource-id"),
        accessibility_name: get("name").or_else(|| get("label")),
        text: get("text").or_else(|| get("value")),
        content_description: get("content-desc"),
        class_name,
        clickable: get("clickable").is_some_and(|v| v == "true"),
        enabled: get("enabled").map_or(true, |v| v == "true"),
        bounds,
    }
}

fn ios_bounds(get: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let x: i64 = get("x")?.parse().ok()?;
    let y: i64 = get("y")?.parse().ok()?;
    let width: i64 = get("width")?.parse().ok()?;
    let height: i64 = get("height")?.parse().ok()?;
    let right = x.checked_add(width)?;
    let bottom = y.checked_add(height)?;
    Some(format!("[{x},{y}][{right},{bottom}]"))
}
