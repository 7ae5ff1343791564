/*!
 * Protected-region classification.
 *
 * Decides, per paragraph node, whether its content may be rewritten or must be
 * left untouched, and why. The matchers are data (a tag table plus attribute
 * predicates from the configured [`ProtectionPolicy`]); the traversal is fixed:
 * the node and its ancestors are checked first, walking outward, then the
 * node's descendants — so a paragraph that merely contains a code block or a
 * footnote marker is protected as a whole.
 */

use serde::{Deserialize, Serialize};

use crate::app_config::ProtectionPolicy;
use crate::document::{Document, Node, NodeId, NodeKind};

/// Why a node was excluded from translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    ProtectedLink,
    ProtectedCode,
    ProtectedFootnote,
    ProtectedMetadata,
    Empty,
}

impl SkipReason {
    /// Wire spelling used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProtectedLink => "protected_link",
            Self::ProtectedCode => "protected_code",
            Self::ProtectedFootnote => "protected_footnote",
            Self::ProtectedMetadata => "protected_metadata",
            Self::Empty => "empty",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a node against the protection policy.
///
/// Returns the first match found on the node or an ancestor (inner-most
/// first), then the first match found on a descendant. `None` means the node
/// is translatable.
pub fn classify(doc: &Document, node: NodeId, policy: &ProtectionPolicy) -> Option<SkipReason> {
    let mut chain = vec![node];
    chain.extend(doc.ancestors(node));
    for id in chain {
        if let Some(reason) = match_node(doc.node(id), policy) {
            return Some(reason);
        }
    }

    for id in doc.descendants(node) {
        if let Some(reason) = match_node(doc.node(id), policy) {
            return Some(reason);
        }
    }

    None
}

fn match_node(node: &Node, policy: &ProtectionPolicy) -> Option<SkipReason> {
    if node.kind != NodeKind::Element {
        return None;
    }
    tag_reason(&node.local_name(), policy).or_else(|| attr_reason(node, policy))
}

fn tag_reason(local: &str, policy: &ProtectionPolicy) -> Option<SkipReason> {
    if policy.code_tags.iter().any(|t| t == local) {
        return Some(SkipReason::ProtectedCode);
    }
    if policy.metadata_tags.iter().any(|t| t == local) {
        return Some(SkipReason::ProtectedMetadata);
    }
    if policy.protect_links && local == "a" {
        return Some(SkipReason::ProtectedLink);
    }
    None
}

/// Metadata-attribute heuristics for footnote apparatus: a namespaced
/// `epub:type` or an ARIA `role` naming a note, or a class containing one of
/// the configured footnote keywords.
fn attr_reason(node: &Node, policy: &ProtectionPolicy) -> Option<SkipReason> {
    if let Some(epub_type) = node.attr("epub:type") {
        if epub_type.to_ascii_lowercase().contains("note") {
            return Some(SkipReason::ProtectedFootnote);
        }
    }
    if let Some(role) = node.attr("role") {
        if role.to_ascii_lowercase().contains("note") {
            return Some(SkipReason::ProtectedFootnote);
        }
    }
    if let Some(class) = node.attr("class") {
        let class = class.to_ascii_lowercase();
        if policy
            .footnote_class_keywords
            .iter()
            .any(|kw| class.contains(kw.as_str()))
        {
            return Some(SkipReason::ProtectedFootnote);
        }
    }
    None
}
