/*!
 * Text slots: extraction and redistribution.
 *
 * The source text of a paragraph is spread across multiple locations in
 * document order:
 *
 * ```text
 * <p>
 *   {p.text}
 *   <span>{span.text}</span>{span.tail}
 *   <em>{em.text}</em>{em.tail}
 * </p>
 * ```
 *
 * Extraction maps those locations to an ordered slot list; redistribution
 * splits one translated string back across the slots proportionally to each
 * slot's share of the original character count, snapping every split to a
 * word boundary. Each piece of text stays in its owner element so inline
 * styling (font-size spans, dropcaps, emphasis) lands on the right words of
 * the translated output.
 */

use crate::document::{Document, NodeId, NodeKind};

/// Which text location on the owner node a slot refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// The owner's leading text
    Text,
    /// The owner's trailing text, inside its parent
    Tail,
}

/// One addressable text-bearing location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSlot {
    pub owner: NodeId,
    pub kind: SlotKind,
}

impl TextSlot {
    fn content<'a>(&self, doc: &'a Document) -> Option<&'a str> {
        let node = doc.node(self.owner);
        match self.kind {
            SlotKind::Text => node.text.as_deref(),
            SlotKind::Tail => node.tail.as_deref(),
        }
    }

    fn write(&self, doc: &mut Document, value: String) {
        let node = doc.node_mut(self.owner);
        match self.kind {
            SlotKind::Text => node.text = Some(value),
            SlotKind::Tail => node.tail = Some(value),
        }
    }
}

/// Collect all non-empty text slots of a node in document order: the node's
/// own leading text, then each child's leading text and trailing text. Only
/// slots that contributed at least one character are included, so the
/// translation is distributed exactly over the locations that held source
/// text. Comment and processing-instruction children contribute their
/// trailing text only.
pub fn collect_text_slots(doc: &Document, node: NodeId) -> Vec<TextSlot> {
    let mut slots = Vec::new();
    let candidate = TextSlot {
        owner: node,
        kind: SlotKind::Text,
    };
    if candidate.content(doc).is_some_and(|t| !t.is_empty()) {
        slots.push(candidate);
    }
    for &child in doc.children(node) {
        if doc.node(child).kind == NodeKind::Element {
            let text_slot = TextSlot {
                owner: child,
                kind: SlotKind::Text,
            };
            if text_slot.content(doc).is_some_and(|t| !t.is_empty()) {
                slots.push(text_slot);
            }
        }
        let tail_slot = TextSlot {
            owner: child,
            kind: SlotKind::Tail,
        };
        if tail_slot.content(doc).is_some_and(|t| !t.is_empty()) {
            slots.push(tail_slot);
        }
    }
    slots
}

/// Split `translated` into `slot_lengths.len()` chunks proportional to
/// `slot_lengths`, snapping each split point to the nearest word boundary.
///
/// Concatenating the chunks always reproduces `translated` exactly: the final
/// slot receives whatever remains after the earlier proportional cuts. With a
/// single slot the whole string is returned as-is; when every weight is zero
/// the first slot takes everything. Lengths and positions are counted in
/// characters, not bytes.
pub fn distribute_text(translated: &str, slot_lengths: &[usize]) -> Vec<String> {
    if slot_lengths.is_empty() {
        return Vec::new();
    }
    if slot_lengths.len() == 1 {
        return vec![translated.to_string()];
    }

    let total_weight: usize = slot_lengths.iter().sum();
    if total_weight == 0 {
        let mut out = vec![translated.to_string()];
        out.resize(slot_lengths.len(), String::new());
        return out;
    }

    let mut result = Vec::with_capacity(slot_lengths.len());
    let mut remaining: Vec<char> = translated.chars().collect();
    let mut remaining_weight = total_weight;

    for &weight in &slot_lengths[..slot_lengths.len() - 1] {
        if remaining.is_empty() {
            result.push(String::new());
            continue;
        }

        let ideal = ((remaining.len() as f64) * (weight as f64) / (remaining_weight as f64))
            .round() as usize;
        let ideal = ideal.min(remaining.len());

        let split_pos = nearest_word_boundary(&remaining, ideal);

        result.push(remaining[..split_pos].iter().collect());
        // Do NOT trim — leading spaces belong to the next slot.
        remaining.drain(..split_pos);
        remaining_weight -= weight;
    }

    result.push(remaining.iter().collect());
    result
}

/// Index of the word boundary nearest to `pos`.
///
/// Scans forward and backward for whitespace and takes the closer side,
/// preferring forward on a tie. A forward split leaves the whitespace with
/// the next chunk; a backward split keeps it with the current chunk. Falls
/// back to `pos` itself when the text holds no whitespace at all.
fn nearest_word_boundary(text: &[char], pos: usize) -> usize {
    if pos >= text.len() {
        return text.len();
    }
    if pos == 0 {
        return 0;
    }

    let mut fwd = pos;
    while fwd < text.len() && !text[fwd].is_whitespace() {
        fwd += 1;
    }

    let mut bwd = pos - 1;
    while bwd > 0 && !text[bwd].is_whitespace() {
        bwd -= 1;
    }

    let dist_fwd = fwd - pos;
    let dist_bwd = pos - bwd;

    if dist_fwd <= dist_bwd {
        fwd
    } else {
        // +1: the whitespace stays with the previous chunk.
        bwd + 1
    }
}

/// Write a translation back into a node, redistributing it across the node's
/// original text slots.
///
/// A node with no slots at all receives the translation as its leading text.
/// Afterwards every element child that ended up with neither leading nor
/// trailing text gets both set to the empty string, so serialization emits an
/// explicit `<tag></tag>` pair instead of a self-closing form.
pub fn replace_node_text(doc: &mut Document, node: NodeId, translated: &str) {
    let slots = collect_text_slots(doc, node);

    if slots.is_empty() {
        doc.node_mut(node).text = Some(translated.to_string());
        return;
    }

    let slot_lengths: Vec<usize> = slots
        .iter()
        .map(|slot| slot.content(doc).map_or(0, |t| t.chars().count()))
        .collect();

    let chunks = distribute_text(translated, &slot_lengths);
    for (slot, chunk) in slots.iter().zip(chunks) {
        slot.write(doc, chunk);
    }

    let children: Vec<NodeId> = doc.children(node).to_vec();
    for child in children {
        if doc.node(child).kind != NodeKind::Element {
            continue;
        }
        let child_node = doc.node_mut(child);
        if child_node.text.is_none() {
            child_node.text = Some(String::new());
        }
        if child_node.tail.is_none() {
            child_node.tail = Some(String::new());
        }
    }
}
