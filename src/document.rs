/*!
 * Chapter document model.
 *
 * Chapters are parsed into an arena of nodes referenced by index, which keeps
 * the mixed-content model (leading text plus per-child trailing text) explicit
 * and avoids ownership cycles. Parsing is tolerant: malformed markup degrades
 * to a best-effort tree and never aborts a run.
 *
 * Serialization emits an explicit `<tag></tag>` pair for any element whose
 * leading text is present-but-empty. HTML-based EPUB readers treat a
 * self-closing inline element (`<span/>`) as an unterminated opening tag and
 * bleed its styling over the rest of the chapter, so the writeback path sets
 * empty strings rather than clearing the slots.
 */

use quick_xml::Reader;
use quick_xml::events::Event;

/// Index of a node inside its document's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// What a node represents in the markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Comment,
    ProcessingInstruction,
}

/// One node of the mixed-content tree.
///
/// `text` is the content before the first child (or the sole content), `tail`
/// is the content after this node's end tag but still inside the parent. For
/// comments and processing instructions `text` holds the raw content and only
/// `tail` participates in text extraction.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub text: Option<String>,
    pub tail: Option<String>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind, tag: String) -> Self {
        Self {
            kind,
            tag,
            attrs: Vec::new(),
            text: None,
            tail: None,
            children: Vec::new(),
            parent: None,
        }
    }

    /// Tag name without a namespace prefix, lowercased
    pub fn local_name(&self) -> String {
        local_name(&self.tag)
    }

    /// Look up an attribute value by its full name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Tag name without a namespace prefix, lowercased
pub fn local_name(tag: &str) -> String {
    match tag.rsplit_once(':') {
        Some((_, local)) => local.to_ascii_lowercase(),
        None => tag.to_ascii_lowercase(),
    }
}

/// A parsed chapter: node arena plus the document prolog
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    top: Vec<NodeId>,
    xml_decl: Option<String>,
    doctype: Option<String>,
}

impl Document {
    /// Parse chapter bytes into a best-effort tree.
    ///
    /// Never fails: undecodable bytes are replaced, mismatched end tags are
    /// recovered by unwinding to the nearest matching open element, and
    /// anything past an unrecoverable parser error is dropped.
    pub fn parse(bytes: &[u8]) -> Self {
        let source = String::from_utf8_lossy(bytes);
        let mut reader = Reader::from_str(&source);
        reader.config_mut().check_end_names = false;

        let mut doc = Document {
            nodes: Vec::new(),
            top: Vec::new(),
            xml_decl: None,
            doctype: None,
        };
        // Stack of currently open elements.
        let mut open: Vec<NodeId> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Decl(decl)) => {
                    let version = decl
                        .version()
                        .map(|v| String::from_utf8_lossy(&v).into_owned())
                        .unwrap_or_else(|_| "1.0".to_string());
                    let mut rendered = format!("<?xml version=\"{}\"", version);
                    if let Some(Ok(encoding)) = decl.encoding() {
                        rendered.push_str(&format!(
                            " encoding=\"{}\"",
                            String::from_utf8_lossy(&encoding)
                        ));
                    }
                    if let Some(Ok(standalone)) = decl.standalone() {
                        rendered.push_str(&format!(
                            " standalone=\"{}\"",
                            String::from_utf8_lossy(&standalone)
                        ));
                    }
                    rendered.push_str("?>");
                    doc.xml_decl = Some(rendered);
                }
                Ok(Event::DocType(text)) => {
                    let inner = String::from_utf8_lossy(&text).trim().to_string();
                    doc.doctype = Some(format!("<!DOCTYPE {}>", inner));
                }
                Ok(Event::Start(start)) => {
                    let id = doc.push_element(&start, &open);
                    open.push(id);
                }
                Ok(Event::Empty(start)) => {
                    doc.push_element(&start, &open);
                }
                Ok(Event::End(end)) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).to_string();
                    // Unwind to the nearest matching open element; ignore
                    // stray end tags entirely.
                    if let Some(pos) = open
                        .iter()
                        .rposition(|id| doc.nodes[id.0].tag.eq_ignore_ascii_case(&name))
                    {
                        open.truncate(pos);
                    }
                }
                Ok(Event::Text(text)) => {
                    let decoded = match text.unescape() {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => decode_entities(&String::from_utf8_lossy(&text)),
                    };
                    doc.append_text(decoded, &open);
                }
                Ok(Event::CData(data)) => {
                    doc.append_text(String::from_utf8_lossy(&data).into_owned(), &open);
                }
                Ok(Event::Comment(text)) => {
                    let mut node = Node::new(NodeKind::Comment, String::new());
                    node.text = Some(String::from_utf8_lossy(&text).into_owned());
                    doc.attach(node, &open);
                }
                Ok(Event::PI(text)) => {
                    let mut node = Node::new(NodeKind::ProcessingInstruction, String::new());
                    node.text = Some(String::from_utf8_lossy(&text).into_owned());
                    doc.attach(node, &open);
                }
                Ok(Event::Eof) => break,
                // Unrecoverable parser state: keep whatever was built so far.
                Err(_) => break,
            }
        }

        doc
    }

    fn push_element(&mut self, start: &quick_xml::events::BytesStart<'_>, open: &[NodeId]) -> NodeId {
        let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut node = Node::new(NodeKind::Element, tag);
        for attr in start.attributes().with_checks(false).flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = match attr.unescape_value() {
                Ok(cow) => cow.into_owned(),
                Err(_) => decode_entities(&String::from_utf8_lossy(&attr.value)),
            };
            node.attrs.push((key, value));
        }
        self.attach(node, open)
    }

    fn attach(&mut self, mut node: Node, open: &[NodeId]) -> NodeId {
        let id = NodeId(self.nodes.len());
        match open.last() {
            Some(&parent) => {
                node.parent = Some(parent);
                self.nodes.push(node);
                self.nodes[parent.0].children.push(id);
            }
            None => {
                self.nodes.push(node);
                self.top.push(id);
            }
        }
        id
    }

    fn append_text(&mut self, chunk: String, open: &[NodeId]) {
        if chunk.is_empty() {
            return;
        }
        let target = match open.last() {
            Some(&parent) => {
                // Inside an element: text lands after the last child if there
                // is one, otherwise it is the element's leading text.
                match self.nodes[parent.0].children.last() {
                    Some(&last_child) => (last_child, true),
                    None => (parent, false),
                }
            }
            None => match self.top.last() {
                Some(&last_top) => (last_top, true),
                // Prolog whitespace; nowhere to hang it.
                None => return,
            },
        };
        let (id, is_tail) = target;
        let slot = if is_tail {
            &mut self.nodes[id.0].tail
        } else {
            &mut self.nodes[id.0].text
        };
        match slot {
            Some(existing) => existing.push_str(&chunk),
            None => *slot = Some(chunk),
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Ancestor chain from the node's parent up to a top-level node
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes[id.0].parent;
        while let Some(node) = current {
            out.push(node);
            current = self.nodes[node.0].parent;
        }
        out
    }

    /// All descendants of a node in document order, excluding the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(id, &mut out);
        out
    }

    fn collect_descendants(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[id.0].children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }

    /// All paragraph elements in document order
    pub fn paragraphs(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &top in &self.top {
            if self.is_paragraph(top) {
                out.push(top);
            }
            for id in self.descendants(top) {
                if self.is_paragraph(id) {
                    out.push(id);
                }
            }
        }
        out
    }

    fn is_paragraph(&self, id: NodeId) -> bool {
        let node = &self.nodes[id.0];
        node.kind == NodeKind::Element && node.local_name() == "p"
    }

    /// Text runs of a node in document order: its leading text, then every
    /// descendant's leading text and trailing text. The node's own trailing
    /// text belongs to its parent and is not included.
    pub fn text_runs(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_runs(id, true, &mut out);
        out
    }

    fn collect_runs<'a>(&'a self, id: NodeId, is_root: bool, out: &mut Vec<&'a str>) {
        let node = &self.nodes[id.0];
        if node.kind == NodeKind::Element {
            if let Some(text) = &node.text {
                out.push(text.as_str());
            }
            for &child in &node.children {
                self.collect_runs(child, false, out);
            }
        }
        if !is_root {
            if let Some(tail) = &node.tail {
                out.push(tail.as_str());
            }
        }
    }

    /// Concatenated text of a node and its descendants
    pub fn collect_text(&self, id: NodeId) -> String {
        self.text_runs(id).concat()
    }

    /// Whitespace-normalized text of the whole document: every run trimmed,
    /// empty runs dropped, the rest joined with single spaces
    pub fn normalized_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for &top in &self.top {
            for run in self.text_runs(top) {
                let trimmed = run.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }
        parts.join(" ")
    }

    /// Reproducible, human-readable locator for a node, e.g. `/html/body/p[2]`.
    ///
    /// A 1-based position is appended only when the node has same-tag element
    /// siblings, which keeps locators unique within a chapter for one pass.
    pub fn node_path(&self, id: NodeId) -> String {
        let mut steps = Vec::new();
        let mut current = id;
        loop {
            let node = &self.nodes[current.0];
            let siblings: Vec<NodeId> = match node.parent {
                Some(parent) => self.nodes[parent.0]
                    .children
                    .iter()
                    .copied()
                    .filter(|&sib| {
                        let s = &self.nodes[sib.0];
                        s.kind == NodeKind::Element && s.tag == node.tag
                    })
                    .collect(),
                None => self
                    .top
                    .iter()
                    .copied()
                    .filter(|&sib| {
                        let s = &self.nodes[sib.0];
                        s.kind == NodeKind::Element && s.tag == node.tag
                    })
                    .collect(),
            };
            let step = if siblings.len() > 1 {
                let position = siblings.iter().position(|&sib| sib == current).unwrap_or(0) + 1;
                format!("{}[{}]", node.tag, position)
            } else {
                node.tag.clone()
            };
            steps.push(step);
            match node.parent {
                Some(parent) => current = parent,
                None => break,
            }
        }
        steps.reverse();
        format!("/{}", steps.join("/"))
    }

    /// Serialize the document back to bytes.
    ///
    /// Elements with `text == Some("")` and no children are emitted as an
    /// explicit `<tag></tag>` pair; elements that never carried text stay
    /// self-closing (`<br/>`, `<img/>`).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = String::new();
        if let Some(decl) = &self.xml_decl {
            out.push_str(decl);
            out.push('\n');
        }
        if let Some(doctype) = &self.doctype {
            out.push_str(doctype);
            out.push('\n');
        }
        for &top in &self.top {
            self.write_node(top, &mut out);
            if let Some(tail) = &self.nodes[top.0].tail {
                out.push_str(&escape_text(tail));
            }
        }
        out.into_bytes()
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id.0];
        match node.kind {
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(node.text.as_deref().unwrap_or(""));
                out.push_str("-->");
            }
            NodeKind::ProcessingInstruction => {
                out.push_str("<?");
                out.push_str(node.text.as_deref().unwrap_or(""));
                out.push_str("?>");
            }
            NodeKind::Element => {
                out.push('<');
                out.push_str(&node.tag);
                for (key, value) in &node.attrs {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                if node.text.is_none() && node.children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                if let Some(text) = &node.text {
                    out.push_str(&escape_text(text));
                }
                for &child in &node.children {
                    self.write_node(child, out);
                    if let Some(tail) = &self.nodes[child.0].tail {
                        out.push_str(&escape_text(tail));
                    }
                }
                out.push_str("</");
                out.push_str(&node.tag);
                out.push('>');
            }
        }
    }
}

/// Decode the predefined XML entities and numeric character references.
///
/// Unknown named references (`&nbsp;` and friends are common in EPUB chapters)
/// are kept verbatim; the serializer's escaping leaves them intact so they
/// round-trip unchanged.
fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';') {
            Some(semi) if semi > 1 && semi <= 32 => {
                let name = &tail[1..semi];
                match decode_entity_name(name) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&tail[..=semi]),
                }
                rest = &tail[semi + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity_name(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = name.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// True when `text[start..]` opens an entity reference such as `&nbsp;` or `&#160;`
fn starts_entity_reference(text: &str, start: usize) -> bool {
    let tail = &text[start + 1..];
    match tail.find(';') {
        Some(semi) if semi >= 1 && semi <= 32 => {
            let name = &tail[..semi];
            let mut chars = name.chars();
            match chars.next() {
                Some('#') => chars.as_str().chars().all(|c| c.is_ascii_alphanumeric()),
                Some(c) if c.is_ascii_alphabetic() => chars.all(|c| c.is_ascii_alphanumeric()),
                _ => false,
            }
        }
        _ => false,
    }
}

fn escape_markup(value: &str, escape_quotes: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for (idx, ch) in value.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if escape_quotes => out.push_str("&quot;"),
            '&' => {
                if starts_entity_reference(value, idx) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            other => out.push(other),
        }
    }
    out
}

fn escape_text(value: &str) -> String {
    escape_markup(value, false)
}

fn escape_attr(value: &str) -> String {
    escape_markup(value, true)
}
