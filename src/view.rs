use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewNodeId(pub(crate) usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WidgetAction {
    Navigate {
        target: String,
        mode: Option<String>,
    },
    StartDiagnosis,
    SelectCoverage {
        part: String,
        premium: String,
        benefits: String,
    },
    ConfirmCoverage,
    Book {
        team: String,
    },
    SendChat,
    Pay,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ViewNodeKind {
    Root,
    Section { name: String, active: bool },
    Block,
    Text { value: String },
    Button { action: WidgetAction },
    Input { value: String },
    Modal,
    List,
    Feed { scroll_top: usize, scroll_height: usize },
    Message { text: String, outgoing: bool },
}

pub(crate) fn kind_label(kind: &ViewNodeKind) -> &'static str {
    match kind {
        ViewNodeKind::Root => "root",
        ViewNodeKind::Section { .. } => "section",
        ViewNodeKind::Block => "block",
        ViewNodeKind::Text { .. } => "text",
        ViewNodeKind::Button { .. } => "button",
        ViewNodeKind::Input { .. } => "input",
        ViewNodeKind::Modal => "modal",
        ViewNodeKind::List => "list",
        ViewNodeKind::Feed { .. } => "feed",
        ViewNodeKind::Message { .. } => "message",
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ViewNode {
    pub(crate) parent: Option<ViewNodeId>,
    pub(crate) children: Vec<ViewNodeId>,
    pub(crate) hidden: bool,
    pub(crate) kind: ViewNodeKind,
}

#[derive(Debug, Clone)]
pub(crate) struct View {
    nodes: Vec<ViewNode>,
    root: ViewNodeId,
    id_index: HashMap<String, ViewNodeId>,
}

impl View {
    pub(crate) fn new() -> Self {
        let root = ViewNode {
            parent: None,
            children: Vec::new(),
            hidden: false,
            kind: ViewNodeKind::Root,
        };
        Self {
            nodes: vec![root],
            root: ViewNodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn root(&self) -> ViewNodeId {
        self.root
    }

    pub(crate) fn create(&mut self, parent: ViewNodeId, kind: ViewNodeKind) -> ViewNodeId {
        let id = ViewNodeId(self.nodes.len());
        self.nodes.push(ViewNode {
            parent: Some(parent),
            children: Vec::new(),
            hidden: false,
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn create_hidden(&mut self, parent: ViewNodeId, kind: ViewNodeKind) -> ViewNodeId {
        let id = self.create(parent, kind);
        self.nodes[id.0].hidden = true;
        id
    }

    pub(crate) fn register(&mut self, id: &str, node: ViewNodeId) {
        self.id_index.insert(id.to_string(), node);
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<ViewNodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn require(&self, id: &str) -> Result<ViewNodeId> {
        self.by_id(id)
            .ok_or_else(|| Error::NodeNotFound(id.to_string()))
    }

    pub(crate) fn kind(&self, node: ViewNodeId) -> &ViewNodeKind {
        &self.nodes[node.0].kind
    }

    pub(crate) fn id_of(&self, node: ViewNodeId) -> Option<&str> {
        self.id_index
            .iter()
            .find(|(_, registered)| **registered == node)
            .map(|(id, _)| id.as_str())
    }

    fn kind_mismatch(&self, node: ViewNodeId, expected: &str) -> Error {
        Error::KindMismatch {
            id: self.id_of(node).unwrap_or("(anonymous)").to_string(),
            expected: expected.to_string(),
            actual: kind_label(&self.nodes[node.0].kind).to_string(),
        }
    }

    pub(crate) fn set_text(&mut self, node: ViewNodeId, text: &str) -> Result<()> {
        if !matches!(self.nodes[node.0].kind, ViewNodeKind::Text { .. }) {
            return Err(self.kind_mismatch(node, "text"));
        }
        if let ViewNodeKind::Text { value } = &mut self.nodes[node.0].kind {
            *value = text.to_string();
        }
        Ok(())
    }

    pub(crate) fn input_value(&self, node: ViewNodeId) -> Result<&str> {
        match &self.nodes[node.0].kind {
            ViewNodeKind::Input { value } => Ok(value.as_str()),
            _ => Err(self.kind_mismatch(node, "input")),
        }
    }

    pub(crate) fn set_input_value(&mut self, node: ViewNodeId, text: &str) -> Result<()> {
        if !matches!(self.nodes[node.0].kind, ViewNodeKind::Input { .. }) {
            return Err(self.kind_mismatch(node, "input"));
        }
        if let ViewNodeKind::Input { value } = &mut self.nodes[node.0].kind {
            *value = text.to_string();
        }
        Ok(())
    }

    pub(crate) fn hidden(&self, node: ViewNodeId) -> bool {
        self.nodes[node.0].hidden
    }

    pub(crate) fn set_hidden(&mut self, node: ViewNodeId, hidden: bool) {
        self.nodes[node.0].hidden = hidden;
    }

    // Hidden flags and inactive sections both take a subtree out of the
    // rendered page, so visibility walks the ancestor chain.
    pub(crate) fn effectively_hidden(&self, node: ViewNodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            let entry = &self.nodes[current.0];
            if entry.hidden {
                return true;
            }
            if let ViewNodeKind::Section { active, .. } = &entry.kind {
                if !active {
                    return true;
                }
            }
            cursor = entry.parent;
        }
        false
    }

    pub(crate) fn activate_section(&mut self, target: &str) -> bool {
        let mut matched = false;
        for node in &mut self.nodes {
            if let ViewNodeKind::Section { name, active } = &mut node.kind {
                *active = name.as_str() == target;
                matched |= *active;
            }
        }
        matched
    }

    pub(crate) fn active_section(&self) -> Option<&str> {
        self.nodes.iter().find_map(|node| match &node.kind {
            ViewNodeKind::Section { name, active: true } => Some(name.as_str()),
            _ => None,
        })
    }

    pub(crate) fn sections_summary(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            if let ViewNodeKind::Section { name, active } = &node.kind {
                if !out.is_empty() {
                    out.push(' ');
                }
                if *active {
                    out.push('*');
                }
                out.push_str(name);
            }
        }
        out
    }

    // Orphaned nodes stay in the arena; slots are never reclaimed.
    pub(crate) fn clear_children(&mut self, node: ViewNodeId) {
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
    }

    pub(crate) fn push_text(&mut self, parent: ViewNodeId, text: &str) -> ViewNodeId {
        self.create(
            parent,
            ViewNodeKind::Text {
                value: text.to_string(),
            },
        )
    }

    pub(crate) fn push_message(
        &mut self,
        feed: ViewNodeId,
        text: &str,
        outgoing: bool,
    ) -> Result<ViewNodeId> {
        if !matches!(self.nodes[feed.0].kind, ViewNodeKind::Feed { .. }) {
            return Err(self.kind_mismatch(feed, "feed"));
        }
        let message = self.create(
            feed,
            ViewNodeKind::Message {
                text: text.to_string(),
                outgoing,
            },
        );
        Ok(message)
    }

    pub(crate) fn pin_feed_to_end(&mut self, feed: ViewNodeId) -> Result<()> {
        if !matches!(self.nodes[feed.0].kind, ViewNodeKind::Feed { .. }) {
            return Err(self.kind_mismatch(feed, "feed"));
        }
        let height = self.nodes[feed.0].children.len();
        if let ViewNodeKind::Feed {
            scroll_top,
            scroll_height,
        } = &mut self.nodes[feed.0].kind
        {
            *scroll_height = height;
            *scroll_top = height;
        }
        Ok(())
    }

    pub(crate) fn feed_scroll(&self, feed: ViewNodeId) -> Result<(usize, usize)> {
        match &self.nodes[feed.0].kind {
            ViewNodeKind::Feed {
                scroll_top,
                scroll_height,
            } => Ok((*scroll_top, *scroll_height)),
            _ => Err(self.kind_mismatch(feed, "feed")),
        }
    }

    pub(crate) fn messages(&self, feed: ViewNodeId) -> Vec<String> {
        self.nodes[feed.0]
            .children
            .iter()
            .filter_map(|child| match &self.nodes[child.0].kind {
                ViewNodeKind::Message { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn text_content(&self, node: ViewNodeId) -> String {
        match &self.nodes[node.0].kind {
            ViewNodeKind::Text { value } => value.clone(),
            ViewNodeKind::Message { text, .. } => text.clone(),
            ViewNodeKind::Input { .. } => String::new(),
            _ => {
                let mut out = String::new();
                for child in &self.nodes[node.0].children {
                    out.push_str(&self.text_content(*child));
                }
                out
            }
        }
    }

    pub(crate) fn child_texts(&self, node: ViewNodeId) -> Vec<String> {
        self.nodes[node.0]
            .children
            .iter()
            .map(|child| self.text_content(*child))
            .collect()
    }

    pub(crate) fn dump_node(&self, node: ViewNodeId) -> String {
        let mut out = String::new();
        self.dump_into(node, &mut out);
        out
    }

    fn dump_into(&self, node: ViewNodeId, out: &mut String) {
        let entry = &self.nodes[node.0];
        match &entry.kind {
            ViewNodeKind::Text { value } => out.push_str(value),
            ViewNodeKind::Message { text, outgoing } => {
                let direction = if *outgoing { "out" } else { "in" };
                out.push_str(&format!("[msg {direction} {text}]"));
            }
            ViewNodeKind::Input { value } => out.push_str(&format!("[input {value}]")),
            kind => {
                out.push('<');
                out.push_str(kind_label(kind));
                if let Some(id) = self.id_of(node) {
                    out.push_str(&format!(" #{id}"));
                }
                if let ViewNodeKind::Section { active: true, .. } = kind {
                    out.push_str(" active");
                }
                if entry.hidden {
                    out.push_str(" hidden");
                }
                out.push('>');
                for child in &entry.children {
                    self.dump_into(*child, out);
                }
                out.push_str("</");
                out.push_str(kind_label(kind));
                out.push('>');
            }
        }
    }
}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
