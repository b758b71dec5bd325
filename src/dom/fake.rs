//! In-memory document used by the unit tests. Supports the selector subset
//! the controller needs (tag, `.class`, `#id`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]`, descendant combinator), a manual timer clock, and records
//! every scroll request, listener and observation.

use std::collections::BTreeMap;

use super::Dom;
use crate::error::ChromeError;
use crate::model::{
    DomEventKind, Handler, IntersectionOptions, ListenTarget, TimerHandle, TimerToken,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Clone, Debug, Default)]
struct FakeNode {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    text: String,
    offset_top: f64,
    offset_height: f64,
}

#[derive(Clone, Debug)]
struct PendingTimer {
    handle: TimerHandle,
    due_ms: u64,
    token: TimerToken,
}

#[derive(Clone, Debug)]
pub struct FakeDom {
    nodes: Vec<FakeNode>,
    head: NodeId,
    body: NodeId,
    now_ms: u64,
    next_timer: i32,
    timers: Vec<PendingTimer>,
    pub scroll_y: f64,
    pub inner_width: f64,
    pub scroll_requests: Vec<f64>,
    pub fragment: Option<String>,
    pub observed: Vec<NodeId>,
    pub observer_options: Option<IntersectionOptions>,
    pub listeners: Vec<(ListenTarget<NodeId>, DomEventKind, Handler)>,
    /// Make `observe_intersection` fail the way a browser rejects a bad `rootMargin`.
    pub fail_observe: bool,
}

impl Default for FakeDom {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDom {
    /// Empty `<html><head/><body/></html>` document, 1024px wide, scrolled to top.
    pub fn new() -> Self {
        let mut dom = FakeDom {
            nodes: Vec::new(),
            head: NodeId(0),
            body: NodeId(0),
            now_ms: 0,
            next_timer: 1,
            timers: Vec::new(),
            scroll_y: 0.0,
            inner_width: 1024.0,
            scroll_requests: Vec::new(),
            fragment: None,
            observed: Vec::new(),
            observer_options: None,
            listeners: Vec::new(),
            fail_observe: false,
        };
        let root = dom.alloc("html");
        dom.head = dom.alloc("head");
        dom.body = dom.alloc("body");
        dom.link(root, dom.head);
        dom.link(root, dom.body);
        dom
    }

    fn alloc(&mut self, tag: &str) -> NodeId {
        self.nodes.push(FakeNode {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        NodeId(self.nodes.len() - 1)
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.0].parent.take() {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn root(&self) -> NodeId {
        NodeId(0)
    }

    // Builders

    pub fn body_id(&self) -> NodeId {
        self.body
    }

    pub fn head_id(&self) -> NodeId {
        self.head
    }

    /// Create `<tag class="...">` and append it under `parent`.
    pub fn add(&mut self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let id = self.alloc(tag);
        self.nodes[id.0].classes = classes.iter().map(|c| c.to_string()).collect();
        self.link(parent, id);
        id
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node.0].attrs.insert("id".into(), id.into());
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        self.nodes[node.0].attrs.insert(name.into(), value.into());
    }

    pub fn set_text_raw(&mut self, node: NodeId, text: &str) {
        self.nodes[node.0].text = text.into();
    }

    /// Layout box: `offsetTop`, plus a height used for both offset and client height.
    pub fn set_geometry(&mut self, node: NodeId, top: f64, height: f64) {
        let n = &mut self.nodes[node.0];
        n.offset_top = top;
        n.offset_height = height;
    }

    // Inspection

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        self.nodes[node.0].styles.get(property).map(String::as_str)
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).len()
    }

    pub fn listener_count(&self, handler: Handler) -> usize {
        self.listeners.iter().filter(|(_, _, h)| *h == handler).count()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Move the clock forward and hand back the tokens of every timer that came
    /// due, in firing order.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerToken> {
        self.now_ms += ms;
        let now = self.now_ms;
        let mut due: Vec<PendingTimer> = Vec::new();
        self.timers.retain(|t| {
            if t.due_ms <= now {
                due.push(t.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|t| (t.due_ms, t.handle.0));
        due.into_iter().map(|t| t.token).collect()
    }

    // Selector engine

    fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            out.push(id);
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    fn matches(&self, node: NodeId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !last.matches(&self.nodes[node.0]) {
            return false;
        }
        let mut remaining = ancestors;
        let mut cursor = self.nodes[node.0].parent;
        while let Some((want, rest)) = remaining.split_last() {
            loop {
                let Some(p) = cursor else {
                    return false;
                };
                cursor = self.nodes[p.0].parent;
                if want.matches(&self.nodes[p.0]) {
                    break;
                }
            }
            remaining = rest;
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Clone, Debug, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

impl Compound {
    fn matches(&self, node: &FakeNode) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != node.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, op)| match (node.attrs.get(name), op) {
            (None, _) => false,
            (Some(_), AttrOp::Exists) => true,
            (Some(v), AttrOp::Equals(want)) => v == want,
            (Some(v), AttrOp::Prefix(want)) => v.starts_with(want.as_str()),
        })
    }
}

fn parse_selector(selector: &str) -> Vec<Compound> {
    selector.split_whitespace().map(parse_compound).collect()
}

fn parse_compound(src: &str) -> Compound {
    let is_break = |ch: char| matches!(ch, '.' | '#' | '[');
    let mut c = Compound::default();
    let tag_end = src.find(is_break).unwrap_or(src.len());
    if tag_end > 0 {
        c.tag = Some(src[..tag_end].to_ascii_lowercase());
    }
    let mut rest = &src[tag_end..];
    while let Some(first) = rest.chars().next() {
        match first {
            '[' => {
                let close = rest.find(']').unwrap_or(rest.len());
                c.attrs.push(parse_attr(&rest[1..close]));
                rest = rest.get(close + 1..).unwrap_or("");
            }
            '.' | '#' => {
                let body = &rest[1..];
                let end = body.find(is_break).unwrap_or(body.len());
                let name = body[..end].to_string();
                if first == '.' {
                    c.classes.push(name);
                } else {
                    c.id = Some(name);
                }
                rest = &body[end..];
            }
            _ => break,
        }
    }
    c
}

fn parse_attr(inner: &str) -> (String, AttrOp) {
    let unquote = |v: &str| v.trim_matches(|ch| ch == '"' || ch == '\'').to_string();
    if let Some((name, v)) = inner.split_once("^=") {
        (name.trim().to_string(), AttrOp::Prefix(unquote(v)))
    } else if let Some((name, v)) = inner.split_once('=') {
        (name.trim().to_string(), AttrOp::Equals(unquote(v)))
    } else {
        (inner.trim().to_string(), AttrOp::Exists)
    }
}

impl Dom for FakeDom {
    type Node = NodeId;

    fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let chain = parse_selector(selector);
        self.preorder()
            .into_iter()
            .filter(|id| self.matches(*id, &chain))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.preorder()
            .into_iter()
            .find(|n| self.nodes[n.0].attrs.get("id").map(String::as_str) == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn head(&self) -> Option<NodeId> {
        Some(self.head)
    }

    fn contains(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        let mut cursor = Some(*node);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.nodes[id.0].parent;
        }
        false
    }

    fn create_element(&mut self, tag: &str) -> Result<NodeId, ChromeError> {
        Ok(self.alloc(tag))
    }

    fn append_child(&mut self, parent: &NodeId, child: &NodeId) -> Result<(), ChromeError> {
        self.link(*parent, *child);
        Ok(())
    }

    fn add_class(&mut self, node: &NodeId, class: &str) -> Result<(), ChromeError> {
        let classes = &mut self.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
        Ok(())
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) -> Result<(), ChromeError> {
        self.nodes[node.0].classes.retain(|c| c != class);
        Ok(())
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), ChromeError> {
        if name == "class" {
            self.nodes[node.0].classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            self.set_attr(*node, name, value);
        }
        Ok(())
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        if name == "class" {
            return Some(self.nodes[node.0].classes.join(" "));
        }
        self.nodes[node.0].attrs.get(name).cloned()
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        self.set_text_raw(*node, text);
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        Some(self.nodes[node.0].text.clone())
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), ChromeError> {
        self.nodes[node.0]
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn offset_top(&self, node: &NodeId) -> f64 {
        self.nodes[node.0].offset_top
    }

    fn offset_height(&self, node: &NodeId) -> f64 {
        self.nodes[node.0].offset_height
    }

    fn client_height(&self, node: &NodeId) -> f64 {
        self.nodes[node.0].offset_height
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn inner_width(&self) -> f64 {
        self.inner_width
    }

    fn scroll_to(&mut self, top: f64) {
        self.scroll_requests.push(top);
        self.scroll_y = top.max(0.0);
    }

    fn replace_fragment(&mut self, fragment: &str) -> Result<(), ChromeError> {
        self.fragment = Some(fragment.to_string());
        Ok(())
    }

    fn set_timeout(&mut self, delay_ms: u32, token: TimerToken) -> Result<TimerHandle, ChromeError> {
        let handle = TimerHandle(self.next_timer);
        self.next_timer += 1;
        self.timers.push(PendingTimer {
            handle,
            due_ms: self.now_ms + delay_ms as u64,
            token,
        });
        Ok(handle)
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }

    fn observe_intersection(
        &mut self,
        targets: &[NodeId],
        options: &IntersectionOptions,
    ) -> Result<(), ChromeError> {
        if self.fail_observe {
            return Err(ChromeError::Js(format!(
                "SyntaxError: bad rootMargin {}",
                options.root_margin
            )));
        }
        self.observer_options = Some(options.clone());
        self.observed.extend_from_slice(targets);
        Ok(())
    }

    fn unobserve(&mut self, node: &NodeId) {
        self.observed.retain(|n| n != node);
    }

    fn listen(
        &mut self,
        target: ListenTarget<NodeId>,
        kind: DomEventKind,
        handler: Handler,
    ) -> Result<(), ChromeError> {
        self.listeners.push((target, kind, handler));
        Ok(())
    }
}
