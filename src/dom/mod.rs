//! Narrow DOM facade the controller is written against. `web::WebDom` drives
//! a real document through web-sys; `fake::FakeDom` is an in-memory tree for
//! native tests.

#[cfg(any(test, feature = "fake-dom"))]
pub mod fake;
pub mod web;

use std::fmt::Debug;

use crate::error::ChromeError;
use crate::model::{
    DomEventKind, Handler, IntersectionOptions, ListenTarget, TimerHandle, TimerToken,
};

pub trait Dom {
    type Node: Clone + PartialEq + Debug;

    // Queries
    fn query(&self, selector: &str) -> Option<Self::Node>;
    fn query_all(&self, selector: &str) -> Vec<Self::Node>;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn body(&self) -> Option<Self::Node>;
    fn head(&self) -> Option<Self::Node>;
    /// Inclusive: a node contains itself.
    fn contains(&self, ancestor: &Self::Node, node: &Self::Node) -> bool;

    // Tree mutation
    fn create_element(&mut self, tag: &str) -> Result<Self::Node, ChromeError>;
    fn append_child(&mut self, parent: &Self::Node, child: &Self::Node) -> Result<(), ChromeError>;

    // Classes, attributes, text, style
    fn add_class(&mut self, node: &Self::Node, class: &str) -> Result<(), ChromeError>;
    fn remove_class(&mut self, node: &Self::Node, class: &str) -> Result<(), ChromeError>;
    fn has_class(&self, node: &Self::Node, class: &str) -> bool;
    fn set_attribute(
        &mut self,
        node: &Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), ChromeError>;
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
    fn set_text(&mut self, node: &Self::Node, text: &str);
    fn text(&self, node: &Self::Node) -> Option<String>;
    fn set_style(
        &mut self,
        node: &Self::Node,
        property: &str,
        value: &str,
    ) -> Result<(), ChromeError>;

    // Layout
    fn offset_top(&self, node: &Self::Node) -> f64;
    fn offset_height(&self, node: &Self::Node) -> f64;
    fn client_height(&self, node: &Self::Node) -> f64;

    // Viewport and location
    fn scroll_y(&self) -> f64;
    fn inner_width(&self) -> f64;
    /// Animated scroll to an absolute vertical offset.
    fn scroll_to(&mut self, top: f64);
    /// Swap the URL fragment in place: no navigation, no extra history entry.
    fn replace_fragment(&mut self, fragment: &str) -> Result<(), ChromeError>;

    // Timers
    fn set_timeout(&mut self, delay_ms: u32, token: TimerToken) -> Result<TimerHandle, ChromeError>;
    fn clear_timeout(&mut self, handle: TimerHandle);

    // Observation and subscription
    fn observe_intersection(
        &mut self,
        targets: &[Self::Node],
        options: &IntersectionOptions,
    ) -> Result<(), ChromeError>;
    fn unobserve(&mut self, node: &Self::Node);
    fn listen(
        &mut self,
        target: ListenTarget<Self::Node>,
        kind: DomEventKind,
        handler: Handler,
    ) -> Result<(), ChromeError>;
}
