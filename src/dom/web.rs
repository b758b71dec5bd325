//! web-sys backend. Listeners, timers and the intersection observer translate
//! browser events into `ChromeEvent`s and push them through the event sink;
//! the returned `EventOutcome` is applied to the raw event.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Document, Element, ErrorEvent, Event, EventTarget, HtmlElement,
    IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, KeyboardEvent,
    Node, ScrollBehavior, ScrollToOptions, Window,
};

use super::Dom;
use crate::error::ChromeError;
use crate::model::{
    ChromeEvent, DomEventKind, EventOutcome, Handler, IntersectionEntry, IntersectionOptions,
    ListenTarget, TimerHandle, TimerToken,
};

pub type EventSink = Rc<dyn Fn(ChromeEvent<Element>) -> EventOutcome>;

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

pub struct WebDom {
    window: Window,
    document: Document,
    sink: EventSink,
    // one live callback per token; replaced closures are cleared first
    timers: Vec<(TimerToken, i32, Closure<dyn FnMut()>)>,
    observers: Vec<(IntersectionObserver, ObserverCallback)>,
}

impl WebDom {
    pub fn new(sink: EventSink) -> Result<Self, ChromeError> {
        let window = web_sys::window().ok_or(ChromeError::NoWindow)?;
        let document = window.document().ok_or(ChromeError::NoDocument)?;
        Ok(Self {
            window,
            document,
            sink,
            timers: Vec::new(),
            observers: Vec::new(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    pub fn is_complete(&self) -> bool {
        self.document.ready_state() == "complete"
    }

    fn html(node: &Element) -> Result<&HtmlElement, ChromeError> {
        node.dyn_ref::<HtmlElement>().ok_or_else(|| {
            ChromeError::Js(format!("<{}> is not an HTML element", node.tag_name()))
        })
    }
}

/// Closest element for an event target; text nodes resolve to their parent.
fn element_of(target: Option<EventTarget>) -> Option<Element> {
    let node = target?.dyn_into::<Node>().ok()?;
    match node.dyn_into::<Element>() {
        Ok(el) => Some(el),
        Err(node) => node.parent_element(),
    }
}

fn translate(
    handler: Handler,
    bound: Option<&Element>,
    e: &Event,
) -> Option<ChromeEvent<Element>> {
    Some(match handler {
        Handler::MenuToggle => ChromeEvent::MenuToggle,
        Handler::NavLinkDismiss => ChromeEvent::NavLinkDismiss,
        Handler::AnchorNavigate => ChromeEvent::AnchorNavigate {
            anchor: bound?.clone(),
        },
        Handler::OutsideClick => ChromeEvent::OutsideClick {
            target: element_of(e.target()),
        },
        Handler::EscapeKey => ChromeEvent::KeyDown {
            key: e.dyn_ref::<KeyboardEvent>()?.key(),
        },
        Handler::Resize => ChromeEvent::Resize,
        Handler::Scroll => ChromeEvent::Scroll,
        Handler::ScrollToTop => ChromeEvent::ScrollToTop,
        Handler::PageLoad => ChromeEvent::PageLoad,
        Handler::ScriptError => ChromeEvent::ScriptError {
            message: e
                .dyn_ref::<ErrorEvent>()
                .map(|ev| ev.message())
                .unwrap_or_default(),
        },
    })
}

impl Dom for WebDom {
    type Node = Element;

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    fn query_all(&self, selector: &str) -> Vec<Element> {
        let Ok(list) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|n| n.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn head(&self) -> Option<Element> {
        self.document.head().map(Element::from)
    }

    fn contains(&self, ancestor: &Element, node: &Element) -> bool {
        let node: &Node = node.as_ref();
        ancestor.contains(Some(node))
    }

    fn create_element(&mut self, tag: &str) -> Result<Element, ChromeError> {
        Ok(self.document.create_element(tag)?)
    }

    fn append_child(&mut self, parent: &Element, child: &Element) -> Result<(), ChromeError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn add_class(&mut self, node: &Element, class: &str) -> Result<(), ChromeError> {
        Ok(node.class_list().add_1(class)?)
    }

    fn remove_class(&mut self, node: &Element, class: &str) -> Result<(), ChromeError> {
        Ok(node.class_list().remove_1(class)?)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), ChromeError> {
        Ok(node.set_attribute(name, value)?)
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_text(&mut self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn text(&self, node: &Element) -> Option<String> {
        node.text_content()
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) -> Result<(), ChromeError> {
        Ok(Self::html(node)?.style().set_property(property, value)?)
    }

    fn offset_top(&self, node: &Element) -> f64 {
        Self::html(node)
            .map(|h| h.offset_top() as f64)
            .unwrap_or(0.0)
    }

    fn offset_height(&self, node: &Element) -> f64 {
        Self::html(node)
            .map(|h| h.offset_height() as f64)
            .unwrap_or(0.0)
    }

    fn client_height(&self, node: &Element) -> f64 {
        node.client_height() as f64
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn inner_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_to(&mut self, top: f64) {
        let opts = ScrollToOptions::new();
        opts.set_top(top);
        opts.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&opts);
    }

    fn replace_fragment(&mut self, fragment: &str) -> Result<(), ChromeError> {
        let url = format!("#{}", fragment);
        self.window
            .history()?
            .replace_state_with_url(&JsValue::NULL, "", Some(&url))?;
        Ok(())
    }

    fn set_timeout(&mut self, delay_ms: u32, token: TimerToken) -> Result<TimerHandle, ChromeError> {
        if let Some(pos) = self.timers.iter().position(|(t, _, _)| *t == token) {
            let (_, id, _) = self.timers.remove(pos);
            self.window.clear_timeout_with_handle(id);
        }
        let sink = self.sink.clone();
        let cb = Closure::wrap(Box::new(move || {
            sink(ChromeEvent::Timer(token));
        }) as Box<dyn FnMut()>);
        let id = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                delay_ms as i32,
            )?;
        self.timers.push((token, id, cb));
        Ok(TimerHandle(id))
    }

    fn clear_timeout(&mut self, handle: TimerHandle) {
        self.window.clear_timeout_with_handle(handle.0);
        self.timers.retain(|(_, id, _)| *id != handle.0);
    }

    fn observe_intersection(
        &mut self,
        targets: &[Element],
        options: &IntersectionOptions,
    ) -> Result<(), ChromeError> {
        let sink = self.sink.clone();
        let cb: ObserverCallback = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let batch: Vec<IntersectionEntry<Element>> = entries
                    .iter()
                    .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                if !batch.is_empty() {
                    sink(ChromeEvent::Intersection(batch));
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);
        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer = IntersectionObserver::new_with_options(cb.as_ref().unchecked_ref(), &init)?;
        for t in targets {
            observer.observe(t);
        }
        self.observers.push((observer, cb));
        Ok(())
    }

    fn unobserve(&mut self, node: &Element) {
        for (observer, _) in &self.observers {
            observer.unobserve(node);
        }
    }

    fn listen(
        &mut self,
        target: ListenTarget<Element>,
        kind: DomEventKind,
        handler: Handler,
    ) -> Result<(), ChromeError> {
        let sink = self.sink.clone();
        let bound = match &target {
            ListenTarget::Element(el) => Some(el.clone()),
            _ => None,
        };
        let cb = Closure::wrap(Box::new(move |e: Event| {
            let Some(event) = translate(handler, bound.as_ref(), &e) else {
                return;
            };
            let outcome = sink(event);
            if outcome.prevent_default {
                e.prevent_default();
            }
            if outcome.stop_propagation {
                e.stop_propagation();
            }
        }) as Box<dyn FnMut(Event)>);
        let et: &EventTarget = match &target {
            ListenTarget::Window => AsRef::<EventTarget>::as_ref(&self.window),
            ListenTarget::Document => AsRef::<EventTarget>::as_ref(&self.document),
            ListenTarget::Element(el) => AsRef::<EventTarget>::as_ref(el),
        };
        et.add_event_listener_with_callback(kind.name(), cb.as_ref().unchecked_ref())?;
        // listeners live for the page view
        cb.forget();
        Ok(())
    }
}
