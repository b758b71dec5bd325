//! Event and outcome types shared by the controller and the DOM backends.
//! Backends translate raw browser events into `ChromeEvent`s; the controller
//! answers each one with an `EventOutcome` the backend applies.

/// Which controller reaction a subscription is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    MenuToggle,
    NavLinkDismiss,
    AnchorNavigate,
    OutsideClick,
    EscapeKey,
    Resize,
    Scroll,
    ScrollToTop,
    PageLoad,
    ScriptError,
}

/// Pending timer purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerToken {
    /// Debounced resize has gone quiet.
    ResizeSettled,
    /// Post-load delay before the hero block fades in.
    HeroReveal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle(pub i32);

#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionEntry<N> {
    pub target: N,
    pub is_intersecting: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ChromeEvent<N> {
    MenuToggle,
    NavLinkDismiss,
    /// Click on an in-page `a[href^="#"]`; `anchor` is the link itself.
    AnchorNavigate { anchor: N },
    /// Document-level click; `target` is `None` when the click had no element target.
    OutsideClick { target: Option<N> },
    KeyDown { key: String },
    Resize,
    Scroll,
    ScrollToTop,
    PageLoad,
    ScriptError { message: String },
    Timer(TimerToken),
    Intersection(Vec<IntersectionEntry<N>>),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
}

impl EventOutcome {
    pub const NONE: EventOutcome = EventOutcome {
        prevent_default: false,
        stop_propagation: false,
    };

    pub fn prevent_default() -> Self {
        Self {
            prevent_default: true,
            ..Self::NONE
        }
    }

    pub fn stop_propagation() -> Self {
        Self {
            stop_propagation: true,
            ..Self::NONE
        }
    }
}

/// Where a listener is attached.
#[derive(Clone, Debug, PartialEq)]
pub enum ListenTarget<N> {
    Window,
    Document,
    Element(N),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomEventKind {
    Click,
    KeyDown,
    Scroll,
    Resize,
    Load,
    Error,
}

impl DomEventKind {
    pub fn name(self) -> &'static str {
        match self {
            DomEventKind::Click => "click",
            DomEventKind::KeyDown => "keydown",
            DomEventKind::Scroll => "scroll",
            DomEventKind::Resize => "resize",
            DomEventKind::Load => "load",
            DomEventKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionOptions {
    pub threshold: f64,
    pub root_margin: String,
}
