//! The view state controller: one object per page view that owns the
//! resolved element references, the resize debounce handle and the reveal
//! bookkeeping, and turns every `ChromeEvent` into DOM mutations.

use crate::config::ChromeConfig;
use crate::dom::Dom;
use crate::error::ChromeError;
use crate::model::{
    ChromeEvent, DomEventKind, EventOutcome, Handler, IntersectionEntry, IntersectionOptions,
    ListenTarget, TimerToken,
};
use crate::state::{
    Debouncer, MenuState, RevealTracker, SectionBox, current_section, scroll_top_visible,
};
use crate::styles;
use crate::util::{cdebug, clog, cwarn, fragment_of};

pub mod selectors {
    pub const NAVBAR: &str = ".navbar";
    pub const NAV_CONTAINER: &str = ".nav-container";
    pub const NAV_MENU: &str = ".nav-menu";
    pub const NAV_LINKS: &str = ".nav-menu a";
    pub const FRAGMENT_LINKS: &str = "a[href^=\"#\"]";
    pub const HERO: &str = ".hero-content";
    pub const ARTICLE_CARDS: &str = ".article-card";
    pub const SECTION_TITLES: &str = ".section-title";
    pub const SECTIONS: &str = ".category-section";
    pub const MENU_BUTTON: &str = ".mobile-menu-btn";
    pub const SCROLL_TOP_BUTTON: &str = ".scroll-to-top";
}

pub const ACTIVE_CLASS: &str = "active";
pub const SHOW_CLASS: &str = "show";
pub const LOADED_CLASS: &str = "loaded";
pub const SCROLL_TOP_GLYPH: &str = "↑";

/// Element references resolved once at init.
#[derive(Clone, Debug)]
pub struct Elements<N> {
    pub navbar: Option<N>,
    pub nav_container: Option<N>,
    pub nav_menu: Option<N>,
    pub nav_links: Vec<N>,
    pub fragment_links: Vec<N>,
    pub hero: Option<N>,
    pub sections: Vec<N>,
    pub menu_button: Option<N>,
    pub scroll_top_button: Option<N>,
}

impl<N> Elements<N> {
    fn resolve<D: Dom<Node = N>>(dom: &D) -> Self {
        Self {
            navbar: dom.query(selectors::NAVBAR),
            nav_container: dom.query(selectors::NAV_CONTAINER),
            nav_menu: dom.query(selectors::NAV_MENU),
            nav_links: dom.query_all(selectors::NAV_LINKS),
            fragment_links: dom.query_all(selectors::FRAGMENT_LINKS),
            hero: dom.query(selectors::HERO),
            sections: dom.query_all(selectors::SECTIONS),
            menu_button: None,
            scroll_top_button: None,
        }
    }
}

/// Register the page-wide catch-all error listener. Done before the document
/// is ready, so it does not need a controller.
pub fn install_error_handler<D: Dom>(dom: &mut D) -> Result<(), ChromeError> {
    dom.listen(ListenTarget::Window, DomEventKind::Error, Handler::ScriptError)
}

/// Errors are swallowed: the static content renders regardless.
pub fn report_script_error(message: &str) {
    clog(&format!(
        "blog chrome hit a script error; static content is unaffected ({})",
        message
    ));
}

pub struct ViewStateController<D: Dom> {
    dom: D,
    config: ChromeConfig,
    els: Elements<D::Node>,
    reveal: RevealTracker<D::Node>,
    resize: Debouncer,
}

impl<D: Dom> ViewStateController<D> {
    /// Each setup step stands alone: a failing step is logged and the rest
    /// still run, so one broken behavior never takes the others down.
    pub fn init(dom: D, config: ChromeConfig) -> Self {
        let els = Elements::resolve(&dom);
        let resize = Debouncer::new(TimerToken::ResizeSettled, config.resize_debounce_ms);
        let mut ctl = ViewStateController {
            dom,
            config,
            els,
            reveal: RevealTracker::new(Vec::new()),
            resize,
        };
        setup_step("menu", ctl.setup_menu());
        setup_step("fragment links", ctl.setup_fragment_links());
        setup_step("reveal", ctl.setup_reveal());
        setup_step("hero", ctl.setup_hero());
        setup_step("scroll to top", ctl.setup_scroll_top());
        let loading_css = styles::loading_css(ctl.config.hero_duration_s);
        setup_step(
            "loading styles",
            ctl.inject_style(styles::LOADING_STYLE_ID, &loading_css),
        );
        setup_step(
            "scroll listener",
            ctl.dom
                .listen(ListenTarget::Window, DomEventKind::Scroll, Handler::Scroll),
        );
        setup_step(
            "load listener",
            ctl.dom
                .listen(ListenTarget::Window, DomEventKind::Load, Handler::PageLoad),
        );
        setup_step("initial scroll sync", ctl.sync_scroll());
        clog("blog chrome initialized");
        ctl
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }

    pub fn elements(&self) -> &Elements<D::Node> {
        &self.els
    }

    pub fn menu_state(&self) -> MenuState {
        let open = self
            .els
            .nav_menu
            .as_ref()
            .is_some_and(|m| self.dom.has_class(m, ACTIVE_CLASS));
        MenuState { open }
    }

    pub fn dispatch(&mut self, event: ChromeEvent<D::Node>) -> EventOutcome {
        let label = event_label(&event);
        match self.handle(event) {
            Ok(outcome) => outcome,
            Err(e) => {
                cwarn(&format!("{} handler failed: {}", label, e));
                EventOutcome::NONE
            }
        }
    }

    fn handle(&mut self, event: ChromeEvent<D::Node>) -> Result<EventOutcome, ChromeError> {
        match event {
            ChromeEvent::MenuToggle => {
                let next = self.menu_state().toggled();
                self.set_menu(next)?;
                return Ok(EventOutcome::stop_propagation());
            }
            ChromeEvent::NavLinkDismiss => self.close_menu()?,
            ChromeEvent::AnchorNavigate { anchor } => {
                self.navigate_to(&anchor)?;
                return Ok(EventOutcome::prevent_default());
            }
            ChromeEvent::OutsideClick { target } => self.on_outside_click(target.as_ref())?,
            ChromeEvent::KeyDown { key } => {
                if key == "Escape" && self.menu_state().open {
                    self.close_menu()?;
                }
            }
            ChromeEvent::Resize => self.resize.bump(&mut self.dom)?,
            ChromeEvent::Scroll => self.sync_scroll()?,
            ChromeEvent::ScrollToTop => self.dom.scroll_to(0.0),
            ChromeEvent::PageLoad => self.on_load()?,
            ChromeEvent::ScriptError { message } => report_script_error(&message),
            ChromeEvent::Timer(TimerToken::ResizeSettled) => {
                self.resize.settle();
                let width = self.dom.inner_width();
                if width > self.config.desktop_breakpoint_px && self.menu_state().open {
                    cdebug(self.config.debug, &format!("desktop width {}, closing menu", width));
                    self.close_menu()?;
                }
            }
            ChromeEvent::Timer(TimerToken::HeroReveal) => self.reveal_hero()?,
            ChromeEvent::Intersection(entries) => self.on_intersection(entries)?,
        }
        Ok(EventOutcome::NONE)
    }

    // Menu

    fn setup_menu(&mut self) -> Result<(), ChromeError> {
        let (Some(container), Some(_)) = (self.els.nav_container.clone(), self.els.nav_menu.clone())
        else {
            cwarn("navigation container or menu missing; mobile menu disabled");
            return Ok(());
        };
        let button = match self.dom.query(selectors::MENU_BUTTON) {
            Some(existing) => existing,
            None => {
                let b = self.dom.create_element("button")?;
                self.dom.set_attribute(&b, "class", "mobile-menu-btn")?;
                self.dom.append_child(&container, &b)?;
                b
            }
        };
        self.dom.set_attribute(&button, "aria-label", "Toggle menu")?;
        self.dom.set_attribute(&button, "role", "button")?;
        self.dom.set_attribute(&button, "tabindex", "0")?;
        self.els.menu_button = Some(button.clone());
        self.sync_menu_button(self.menu_state())?;

        self.dom.listen(
            ListenTarget::Element(button),
            DomEventKind::Click,
            Handler::MenuToggle,
        )?;
        for link in self.els.nav_links.clone() {
            self.dom.listen(
                ListenTarget::Element(link),
                DomEventKind::Click,
                Handler::NavLinkDismiss,
            )?;
        }
        self.dom
            .listen(ListenTarget::Document, DomEventKind::Click, Handler::OutsideClick)?;
        self.dom
            .listen(ListenTarget::Document, DomEventKind::KeyDown, Handler::EscapeKey)?;
        self.dom
            .listen(ListenTarget::Window, DomEventKind::Resize, Handler::Resize)?;
        Ok(())
    }

    fn set_menu(&mut self, state: MenuState) -> Result<(), ChromeError> {
        if let Some(menu) = &self.els.nav_menu {
            if state.open {
                self.dom.add_class(menu, ACTIVE_CLASS)?;
            } else {
                self.dom.remove_class(menu, ACTIVE_CLASS)?;
            }
        }
        self.sync_menu_button(state)
    }

    fn close_menu(&mut self) -> Result<(), ChromeError> {
        self.set_menu(MenuState { open: false })
    }

    fn sync_menu_button(&mut self, state: MenuState) -> Result<(), ChromeError> {
        if let Some(button) = &self.els.menu_button {
            self.dom.set_text(button, state.glyph());
            self.dom
                .set_attribute(button, "aria-expanded", state.aria_expanded())?;
        }
        Ok(())
    }

    fn on_outside_click(&mut self, target: Option<&D::Node>) -> Result<(), ChromeError> {
        let Some(container) = &self.els.nav_container else {
            return Ok(());
        };
        let inside = target.is_some_and(|t| self.dom.contains(container, t));
        if !inside && self.menu_state().open {
            self.close_menu()?;
        }
        Ok(())
    }

    // Smooth scroll

    fn setup_fragment_links(&mut self) -> Result<(), ChromeError> {
        for anchor in self.els.fragment_links.clone() {
            self.dom.listen(
                ListenTarget::Element(anchor),
                DomEventKind::Click,
                Handler::AnchorNavigate,
            )?;
        }
        Ok(())
    }

    fn header_height(&self) -> f64 {
        self.els
            .navbar
            .as_ref()
            .map(|n| self.dom.offset_height(n))
            .unwrap_or(0.0)
    }

    fn navigate_to(&mut self, anchor: &D::Node) -> Result<(), ChromeError> {
        let href = self.dom.attribute(anchor, "href").unwrap_or_default();
        let Some(id) = fragment_of(&href) else {
            return Ok(());
        };
        let Some(target) = self.dom.element_by_id(id) else {
            cdebug(self.config.debug, &format!("no element for #{}", id));
            return Ok(());
        };
        if self.menu_state().open {
            self.close_menu()?;
        }
        let top = self.dom.offset_top(&target) - self.header_height();
        self.dom.scroll_to(top);
        self.dom.replace_fragment(id)
    }

    // Reveal on scroll

    fn setup_reveal(&mut self) -> Result<(), ChromeError> {
        let mut targets = self.dom.query_all(selectors::ARTICLE_CARDS);
        for title in self.dom.query_all(selectors::SECTION_TITLES) {
            if !targets.contains(&title) {
                targets.push(title);
            }
        }
        if targets.is_empty() {
            return Ok(());
        }
        // only hide once an observer exists to bring the targets back
        let options = IntersectionOptions {
            threshold: self.config.reveal_threshold,
            root_margin: self.config.reveal_root_margin(),
        };
        self.dom.observe_intersection(&targets, &options)?;
        let hidden = self.config.hidden_transform();
        for t in &targets {
            self.dom.set_style(t, "opacity", "0")?;
            self.dom.set_style(t, "transform", &hidden)?;
        }
        self.reveal = RevealTracker::new(targets);
        Ok(())
    }

    fn on_intersection(
        &mut self,
        entries: Vec<IntersectionEntry<D::Node>>,
    ) -> Result<(), ChromeError> {
        let transition = self.config.reveal_transition();
        for entry in entries {
            if !entry.is_intersecting || !self.reveal.reveal(&entry.target) {
                continue;
            }
            self.dom.set_style(&entry.target, "opacity", "1")?;
            self.dom
                .set_style(&entry.target, "transform", "translateY(0)")?;
            self.dom.set_style(&entry.target, "transition", &transition)?;
            self.dom.unobserve(&entry.target);
        }
        Ok(())
    }

    // Hero and load sequencing

    fn setup_hero(&mut self) -> Result<(), ChromeError> {
        if let Some(hero) = &self.els.hero {
            self.dom.set_style(hero, "opacity", "0")?;
            self.dom
                .set_style(hero, "transform", &self.config.hidden_transform())?;
        }
        Ok(())
    }

    fn on_load(&mut self) -> Result<(), ChromeError> {
        if let Some(body) = self.dom.body() {
            self.dom.add_class(&body, LOADED_CLASS)?;
        }
        self.dom
            .set_timeout(self.config.hero_reveal_delay_ms, TimerToken::HeroReveal)?;
        Ok(())
    }

    fn reveal_hero(&mut self) -> Result<(), ChromeError> {
        if let Some(hero) = &self.els.hero {
            self.dom.set_style(hero, "opacity", "1")?;
            self.dom.set_style(hero, "transform", "translateY(0)")?;
            self.dom
                .set_style(hero, "transition", &self.config.hero_transition())?;
        }
        Ok(())
    }

    // Scroll-to-top and active section

    fn setup_scroll_top(&mut self) -> Result<(), ChromeError> {
        let Some(body) = self.dom.body() else {
            return Err(ChromeError::MissingElement("body"));
        };
        let button = match self.dom.query(selectors::SCROLL_TOP_BUTTON) {
            Some(existing) => existing,
            None => {
                let b = self.dom.create_element("button")?;
                self.dom.set_attribute(&b, "class", "scroll-to-top")?;
                self.dom.append_child(&body, &b)?;
                b
            }
        };
        self.dom.set_text(&button, SCROLL_TOP_GLYPH);
        self.dom.set_attribute(&button, "aria-label", "Scroll to top")?;
        self.dom.listen(
            ListenTarget::Element(button.clone()),
            DomEventKind::Click,
            Handler::ScrollToTop,
        )?;
        self.els.scroll_top_button = Some(button);
        self.inject_style(styles::SCROLL_TOP_STYLE_ID, styles::SCROLL_TOP_CSS)
    }

    fn inject_style(&mut self, id: &str, css: &str) -> Result<(), ChromeError> {
        if self.dom.element_by_id(id).is_some() {
            return Ok(());
        }
        let Some(head) = self.dom.head() else {
            return Err(ChromeError::MissingElement("head"));
        };
        let style = self.dom.create_element("style")?;
        self.dom.set_attribute(&style, "id", id)?;
        self.dom.set_text(&style, css);
        self.dom.append_child(&head, &style)
    }

    fn sync_scroll(&mut self) -> Result<(), ChromeError> {
        let y = self.dom.scroll_y();
        if let Some(button) = &self.els.scroll_top_button {
            if scroll_top_visible(y, self.config.scroll_top_threshold_px) {
                self.dom.add_class(button, SHOW_CLASS)?;
            } else {
                self.dom.remove_class(button, SHOW_CLASS)?;
            }
        }
        self.highlight_active_link(y)
    }

    fn highlight_active_link(&mut self, scroll_y: f64) -> Result<(), ChromeError> {
        let boxes: Vec<SectionBox> = self
            .els
            .sections
            .iter()
            .map(|s| SectionBox {
                id: self.dom.attribute(s, "id"),
                top: self.dom.offset_top(s),
                height: self.dom.client_height(s),
            })
            .collect();
        let current = current_section(
            &boxes,
            scroll_y,
            self.header_height(),
            self.config.section_activation_offset_px,
        )
        .map(|id| format!("#{}", id));
        for link in &self.els.nav_links {
            self.dom.remove_class(link, ACTIVE_CLASS)?;
            if current.is_some() && self.dom.attribute(link, "href") == current {
                self.dom.add_class(link, ACTIVE_CLASS)?;
            }
        }
        Ok(())
    }
}

fn setup_step(label: &str, result: Result<(), ChromeError>) {
    if let Err(e) = result {
        cwarn(&format!("{} setup failed: {}", label, e));
    }
}

fn event_label<N>(event: &ChromeEvent<N>) -> &'static str {
    match event {
        ChromeEvent::MenuToggle => "menu toggle",
        ChromeEvent::NavLinkDismiss => "nav link",
        ChromeEvent::AnchorNavigate { .. } => "anchor",
        ChromeEvent::OutsideClick { .. } => "outside click",
        ChromeEvent::KeyDown { .. } => "keydown",
        ChromeEvent::Resize => "resize",
        ChromeEvent::Scroll => "scroll",
        ChromeEvent::ScrollToTop => "scroll to top",
        ChromeEvent::PageLoad => "load",
        ChromeEvent::ScriptError { .. } => "error",
        ChromeEvent::Timer(_) => "timer",
        ChromeEvent::Intersection(_) => "intersection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::fake::{FakeDom, NodeId};
    use crate::state::menu::{GLYPH_CLOSED, GLYPH_OPEN};

    type Ctl = ViewStateController<FakeDom>;

    // navbar 80px tall; sections #world, #tech, #culture stacked at 600/1400/2200, 800px each
    fn blog_page() -> FakeDom {
        let mut dom = FakeDom::new();
        let body = dom.body_id();
        let nav = dom.add(body, "nav", &["navbar"]);
        dom.set_geometry(nav, 0.0, 80.0);
        let container = dom.add(nav, "div", &["nav-container"]);
        let menu = dom.add(container, "ul", &["nav-menu"]);
        for id in ["world", "tech", "culture"] {
            let li = dom.add(menu, "li", &[]);
            let a = dom.add(li, "a", &[]);
            dom.set_attr(a, "href", &format!("#{}", id));
        }
        let hero = dom.add(body, "header", &["hero"]);
        dom.add(hero, "div", &["hero-content"]);
        for (i, id) in ["world", "tech", "culture"].iter().enumerate() {
            let s = dom.add(body, "section", &["category-section"]);
            dom.set_id(s, id);
            dom.set_geometry(s, 600.0 + 800.0 * i as f64, 800.0);
            dom.add(s, "h2", &["section-title"]);
            dom.add(s, "article", &["article-card"]);
            dom.add(s, "article", &["article-card"]);
        }
        let footer = dom.add(body, "footer", &[]);
        let dead = dom.add(footer, "a", &["dead-link"]);
        dom.set_attr(dead, "href", "#missing");
        let bare = dom.add(footer, "a", &["bare-link"]);
        dom.set_attr(bare, "href", "#");
        dom
    }

    fn init(dom: FakeDom) -> Ctl {
        ViewStateController::init(dom, ChromeConfig::default())
    }

    fn node(ctl: &Ctl, selector: &str) -> NodeId {
        ctl.dom().query(selector).unwrap()
    }

    fn advance(ctl: &mut Ctl, ms: u64) {
        for token in ctl.dom_mut().advance(ms) {
            ctl.dispatch(ChromeEvent::Timer(token));
        }
    }

    fn assert_button_matches_menu(ctl: &Ctl) {
        let btn = ctl.elements().menu_button.unwrap();
        let state = ctl.menu_state();
        assert_eq!(ctl.dom().text(&btn).as_deref(), Some(state.glyph()));
        assert_eq!(
            ctl.dom().attribute(&btn, "aria-expanded").as_deref(),
            Some(state.aria_expanded())
        );
    }

    fn open_menu(ctl: &mut Ctl) {
        ctl.dispatch(ChromeEvent::MenuToggle);
        assert!(ctl.menu_state().open);
    }

    #[test]
    fn init_builds_chrome_once() {
        let ctl = init(blog_page());
        let dom = ctl.into_dom();
        let ctl = init(dom);
        let dom = ctl.dom();
        assert_eq!(dom.count(".mobile-menu-btn"), 1);
        assert_eq!(dom.count(".scroll-to-top"), 1);
        assert_eq!(dom.count("#blog-chrome-scroll-top-styles"), 1);
        assert_eq!(dom.count("#blog-chrome-loading-styles"), 1);

        let btn = node(&ctl, ".mobile-menu-btn");
        let container = node(&ctl, ".nav-container");
        assert!(dom.children(container).contains(&btn));
        assert_eq!(dom.attribute(&btn, "role").as_deref(), Some("button"));
        assert_eq!(dom.attribute(&btn, "tabindex").as_deref(), Some("0"));
        assert_eq!(dom.text(&btn).as_deref(), Some(GLYPH_CLOSED));

        let top = node(&ctl, ".scroll-to-top");
        assert_eq!(dom.tag(top), "button");
        assert!(dom.children(dom.body_id()).contains(&top));
        assert_eq!(dom.text(&top).as_deref(), Some("↑"));
    }

    #[test]
    fn subscriptions_are_registered() {
        let ctl = init(blog_page());
        let dom = ctl.dom();
        assert_eq!(dom.listener_count(Handler::MenuToggle), 1);
        assert_eq!(dom.listener_count(Handler::NavLinkDismiss), 3);
        assert_eq!(dom.listener_count(Handler::AnchorNavigate), 5);
        assert_eq!(dom.listener_count(Handler::OutsideClick), 1);
        assert_eq!(dom.listener_count(Handler::EscapeKey), 1);
        assert_eq!(dom.listener_count(Handler::Resize), 1);
        assert_eq!(dom.listener_count(Handler::Scroll), 1);
        assert_eq!(dom.listener_count(Handler::ScrollToTop), 1);
        assert_eq!(dom.listener_count(Handler::PageLoad), 1);
    }

    #[test]
    fn toggle_keeps_glyph_and_aria_in_sync() {
        let mut ctl = init(blog_page());
        assert_button_matches_menu(&ctl);
        for i in 0..7 {
            let outcome = ctl.dispatch(ChromeEvent::MenuToggle);
            assert!(outcome.stop_propagation);
            assert_eq!(ctl.menu_state().open, i % 2 == 0);
            assert_button_matches_menu(&ctl);
        }
        let btn = ctl.elements().menu_button.unwrap();
        assert_eq!(ctl.dom().text(&btn).as_deref(), Some(GLYPH_OPEN));
    }

    #[test]
    fn nav_link_click_always_closes() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        ctl.dispatch(ChromeEvent::NavLinkDismiss);
        assert!(!ctl.menu_state().open);
        assert_button_matches_menu(&ctl);
        ctl.dispatch(ChromeEvent::NavLinkDismiss);
        assert!(!ctl.menu_state().open);
    }

    #[test]
    fn outside_click_closes_only_from_outside() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        let inside = node(&ctl, ".nav-menu");
        ctl.dispatch(ChromeEvent::OutsideClick { target: Some(inside) });
        assert!(ctl.menu_state().open);

        let outside = node(&ctl, ".hero-content");
        ctl.dispatch(ChromeEvent::OutsideClick { target: Some(outside) });
        assert!(!ctl.menu_state().open);
        assert_button_matches_menu(&ctl);

        open_menu(&mut ctl);
        ctl.dispatch(ChromeEvent::OutsideClick { target: None });
        assert!(!ctl.menu_state().open);
    }

    #[test]
    fn escape_closes_other_keys_do_not() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        ctl.dispatch(ChromeEvent::KeyDown { key: "Enter".into() });
        assert!(ctl.menu_state().open);
        ctl.dispatch(ChromeEvent::KeyDown { key: "Escape".into() });
        assert!(!ctl.menu_state().open);
        assert_button_matches_menu(&ctl);
    }

    #[test]
    fn resize_to_desktop_closes_after_debounce() {
        let mut ctl = init(blog_page());
        ctl.dom_mut().inner_width = 1024.0;
        open_menu(&mut ctl);

        ctl.dispatch(ChromeEvent::Resize);
        advance(&mut ctl, 200);
        ctl.dispatch(ChromeEvent::Resize);
        advance(&mut ctl, 200);
        assert!(ctl.menu_state().open, "debounce restarted by second resize");
        advance(&mut ctl, 50);
        assert!(!ctl.menu_state().open);
        assert_button_matches_menu(&ctl);
        assert_eq!(ctl.dom().pending_timers(), 0);
    }

    #[test]
    fn resize_on_mobile_width_changes_nothing() {
        let mut ctl = init(blog_page());
        ctl.dom_mut().inner_width = 768.0;
        open_menu(&mut ctl);
        ctl.dispatch(ChromeEvent::Resize);
        advance(&mut ctl, 250);
        assert!(ctl.menu_state().open);

        ctl.dispatch(ChromeEvent::MenuToggle);
        ctl.dom_mut().inner_width = 500.0;
        ctl.dispatch(ChromeEvent::Resize);
        advance(&mut ctl, 250);
        assert!(!ctl.menu_state().open);
    }

    #[test]
    fn fragment_link_scrolls_below_header_and_closes_menu() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        let link = ctl.dom().query("a[href=\"#tech\"]").unwrap();
        let outcome = ctl.dispatch(ChromeEvent::AnchorNavigate { anchor: link });
        assert!(outcome.prevent_default);
        assert!(!ctl.menu_state().open);
        assert_eq!(
            ctl.dom().scroll_requests.last(),
            Some(&(1400.0 - 80.0))
        );
        assert_eq!(ctl.dom().fragment.as_deref(), Some("tech"));
    }

    #[test]
    fn missing_fragment_target_is_silent() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        for sel in [".dead-link", ".bare-link"] {
            let link = node(&ctl, sel);
            let outcome = ctl.dispatch(ChromeEvent::AnchorNavigate { anchor: link });
            assert!(outcome.prevent_default);
        }
        assert!(ctl.dom().scroll_requests.is_empty());
        assert_eq!(ctl.dom().fragment, None);
        assert!(ctl.menu_state().open);
    }

    #[test]
    fn reveal_targets_start_hidden_and_reveal_once() {
        let mut ctl = init(blog_page());
        let cards = ctl.dom().query_all(".article-card");
        let titles = ctl.dom().query_all(".section-title");
        assert_eq!(ctl.dom().observed.len(), cards.len() + titles.len());
        let opts = ctl.dom().observer_options.clone().unwrap();
        assert_eq!(opts.threshold, 0.1);
        assert_eq!(opts.root_margin, "0px 0px -50px 0px");

        let card = cards[0];
        assert_eq!(ctl.dom().style(card, "opacity"), Some("0"));
        assert_eq!(ctl.dom().style(card, "transform"), Some("translateY(20px)"));

        let entry = |is_intersecting| IntersectionEntry {
            target: card,
            is_intersecting,
        };
        ctl.dispatch(ChromeEvent::Intersection(vec![entry(false)]));
        assert_eq!(ctl.dom().style(card, "opacity"), Some("0"));

        ctl.dispatch(ChromeEvent::Intersection(vec![entry(true)]));
        assert_eq!(ctl.dom().style(card, "opacity"), Some("1"));
        assert_eq!(ctl.dom().style(card, "transform"), Some("translateY(0)"));
        assert_eq!(
            ctl.dom().style(card, "transition"),
            Some("opacity 0.6s ease, transform 0.6s ease")
        );
        assert!(!ctl.dom().observed.contains(&card));

        ctl.dispatch(ChromeEvent::Intersection(vec![entry(false), entry(true)]));
        assert_eq!(ctl.dom().style(card, "opacity"), Some("1"));
        assert_eq!(ctl.dom().style(cards[1], "opacity"), Some("0"));
    }

    #[test]
    fn scroll_top_visibility_threshold() {
        let mut ctl = init(blog_page());
        let btn = ctl.elements().scroll_top_button.unwrap();
        for (y, shown) in [(301.0, true), (300.0, false), (1200.0, true), (0.0, false)] {
            ctl.dom_mut().scroll_y = y;
            ctl.dispatch(ChromeEvent::Scroll);
            assert_eq!(ctl.dom().has_class(&btn, SHOW_CLASS), shown, "at {}", y);
        }
    }

    #[test]
    fn scroll_top_click_scrolls_smoothly_home() {
        let mut ctl = init(blog_page());
        ctl.dom_mut().scroll_y = 900.0;
        ctl.dispatch(ChromeEvent::ScrollToTop);
        assert_eq!(ctl.dom().scroll_requests, vec![0.0]);
    }

    #[test]
    fn exactly_one_link_active_inside_a_section() {
        let mut ctl = init(blog_page());
        let links = ctl.elements().nav_links.clone();
        let active = |ctl: &Ctl| -> Vec<String> {
            links
                .iter()
                .filter(|l| ctl.dom().has_class(l, ACTIVE_CLASS))
                .filter_map(|l| ctl.dom().attribute(l, "href"))
                .collect()
        };

        // #tech spans [1400 - 80 - 100, +800) = [1220, 2020)
        ctl.dom_mut().scroll_y = 1500.0;
        ctl.dispatch(ChromeEvent::Scroll);
        assert_eq!(active(&ctl), vec!["#tech".to_string()]);

        ctl.dom_mut().scroll_y = 2020.0;
        ctl.dispatch(ChromeEvent::Scroll);
        assert_eq!(active(&ctl), vec!["#culture".to_string()]);

        ctl.dom_mut().scroll_y = 100.0;
        ctl.dispatch(ChromeEvent::Scroll);
        assert!(active(&ctl).is_empty());
    }

    #[test]
    fn hero_fades_in_after_load_delay() {
        let mut ctl = init(blog_page());
        let hero = node(&ctl, ".hero-content");
        assert_eq!(ctl.dom().style(hero, "opacity"), Some("0"));

        ctl.dispatch(ChromeEvent::PageLoad);
        let body = ctl.dom().body_id();
        assert!(ctl.dom().has_class(&body, LOADED_CLASS));
        advance(&mut ctl, 299);
        assert_eq!(ctl.dom().style(hero, "opacity"), Some("0"));
        advance(&mut ctl, 1);
        assert_eq!(ctl.dom().style(hero, "opacity"), Some("1"));
        assert_eq!(ctl.dom().style(hero, "transform"), Some("translateY(0)"));
        assert_eq!(
            ctl.dom().style(hero, "transition"),
            Some("opacity 0.8s ease, transform 0.8s ease")
        );
    }

    #[test]
    fn bare_page_degrades_to_no_ops() {
        let mut ctl = init(FakeDom::new());
        assert!(ctl.elements().menu_button.is_none());
        assert_eq!(ctl.dom().listener_count(Handler::MenuToggle), 0);
        assert!(!ctl.dispatch(ChromeEvent::MenuToggle).prevent_default);
        ctl.dispatch(ChromeEvent::KeyDown { key: "Escape".into() });
        ctl.dispatch(ChromeEvent::PageLoad);
        advance(&mut ctl, 300);
        assert!(!ctl.menu_state().open);
        assert_eq!(ctl.dom().count(".scroll-to-top"), 1);
        assert!(ctl.dom().observed.is_empty());
    }

    #[test]
    fn config_overrides_reach_handlers() {
        let cfg = ChromeConfig::from_json(
            r#"{ "scroll_top_threshold_px": 500, "hero_reveal_delay_ms": 50 }"#,
        )
        .unwrap();
        let mut ctl = ViewStateController::init(blog_page(), cfg);
        let btn = ctl.elements().scroll_top_button.unwrap();
        ctl.dom_mut().scroll_y = 400.0;
        ctl.dispatch(ChromeEvent::Scroll);
        assert!(!ctl.dom().has_class(&btn, SHOW_CLASS));

        let hero = node(&ctl, ".hero-content");
        ctl.dispatch(ChromeEvent::PageLoad);
        advance(&mut ctl, 50);
        assert_eq!(ctl.dom().style(hero, "opacity"), Some("1"));
    }

    #[test]
    fn failed_observer_leaves_other_behaviors_working() {
        let mut dom = blog_page();
        dom.fail_observe = true;
        let mut ctl = init(dom);

        // reveal targets stay visible when nothing can reveal them
        let card = node(&ctl, ".article-card");
        assert_eq!(ctl.dom().style(card, "opacity"), None);
        assert!(ctl.dom().observed.is_empty());

        open_menu(&mut ctl);
        assert_button_matches_menu(&ctl);
        ctl.dispatch(ChromeEvent::KeyDown { key: "Escape".into() });
        assert!(!ctl.menu_state().open);

        let hero = node(&ctl, ".hero-content");
        assert_eq!(ctl.dom().style(hero, "opacity"), Some("0"));
        assert_eq!(ctl.dom().listener_count(Handler::Scroll), 1);
        assert_eq!(ctl.dom().listener_count(Handler::PageLoad), 1);
        assert_eq!(ctl.dom().count("#blog-chrome-loading-styles"), 1);

        let btn = ctl.elements().scroll_top_button.unwrap();
        ctl.dom_mut().scroll_y = 1500.0;
        ctl.dispatch(ChromeEvent::Scroll);
        assert!(ctl.dom().has_class(&btn, SHOW_CLASS));
    }

    #[test]
    fn script_error_is_reported_and_swallowed() {
        let mut ctl = init(blog_page());
        open_menu(&mut ctl);
        ctl.dom_mut().scroll_y = 1500.0;
        ctl.dispatch(ChromeEvent::Scroll);
        let before = ctl.dom().clone();

        let outcome = ctl.dispatch(ChromeEvent::ScriptError {
            message: "ReferenceError: ga is not defined".into(),
        });
        assert_eq!(outcome, EventOutcome::NONE);
        assert!(ctl.menu_state().open);
        assert_eq!(ctl.dom().scroll_requests, before.scroll_requests);
        assert_eq!(ctl.dom().pending_timers(), before.pending_timers());
        let links = ctl.elements().nav_links.clone();
        for l in &links {
            assert_eq!(
                ctl.dom().has_class(l, ACTIVE_CLASS),
                before.has_class(l, ACTIVE_CLASS)
            );
        }
    }

    #[test]
    fn error_handler_is_a_window_listener() {
        let mut dom = FakeDom::new();
        install_error_handler(&mut dom).unwrap();
        assert_eq!(
            dom.listeners,
            vec![(ListenTarget::Window, DomEventKind::Error, Handler::ScriptError)]
        );
    }
}
