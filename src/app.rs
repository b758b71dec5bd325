//! Document-ready bootstrap. Owns the single controller for the page view and
//! routes every browser event into it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;

use crate::config::ChromeConfig;
use crate::controller::{ViewStateController, install_error_handler, report_script_error};
use crate::dom::web::{EventSink, WebDom};
use crate::error::ChromeError;
use crate::model::{ChromeEvent, EventOutcome};
use crate::util::cwarn;

type Slot = Rc<RefCell<Option<ViewStateController<WebDom>>>>;

fn make_sink(slot: Slot) -> EventSink {
    Rc::new(move |event| {
        // errors can arrive before the controller exists, or while it is busy
        if let ChromeEvent::ScriptError { message } = &event {
            report_script_error(message);
            return EventOutcome::NONE;
        }
        match slot.try_borrow_mut() {
            Ok(mut guard) => match guard.as_mut() {
                Some(ctl) => ctl.dispatch(event),
                None => EventOutcome::NONE,
            },
            Err(_) => {
                cwarn("event arrived during another handler; dropped");
                EventOutcome::NONE
            }
        }
    })
}

fn boot(slot: &Slot, dom: WebDom) {
    let already_loaded = dom.is_complete();
    let config = ChromeConfig::load(&dom);
    let ctl = ViewStateController::init(dom, config);
    *slot.borrow_mut() = Some(ctl);
    // `load` already fired before we got here; run its handler ourselves
    if already_loaded {
        if let Some(ctl) = slot.borrow_mut().as_mut() {
            ctl.dispatch(ChromeEvent::PageLoad);
        }
    }
}

pub fn start() -> Result<(), ChromeError> {
    let slot: Slot = Rc::new(RefCell::new(None));
    let mut dom = WebDom::new(make_sink(slot.clone()))?;
    install_error_handler(&mut dom)?;

    if !dom.is_loading() {
        boot(&slot, dom);
        return Ok(());
    }
    let document = dom.document().clone();
    let ready = Closure::once_into_js(move || boot(&slot, dom));
    document.add_event_listener_with_callback("DOMContentLoaded", ready.unchecked_ref())?;
    Ok(())
}
