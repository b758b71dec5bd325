// Owned handle for the resize debounce timer.

use crate::dom::Dom;
use crate::error::ChromeError;
use crate::model::{TimerHandle, TimerToken};

#[derive(Debug)]
pub struct Debouncer {
    token: TimerToken,
    delay_ms: u32,
    pending: Option<TimerHandle>,
}

impl Debouncer {
    pub fn new(token: TimerToken, delay_ms: u32) -> Self {
        Self {
            token,
            delay_ms,
            pending: None,
        }
    }

    /// Cancel whatever is pending and start the delay over.
    pub fn bump<D: Dom>(&mut self, dom: &mut D) -> Result<(), ChromeError> {
        if let Some(h) = self.pending.take() {
            dom.clear_timeout(h);
        }
        self.pending = Some(dom.set_timeout(self.delay_ms, self.token)?);
        Ok(())
    }

    /// Called when the timer fires; the handle is spent.
    pub fn settle(&mut self) {
        self.pending = None;
    }
}
