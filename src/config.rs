//! Presentation tuning values. Every field defaults to the value the blog
//! theme was designed around; a page may override any subset through a
//! `<script type="application/json" id="blog-chrome-config">` block.

use serde::Deserialize;

use crate::dom::Dom;
use crate::error::ChromeError;
use crate::util::cwarn;

pub const CONFIG_SCRIPT_SELECTOR: &str = "#blog-chrome-config";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChromeConfig {
    /// Scroll-to-top button shows once `scroll_y` exceeds this.
    pub scroll_top_threshold_px: f64,
    /// Widths above this count as desktop; an open mobile menu closes.
    pub desktop_breakpoint_px: f64,
    pub resize_debounce_ms: u32,
    pub hero_reveal_delay_ms: u32,
    /// Fraction of a target that must be visible before it is revealed.
    pub reveal_threshold: f64,
    /// Bottom root margin shrink, so targets reveal slightly early.
    pub reveal_root_margin_bottom_px: f64,
    /// Downward offset of hidden targets.
    pub reveal_offset_px: f64,
    pub reveal_duration_s: f64,
    pub hero_duration_s: f64,
    /// Extra lead above each section when picking the active nav link.
    pub section_activation_offset_px: f64,
    pub debug: bool,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            scroll_top_threshold_px: 300.0,
            desktop_breakpoint_px: 768.0,
            resize_debounce_ms: 250,
            hero_reveal_delay_ms: 300,
            reveal_threshold: 0.1,
            reveal_root_margin_bottom_px: 50.0,
            reveal_offset_px: 20.0,
            reveal_duration_s: 0.6,
            hero_duration_s: 0.8,
            section_activation_offset_px: 100.0,
            debug: false,
        }
    }
}

impl ChromeConfig {
    pub fn from_json(raw: &str) -> Result<Self, ChromeError> {
        let cfg: ChromeConfig = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ChromeError> {
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(ChromeError::InvalidConfig(format!(
                "reveal_threshold must be within [0, 1], got {}",
                self.reveal_threshold
            )));
        }
        for (name, v) in [
            ("reveal_duration_s", self.reveal_duration_s),
            ("hero_duration_s", self.hero_duration_s),
            ("reveal_offset_px", self.reveal_offset_px),
            (
                "reveal_root_margin_bottom_px",
                self.reveal_root_margin_bottom_px,
            ),
            ("scroll_top_threshold_px", self.scroll_top_threshold_px),
        ] {
            if v.is_nan() || v < 0.0 {
                return Err(ChromeError::InvalidConfig(format!(
                    "{} must be non-negative, got {}",
                    name, v
                )));
            }
        }
        Ok(())
    }

    /// Read the page's config block. Absent block means defaults; a broken one
    /// is reported and also falls back to defaults.
    pub fn load<D: Dom>(dom: &D) -> Self {
        let Some(node) = dom.query(CONFIG_SCRIPT_SELECTOR) else {
            return Self::default();
        };
        let raw = dom.text(&node).unwrap_or_default();
        if raw.trim().is_empty() {
            return Self::default();
        }
        match Self::from_json(&raw) {
            Ok(cfg) => cfg,
            Err(e) => {
                cwarn(&format!("ignoring page config: {}", e));
                Self::default()
            }
        }
    }

    /// `rootMargin` string handed to the intersection observer.
    pub fn reveal_root_margin(&self) -> String {
        format!("0px 0px -{}px 0px", self.reveal_root_margin_bottom_px)
    }

    pub fn hidden_transform(&self) -> String {
        format!("translateY({}px)", self.reveal_offset_px)
    }

    pub fn reveal_transition(&self) -> String {
        format!(
            "opacity {d}s ease, transform {d}s ease",
            d = self.reveal_duration_s
        )
    }

    pub fn hero_transition(&self) -> String {
        format!(
            "opacity {d}s ease, transform {d}s ease",
            d = self.hero_duration_s
        )
    }
}
