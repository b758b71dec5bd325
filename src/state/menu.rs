// Mobile menu open/closed state and the button presentation derived from it.

pub const GLYPH_CLOSED: &str = "☰";
pub const GLYPH_OPEN: &str = "✕";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    pub open: bool,
}

impl MenuState {
    pub fn toggled(self) -> Self {
        Self { open: !self.open }
    }

    pub fn glyph(self) -> &'static str {
        if self.open { GLYPH_OPEN } else { GLYPH_CLOSED }
    }

    pub fn aria_expanded(self) -> &'static str {
        if self.open { "true" } else { "false" }
    }
}
