// Scroll-to-top button visibility.

/// Strictly greater: sitting exactly on the threshold keeps the button hidden.
pub fn scroll_top_visible(scroll_y: f64, threshold: f64) -> bool {
    scroll_y > threshold
}
