// Style blocks injected at init. Each carries an id so a second init finds
// the first copy instead of appending another.

pub const SCROLL_TOP_STYLE_ID: &str = "blog-chrome-scroll-top-styles";
pub const LOADING_STYLE_ID: &str = "blog-chrome-loading-styles";

pub const SCROLL_TOP_CSS: &str = r#"
.scroll-to-top {
    position: fixed;
    bottom: 20px;
    right: 20px;
    background: #1a365d;
    color: white;
    border: none;
    border-radius: 50%;
    width: 50px;
    height: 50px;
    font-size: 1.5rem;
    cursor: pointer;
    opacity: 0;
    visibility: hidden;
    transition: all 0.3s ease;
    z-index: 1000;
    box-shadow: 0 3px 10px rgba(0,0,0,0.2);
}

.scroll-to-top.show {
    opacity: 1;
    visibility: visible;
}

.scroll-to-top:hover {
    background: #d4af37;
    transform: translateY(-2px);
}

@media (max-width: 768px) {
    .scroll-to-top {
        width: 45px;
        height: 45px;
        font-size: 1.3rem;
        bottom: 15px;
        right: 15px;
    }
}
"#;

/// Body scroll is locked until `loaded` lands; the hero transition duration is
/// filled in from config.
pub fn loading_css(hero_duration_s: f64) -> String {
    format!(
        r#"
body:not(.loaded) {{
    overflow: hidden;
}}

.hero-content {{
    transition: opacity {d}s ease, transform {d}s ease;
}}
"#,
        d = hero_duration_s
    )
}
