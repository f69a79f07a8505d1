//! Built-in placeholder header image.
//!
//! Shown when there is neither a local preview nor a committed image,
//! so the displayed URL is never empty. The image is a flat banner with
//! a camera glyph, built with the [`svg`] crate and served as a data URI.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use svg::Document;
use svg::node::element::{Circle, Rectangle};

/// Banner aspect ratio matches a typical page header (3:1).
const WIDTH: u32 = 1200;
const HEIGHT: u32 = 400;

const BACKGROUND: &str = "#e0e0e0";
const GLYPH: &str = "#9e9e9e";

static PLACEHOLDER_URI: LazyLock<String> = LazyLock::new(|| {
    format!(
        "data:image/svg+xml;base64,{}",
        STANDARD.encode(placeholder_svg())
    )
});

/// The placeholder as an SVG document string.
#[must_use]
pub fn placeholder_svg() -> String {
    let cx = f64::from(WIDTH) / 2.0;
    let cy = f64::from(HEIGHT) / 2.0;

    let background = Rectangle::new()
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .set("fill", BACKGROUND);

    // Camera body, lens ring, and lens.
    let body = Rectangle::new()
        .set("x", cx - 90.0)
        .set("y", cy - 55.0)
        .set("width", 180)
        .set("height", 120)
        .set("rx", 16)
        .set("fill", GLYPH);
    let viewfinder = Rectangle::new()
        .set("x", cx - 35.0)
        .set("y", cy - 75.0)
        .set("width", 70)
        .set("height", 30)
        .set("rx", 6)
        .set("fill", GLYPH);
    let ring = Circle::new()
        .set("cx", cx)
        .set("cy", cy + 5.0)
        .set("r", 40)
        .set("fill", BACKGROUND);
    let lens = Circle::new()
        .set("cx", cx)
        .set("cy", cy + 5.0)
        .set("r", 26)
        .set("fill", GLYPH);

    Document::new()
        .set("viewBox", (0, 0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .add(background)
        .add(body)
        .add(viewfinder)
        .add(ring)
        .add(lens)
        .to_string()
}

/// The placeholder as a `data:` URI, built once.
#[must_use]
pub fn default_placeholder() -> &'static str {
    &PLACEHOLDER_URI
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_has_banner_dimensions() {
        let svg = placeholder_svg();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("viewBox=\"0 0 1200 400\""));
        assert!(svg.contains("<circle"));
    }

    #[test]
    fn data_uri_is_stable() {
        let first = default_placeholder();
        let second = default_placeholder();
        assert!(first.starts_with("data:image/svg+xml;base64,"));
        assert!(std::ptr::eq(first, second));
    }
}
