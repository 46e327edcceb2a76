//! SVG builder — accumulates SVG elements and produces the final string.

use super::constants::*;

pub(super) struct SvgBuilder {
    elements: Vec<String>,
    view_box: (f64, f64, f64, f64),
}

impl SvgBuilder {
    pub(super) fn new(view_box: (f64, f64, f64, f64)) -> Self {
        Self {
            elements: Vec::new(),
            view_box,
        }
    }

    pub(super) fn build(self) -> String {
        let (x, y, w, h) = self.view_box;
        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {w} {h}" width="{w}" height="{h}">"#
        );
        svg.push('\n');
        for el in &self.elements {
            svg.push_str("  ");
            svg.push_str(el);
            svg.push('\n');
        }
        svg.push_str("</svg>\n");
        svg
    }

    pub(super) fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, color: &str, width: f64) {
        self.elements.push(format!(
            r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="{:.1}"/>"#,
            x1, y1, x2, y2, color, width
        ));
    }

    pub(super) fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        self.elements.push(format!(
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.1}" fill="{}"/>"#,
            cx, cy, r, NOTE_COLOR
        ));
    }

    pub(super) fn text(&mut self, x: f64, y: f64, content: &str, size: f64, anchor: &str) {
        let escaped = content
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;");
        self.elements.push(format!(
            r#"<text x="{:.1}" y="{:.1}" font-size="{:.0}" fill="{}" text-anchor="{}">{}</text>"#,
            x, y, size, NOTE_COLOR, anchor, escaped
        ));
    }

    pub(super) fn path(&mut self, d: &str, stroke_width: f64) {
        self.elements.push(format!(
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="{:.1}"/>"#,
            d, NOTE_COLOR, stroke_width
        ));
    }

    pub(super) fn notehead(&mut self, cx: f64, cy: f64, filled: bool) {
        let (fill, stroke) = if filled { (NOTE_COLOR, "none") } else { ("none", NOTE_COLOR) };
        self.elements.push(format!(
            r#"<ellipse cx="{:.1}" cy="{:.1}" rx="{:.1}" ry="{:.1}" fill="{}" stroke="{}" stroke-width="1.5" transform="rotate(-15,{:.1},{:.1})"/>"#,
            cx, cy, NOTEHEAD_RX, NOTEHEAD_RY, fill, stroke, cx, cy
        ));
    }

    pub(super) fn beam_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let half = BEAM_THICKNESS / 2.0;
        self.elements.push(format!(
            r#"<path d="M{:.1},{:.1} L{:.1},{:.1} L{:.1},{:.1} L{:.1},{:.1} Z" fill="{}"/>"#,
            x1,
            y1 - half,
            x2,
            y2 - half,
            x2,
            y2 + half,
            x1,
            y1 + half,
            NOTE_COLOR
        ));
    }
}
