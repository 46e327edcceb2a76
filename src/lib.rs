//! scoregrid — MusicXML score model, pagination and notation rendering.
//!
//! Parses partwise MusicXML into a model where measures share their
//! inherited attributes, pages the measures onto fixed-width lines and
//! drives any [`renderer::Notation`] backend from the result.
//!
//! # Example
//! ```no_run
//! use scoregrid::{parse_musicxml, LayoutConfig};
//! use scoregrid::renderer::{render_score, Recorder};
//!
//! let xml = std::fs::read_to_string("path/to/score.musicxml").unwrap();
//! let score = parse_musicxml(&xml).unwrap();
//! println!("Title: {:?}", score.title);
//! println!("Measures: {}", score.measure_count());
//!
//! let mut ndl = Recorder::new();
//! let layout = render_score(&score, &LayoutConfig::with_page_width(800.0), &mut ndl);
//! println!("{} line(s), {} call(s)", layout.lines_per_page, ndl.calls().len());
//! ```

pub mod beams;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod xml;

pub use error::{Result, ScoreError, Warning};
pub use layout::{Layout, LayoutConfig};
pub use model::*;
pub use parser::{parse_bytes, parse_musicxml};

use renderer::{render_score, SvgNotation};

/// Convert a parsed score to a JSON string.
pub fn score_to_json(score: &MusicXml) -> serde_json::Result<String> {
    serde_json::to_string_pretty(score)
}

/// Parse MusicXML text and render it to an SVG document.
/// Convenience function combining parsing, layout and rendering.
pub fn render_musicxml_to_svg(xml: &str, config: &LayoutConfig) -> Result<String> {
    let score = parse_musicxml(xml)?;
    Ok(render_score_to_svg(&score, config))
}

/// Render a parsed score to an SVG document.
pub fn render_score_to_svg(score: &MusicXml, config: &LayoutConfig) -> String {
    let mut ndl = SvgNotation::new();
    render_score(score, config, &mut ndl);
    ndl.into_svg().unwrap_or_default()
}
