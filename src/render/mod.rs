pub mod parse;
pub mod scene;
pub mod svg;

use crate::config::RenderOptions;
use crate::error::RenderError;

pub use parse::parse_document;
pub use scene::{build_scene, Scene, SceneShape, ScenePath, ShapeStyle, Viewport};
pub use svg::to_svg;

/// Parse a BPMN document and turn it into a drawable scene.
///
/// Malformed input is reported as an error; no partial scene is produced.
pub fn render_scene(xml: &str, options: &RenderOptions) -> Result<Scene, RenderError> {
    let definitions = parse_document(xml)?;
    Ok(build_scene(&definitions, options))
}

/// One-call path from document text to SVG markup.
pub fn render_svg(xml: &str, options: &RenderOptions) -> Result<String, RenderError> {
    to_svg(&render_scene(xml, options)?)
}
