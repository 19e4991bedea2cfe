//! BPMN live-preview toolkit.
//!
//! Turns a process design (steps plus conditional gateways) into a BPMN 2.0
//! document with diagram coordinates, and reads BPMN documents back into a
//! scene that can be painted as SVG.
//!
//! ```
//! use bpmn_preview::{generate_preview, render_svg, PreviewOptions, ProcessDesign, RenderOptions};
//!
//! let design = ProcessDesign::from_json(
//!     r#"{"name": "Onboarding", "steps": [{"label": "Start Review"}, {"label": "Approve"}]}"#,
//! )?;
//! let preview = generate_preview(&design, &PreviewOptions::default())?;
//! let svg = render_svg(&preview.xml, &RenderOptions::default())?;
//! assert!(svg.contains("Approve"));
//! # Ok::<(), bpmn_preview::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod preview;
pub mod render;
pub mod types;

pub use config::{ConditionWiring, LayoutOptions, PreviewOptions, RenderOptions};
pub use error::{DesignError, Error, MarkupError, RenderError, Result};
pub use model::{Condition, Gateway, GatewayType, ProcessDesign, Step, StepKind};
pub use preview::{generate_preview, Preview};
pub use render::{render_scene, render_svg, Scene};
pub use types::NonEmptyVec;
