use std::string::FromUtf8Error;

use quick_xml::events::attributes::AttrError;

/// Construction and submission checks on a process design.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DesignError {
    #[error("process name must not be empty")]
    EmptyName,
    #[error("process must contain at least one step")]
    NoSteps,
    #[error("step {index} has an empty label")]
    EmptyStepLabel { index: usize },
    #[error("gateway {gateway} has an empty label")]
    EmptyGatewayLabel { gateway: usize },
    #[error("gateway {gateway} must have at least one condition")]
    NoConditions { gateway: usize },
    #[error("gateway {gateway} is anchored after step {index}, but the process has {steps} steps")]
    AnchorOutOfRange {
        gateway: usize,
        index: usize,
        steps: usize,
    },
    #[error("step {index} does not exist, the process has {steps} steps")]
    StepOutOfRange { index: usize, steps: usize },
    #[error("cannot remove the only step of a process")]
    LastStep,
    #[error(
        "condition {condition} of gateway {gateway} targets step {index}, but the process has {steps} steps"
    )]
    TargetOutOfRange {
        gateway: usize,
        condition: usize,
        index: usize,
        steps: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
    #[error("failed to write flow markup: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("flow markup is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("no document provided")]
    EmptyDocument,
    #[error("content does not look like XML")]
    NotXml,
    #[error("malformed XML at byte {position}: {source}")]
    Syntax {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("invalid BPMN document: expected a `definitions` root element, found `{found}`")]
    MissingDefinitions { found: String },
    #[error("document ended with {open} unclosed element(s)")]
    Truncated { open: usize },
    #[error("failed to write SVG: {0}")]
    Svg(#[from] quick_xml::Error),
    #[error("SVG output is not valid UTF-8: {0}")]
    Encoding(#[from] FromUtf8Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("design JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
