use serde::Deserialize;

/// Geometry constants for the single-lane preview layout.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Top-left corner of the start marker.
    pub origin_x: f64,
    pub origin_y: f64,
    /// Horizontal distance between consecutive element origins.
    pub spacing: f64,
    pub event_size: f64,
    pub task_width: f64,
    pub task_height: f64,
    pub gateway_size: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            origin_x: 150.0,
            origin_y: 100.0,
            spacing: 150.0,
            event_size: 36.0,
            task_width: 100.0,
            task_height: 80.0,
            gateway_size: 50.0,
        }
    }
}

/// How many conditions of each gateway get a sequence flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionWiring {
    /// Only the first two conditions are wired, as previews saved so far expect.
    #[default]
    FirstTwo,
    All,
}

impl ConditionWiring {
    pub fn limit(self) -> usize {
        match self {
            Self::FirstTwo => 2,
            Self::All => usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreviewOptions {
    pub layout: LayoutOptions,
    pub conditions: ConditionWiring,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// Margin added on every side of the shapes' bounding box.
    pub padding: f64,
    /// Synthetic layout used when a document carries no diagram shapes.
    pub fallback_origin_x: f64,
    pub fallback_y: f64,
    pub fallback_spacing: f64,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: 50.0,
            fallback_origin_x: 50.0,
            fallback_y: 100.0,
            fallback_spacing: 150.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options: PreviewOptions =
            serde_json::from_str(r#"{"layout":{"spacing":200},"conditions":"all"}"#).unwrap();
        assert_eq!(options.layout.spacing, 200.0);
        assert_eq!(options.layout.origin_x, 150.0);
        assert_eq!(options.conditions, ConditionWiring::All);
    }

    #[test]
    fn empty_render_options_are_default() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
    }
}
