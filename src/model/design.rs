use serde::Deserialize;

use crate::error::{DesignError, Result};
use crate::types::NonEmptyVec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    Initial,
    #[default]
    Normal,
    Final,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub label: String,
    pub kind: StepKind,
}

impl Step {
    pub fn new(label: impl Into<String>, kind: StepKind) -> Self {
        Self {
            label: label.into(),
            kind,
        }
    }

    pub fn normal(label: impl Into<String>) -> Self {
        Self::new(label, StepKind::Normal)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayType {
    #[default]
    Exclusive,
    Parallel,
    Inclusive,
}

impl GatewayType {
    /// Qualified BPMN element name for this gateway flavour.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Exclusive => "bpmn:exclusiveGateway",
            Self::Parallel => "bpmn:parallelGateway",
            Self::Inclusive => "bpmn:inclusiveGateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub label: String,
    /// Free-text rule, carried into the markup but never evaluated.
    pub expression: String,
    pub target_step_index: usize,
}

impl Condition {
    pub fn new(
        label: impl Into<String>,
        expression: impl Into<String>,
        target_step_index: usize,
    ) -> Self {
        Self {
            label: label.into(),
            expression: expression.into(),
            target_step_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gateway {
    pub label: String,
    pub gateway_type: GatewayType,
    /// The gateway sits in the main flow right after this step.
    pub after_step_index: usize,
    pub conditions: NonEmptyVec<Condition>,
}

impl Gateway {
    pub fn new(
        label: impl Into<String>,
        gateway_type: GatewayType,
        after_step_index: usize,
        conditions: NonEmptyVec<Condition>,
    ) -> Self {
        Self {
            label: label.into(),
            gateway_type,
            after_step_index,
            conditions,
        }
    }
}

/// Transient process design edited by the host UI.
///
/// Only the name is checked at construction; index ranges are a submission
/// concern, see [`ProcessDesign::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessDesign {
    name: String,
    steps: NonEmptyVec<Step>,
    gateways: Vec<Gateway>,
}

impl ProcessDesign {
    pub fn new(
        name: impl Into<String>,
        steps: NonEmptyVec<Step>,
        gateways: Vec<Gateway>,
    ) -> std::result::Result<Self, DesignError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DesignError::EmptyName);
        }
        Ok(Self {
            name,
            steps,
            gateways,
        })
    }

    /// Parse the JSON form the host submits.
    pub fn from_json(json: &str) -> Result<Self> {
        let document: DesignDocument = serde_json::from_str(json)?;
        Ok(Self::from_document(document)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &NonEmptyVec<Step> {
        &self.steps
    }

    pub fn gateways(&self) -> &[Gateway] {
        &self.gateways
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Identifier of the generated process element.
    pub fn process_id(&self) -> String {
        let mut id = String::from("Process_");
        let mut in_space = false;
        for ch in self.name.chars() {
            if ch.is_whitespace() {
                if !in_space {
                    id.push('_');
                }
                in_space = true;
            } else {
                id.push(ch);
                in_space = false;
            }
        }
        id
    }

    /// Submission check: labels present and every index in range.
    pub fn validate(&self) -> std::result::Result<(), DesignError> {
        if let Some(index) = self.steps.iter().position(|s| s.label.trim().is_empty()) {
            return Err(DesignError::EmptyStepLabel { index });
        }
        let steps = self.steps.len();
        for (gateway, g) in self.gateways.iter().enumerate() {
            if g.label.trim().is_empty() {
                return Err(DesignError::EmptyGatewayLabel { gateway });
            }
            if g.after_step_index >= steps {
                return Err(DesignError::AnchorOutOfRange {
                    gateway,
                    index: g.after_step_index,
                    steps,
                });
            }
            for (condition, c) in g.conditions.iter().enumerate() {
                if c.target_step_index >= steps {
                    return Err(DesignError::TargetOutOfRange {
                        gateway,
                        condition,
                        index: c.target_step_index,
                        steps,
                    });
                }
            }
        }
        Ok(())
    }

    /// Remove the step at `index` and shift gateway anchors and condition
    /// targets that pointed past it, so in-range indices stay in range.
    pub fn remove_step(&mut self, index: usize) -> std::result::Result<Step, DesignError> {
        let steps = self.steps.len();
        if index >= steps {
            return Err(DesignError::StepOutOfRange { index, steps });
        }
        let removed = self.steps.remove(index).ok_or(DesignError::LastStep)?;

        let shift = |i: &mut usize| {
            if *i > index {
                *i -= 1;
            }
        };
        for gateway in &mut self.gateways {
            shift(&mut gateway.after_step_index);
            for condition in gateway.conditions.iter_mut() {
                shift(&mut condition.target_step_index);
            }
        }
        Ok(removed)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignDocument {
    name: String,
    steps: Vec<StepDocument>,
    #[serde(default)]
    gateways: Vec<GatewayDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepDocument {
    label: String,
    #[serde(default)]
    kind: StepKind,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GatewayDocument {
    #[serde(default)]
    label: String,
    #[serde(default)]
    gateway_type: GatewayType,
    after_step_index: usize,
    conditions: Vec<ConditionDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConditionDocument {
    #[serde(default)]
    label: String,
    #[serde(default)]
    expression: String,
    target_step_index: usize,
}

impl ProcessDesign {
    fn from_document(document: DesignDocument) -> std::result::Result<Self, DesignError> {
        let steps: Vec<Step> = document
            .steps
            .into_iter()
            .map(|s| Step::new(s.label, s.kind))
            .collect();
        let steps = NonEmptyVec::from_vec(steps).ok_or(DesignError::NoSteps)?;

        let gateways = document
            .gateways
            .into_iter()
            .enumerate()
            .map(|(gateway, g)| {
                let conditions: Vec<Condition> = g
                    .conditions
                    .into_iter()
                    .map(|c| Condition::new(c.label, c.expression, c.target_step_index))
                    .collect();
                let conditions = NonEmptyVec::from_vec(conditions)
                    .ok_or(DesignError::NoConditions { gateway })?;
                Ok(Gateway::new(
                    g.label,
                    g.gateway_type,
                    g.after_step_index,
                    conditions,
                ))
            })
            .collect::<std::result::Result<Vec<_>, DesignError>>()?;

        Self::new(document.name, steps, gateways)
    }
}
