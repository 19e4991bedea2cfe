use serde::Serialize;

/// BPMN 2.0 Definitions root element, as read back from a flow-markup document
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Definitions {
    pub id: Option<String>,
    pub target_namespace: Option<String>,
    pub processes: Vec<Process>,
    pub diagram: Diagram,
}

impl Definitions {
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.processes.iter().flat_map(|p| p.nodes.iter())
    }

    pub fn flows(&self) -> impl Iterator<Item = &SequenceFlow> {
        self.processes.iter().flat_map(|p| p.flows.iter())
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes().find(|n| n.id == id)
    }

    pub fn flow(&self, id: &str) -> Option<&SequenceFlow> {
        self.flows().find(|f| f.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Process {
    pub id: String,
    pub name: Option<String>,
    pub nodes: Vec<FlowNode>,
    pub flows: Vec<SequenceFlow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    StartEvent,
    EndEvent,
    Task,
    ExclusiveGateway,
    ParallelGateway,
    InclusiveGateway,
    Other(String),
}

impl NodeKind {
    /// Classify an element by its local (unprefixed) tag name.
    pub fn from_local_name(name: &str) -> Self {
        match name {
            "startEvent" => Self::StartEvent,
            "endEvent" => Self::EndEvent,
            "task" => Self::Task,
            "exclusiveGateway" => Self::ExclusiveGateway,
            "parallelGateway" => Self::ParallelGateway,
            "inclusiveGateway" => Self::InclusiveGateway,
            // userTask, serviceTask, scriptTask, ...
            other if other.ends_with("Task") => Self::Task,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Self::StartEvent | Self::EndEvent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowNode {
    pub id: String,
    pub kind: NodeKind,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceFlow {
    pub id: String,
    pub source_ref: String,
    pub target_ref: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right_center(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height / 2.0)
    }

    pub fn left_center(&self) -> Point {
        Point::new(self.x, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// BPMNDI section: geometry keyed by the `bpmnElement` it decorates.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Diagram {
    pub shapes: Vec<DiagramShape>,
    pub edges: Vec<DiagramEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramShape {
    pub element: String,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagramEdge {
    pub element: String,
    pub waypoints: Vec<Point>,
}
