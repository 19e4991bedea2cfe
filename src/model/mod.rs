pub mod definitions;
pub mod design;

pub use definitions::{
    Bounds, Definitions, Diagram, DiagramEdge, DiagramShape, FlowNode, NodeKind, Point, Process,
    SequenceFlow,
};
pub use design::{Condition, Gateway, GatewayType, ProcessDesign, Step, StepKind};
