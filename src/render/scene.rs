use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::RenderOptions;
use crate::model::{Bounds, Definitions, FlowNode, NodeKind, Point, SequenceFlow};

/// How a shape is painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeStyle {
    StartCircle,
    /// Same circle with a heavier stroke.
    EndCircle,
    RoundedRect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneShape {
    pub id: String,
    pub kind: NodeKind,
    pub name: String,
    pub bounds: Bounds,
}

impl SceneShape {
    fn from_node(node: &FlowNode, bounds: Bounds) -> Self {
        Self {
            id: node.id.clone(),
            kind: node.kind.clone(),
            name: node.name.clone().unwrap_or_else(|| node.id.clone()),
            bounds,
        }
    }

    pub fn style(&self) -> ShapeStyle {
        match self.kind {
            NodeKind::StartEvent => ShapeStyle::StartCircle,
            NodeKind::EndEvent => ShapeStyle::EndCircle,
            _ => ShapeStyle::RoundedRect,
        }
    }
}

/// A connection drawn as a polyline ending in an arrowhead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePath {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub points: Vec<Point>,
}

impl ScenePath {
    /// Anchor for the label: middle of the central segment.
    pub fn label_anchor(&self) -> Option<Point> {
        if self.points.len() < 2 {
            return None;
        }
        let hi = self.points.len() / 2;
        let (a, b) = (self.points[hi - 1], self.points[hi]);
        Some(Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scene {
    pub shapes: Vec<SceneShape>,
    pub paths: Vec<ScenePath>,
    /// `None` when there is nothing to display.
    pub viewport: Option<Viewport>,
}

impl Scene {
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

pub fn build_scene(definitions: &Definitions, options: &RenderOptions) -> Scene {
    let nodes: HashMap<&str, &FlowNode> = definitions.nodes().map(|n| (n.id.as_str(), n)).collect();

    let mut shapes: Vec<SceneShape> = definitions
        .diagram
        .shapes
        .iter()
        .filter_map(|shape| {
            let bounds = shape.bounds?;
            let node = nodes.get(shape.element.as_str())?;
            Some(SceneShape::from_node(node, bounds))
        })
        .collect();

    if shapes.is_empty() {
        shapes = fallback_shapes(definitions, options);
        debug!(
            shapes = shapes.len(),
            "no diagram shapes, using synthetic layout"
        );
    }

    let mut paths = diagram_paths(definitions);
    if paths.is_empty() {
        paths = straight_paths(definitions, &shapes);
        debug!(paths = paths.len(), "no diagram edges, using straight connectors");
    }

    let viewport = viewport(&shapes, options.padding);
    Scene {
        shapes,
        paths,
        viewport,
    }
}

fn fallback_shapes(definitions: &Definitions, options: &RenderOptions) -> Vec<SceneShape> {
    definitions
        .nodes()
        .filter(|n| matches!(n.kind, NodeKind::StartEvent | NodeKind::EndEvent | NodeKind::Task))
        .enumerate()
        .map(|(i, node)| {
            let (width, height) = if node.kind.is_event() {
                (36.0, 36.0)
            } else {
                (100.0, 80.0)
            };
            let x = options.fallback_origin_x + i as f64 * options.fallback_spacing;
            SceneShape::from_node(node, Bounds::new(x, options.fallback_y, width, height))
        })
        .collect()
}

fn diagram_paths(definitions: &Definitions) -> Vec<ScenePath> {
    let flows: HashMap<&str, &SequenceFlow> =
        definitions.flows().map(|f| (f.id.as_str(), f)).collect();
    definitions
        .diagram
        .edges
        .iter()
        .filter_map(|edge| {
            if edge.waypoints.len() < 2 {
                warn!(element = %edge.element, "ignoring diagram edge with fewer than two waypoints");
                return None;
            }
            let flow = flows.get(edge.element.as_str())?;
            Some(ScenePath {
                id: flow.id.clone(),
                source: flow.source_ref.clone(),
                target: flow.target_ref.clone(),
                label: flow.name.clone(),
                points: edge.waypoints.clone(),
            })
        })
        .collect()
}

fn straight_paths(definitions: &Definitions, shapes: &[SceneShape]) -> Vec<ScenePath> {
    let by_id: HashMap<&str, &SceneShape> = shapes.iter().map(|s| (s.id.as_str(), s)).collect();
    definitions
        .flows()
        .filter_map(|flow| {
            let source = by_id.get(flow.source_ref.as_str())?;
            let target = by_id.get(flow.target_ref.as_str())?;
            Some(ScenePath {
                id: flow.id.clone(),
                source: flow.source_ref.clone(),
                target: flow.target_ref.clone(),
                label: flow.name.clone(),
                points: vec![source.bounds.right_center(), target.bounds.left_center()],
            })
        })
        .collect()
}

fn viewport(shapes: &[SceneShape], padding: f64) -> Option<Viewport> {
    let first = shapes.first()?.bounds;
    let (mut min_x, mut min_y) = (first.x, first.y);
    let (mut max_x, mut max_y) = (first.right(), first.bottom());
    for b in shapes.iter().map(|s| s.bounds) {
        min_x = min_x.min(b.x);
        min_y = min_y.min(b.y);
        max_x = max_x.max(b.right());
        max_y = max_y.max(b.bottom());
    }
    Some(Viewport {
        x: min_x - padding,
        y: min_y - padding,
        width: max_x - min_x + 2.0 * padding,
        height: max_y - min_y + 2.0 * padding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::parse::parse_document;

    const NO_DIAGRAM: &str = r#"<definitions>
  <process id="p">
    <startEvent id="s" name="Go"/>
    <task id="a"/>
    <exclusiveGateway id="g"/>
    <task id="b" name="B"/>
    <endEvent id="e"/>
    <sequenceFlow id="f1" sourceRef="s" targetRef="a"/>
    <sequenceFlow id="f2" sourceRef="a" targetRef="g"/>
    <sequenceFlow id="f3" sourceRef="b" targetRef="e"/>
  </process>
  <BPMNDiagram id="d"><BPMNPlane id="pl" bpmnElement="p"/></BPMNDiagram>
</definitions>"#;

    #[test]
    fn fallback_layout_covers_start_end_and_tasks() {
        let scene = build_scene(&parse_document(NO_DIAGRAM).unwrap(), &RenderOptions::default());
        let ids: Vec<&str> = scene.shapes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s", "a", "b", "e"]);
        let xs: Vec<f64> = scene.shapes.iter().map(|s| s.bounds.x).collect();
        assert_eq!(xs, vec![50.0, 200.0, 350.0, 500.0]);
        assert_eq!(scene.shapes[1].name, "a");
        assert_eq!(scene.shapes[1].bounds.width, 100.0);
        assert_eq!(scene.shapes[3].style(), ShapeStyle::EndCircle);
    }

    #[test]
    fn fallback_connectors_skip_unplaced_endpoints() {
        let scene = build_scene(&parse_document(NO_DIAGRAM).unwrap(), &RenderOptions::default());
        let ids: Vec<&str> = scene.paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["f1", "f3"]);
        assert_eq!(
            scene.paths[0].points,
            vec![Point::new(86.0, 118.0), Point::new(200.0, 140.0)]
        );
    }

    #[test]
    fn diagram_edges_resolve_declared_flows_only() {
        let xml = r#"<definitions>
  <process id="p">
    <startEvent id="s"/>
    <endEvent id="e"/>
    <sequenceFlow id="f1" sourceRef="s" targetRef="e" name="go"/>
    <sequenceFlow id="f2" sourceRef="e" targetRef="s"/>
  </process>
  <BPMNDiagram id="d">
    <BPMNPlane id="pl" bpmnElement="p">
      <BPMNShape id="s_di" bpmnElement="s"><Bounds x="0" y="0" width="36" height="36"/></BPMNShape>
      <BPMNShape id="e_di" bpmnElement="e"><Bounds x="100" y="0" width="36" height="36"/></BPMNShape>
      <BPMNEdge id="ghost_di" bpmnElement="ghost"><waypoint x="0" y="0"/><waypoint x="1" y="1"/></BPMNEdge>
      <BPMNEdge id="f2_di" bpmnElement="f2"><waypoint x="100" y="18"/><waypoint x="36" y="18"/></BPMNEdge>
      <BPMNEdge id="f1_di" bpmnElement="f1"><waypoint x="36" y="18"/><waypoint x="100" y="18"/></BPMNEdge>
    </BPMNPlane>
  </BPMNDiagram>
</definitions>"#;
        let scene = build_scene(&parse_document(xml).unwrap(), &RenderOptions::default());
        let ids: Vec<&str> = scene.paths.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["f2", "f1"]);
        assert_eq!(scene.paths[1].label.as_deref(), Some("go"));
        assert_eq!(scene.paths[0].source, "e");
    }

    #[test]
    fn viewport_is_padded() {
        let scene = build_scene(&parse_document(NO_DIAGRAM).unwrap(), &RenderOptions::default());
        let vp = scene.viewport.unwrap();
        assert_eq!((vp.x, vp.y), (0.0, 50.0));
        assert_eq!((vp.width, vp.height), (536.0 + 50.0, 180.0));
    }

    #[test]
    fn empty_process_yields_empty_scene() {
        let defs = parse_document("<definitions><process id=\"p\"/></definitions>").unwrap();
        let scene = build_scene(&defs, &RenderOptions::default());
        assert!(scene.is_empty());
        assert!(scene.viewport.is_none());
    }

    #[test]
    fn label_anchor_is_mid_segment() {
        let path = ScenePath {
            id: "f".into(),
            source: "a".into(),
            target: "b".into(),
            label: Some("yes".into()),
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
        };
        assert_eq!(path.label_anchor(), Some(Point::new(5.0, 10.0)));
    }
}
