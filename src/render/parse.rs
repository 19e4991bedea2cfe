//! Streaming reader for BPMN documents, ours or anyone else's.
//!
//! Elements are matched by local name, so `bpmn:task`, `bpmn2:task` and a
//! default-namespace `task` all read the same.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::trace;

use crate::error::RenderError;
use crate::model::{
    Bounds, Definitions, DiagramEdge, DiagramShape, FlowNode, NodeKind, Point, Process,
    SequenceFlow,
};

const DEFAULT_EXTENT: f64 = 36.0;

pub fn parse_document(text: &str) -> Result<Definitions, RenderError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(RenderError::EmptyDocument);
    }
    if !text.starts_with('<') {
        return Err(RenderError::NotXml);
    }

    let mut reader = Reader::from_str(text);
    reader.trim_text(true);
    let mut state = ParseState::default();

    loop {
        let event = reader
            .read_event()
            .map_err(|source| RenderError::Syntax {
                position: reader.buffer_position(),
                source,
            })?;
        let position = reader.buffer_position();
        match event {
            Event::Start(e) => state.open(&e, false, position)?,
            Event::Empty(e) => state.open(&e, true, position)?,
            Event::End(_) => state.close(),
            Event::Eof => break,
            _ => {}
        }
    }

    if !state.root_seen {
        return Err(RenderError::MissingDefinitions {
            found: "nothing".to_string(),
        });
    }
    if !state.stack.is_empty() {
        return Err(RenderError::Truncated {
            open: state.stack.len(),
        });
    }
    trace!(
        nodes = state.definitions.nodes().count(),
        flows = state.definitions.flows().count(),
        shapes = state.definitions.diagram.shapes.len(),
        edges = state.definitions.diagram.edges.len(),
        "parsed BPMN document"
    );
    Ok(state.definitions)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Other,
    Process,
    Shape,
    Edge,
}

#[derive(Default)]
struct ParseState {
    definitions: Definitions,
    root_seen: bool,
    stack: Vec<Scope>,
    shape: Option<DiagramShape>,
    edge: Option<DiagramEdge>,
}

impl ParseState {
    fn open(
        &mut self,
        element: &BytesStart<'_>,
        empty: bool,
        position: usize,
    ) -> Result<(), RenderError> {
        let local = String::from_utf8_lossy(element.local_name().as_ref()).into_owned();
        let attrs = Attributes::read(element, position)?;

        if !self.root_seen {
            if local != "definitions" {
                return Err(RenderError::MissingDefinitions { found: local });
            }
            self.root_seen = true;
            self.definitions.id = attrs.get("id").map(str::to_string);
            self.definitions.target_namespace = attrs.get("targetNamespace").map(str::to_string);
            self.enter(Scope::Other, empty);
            return Ok(());
        }

        let parent = self.stack.last().copied();
        let scope = match local.as_str() {
            "process" => {
                self.definitions.processes.push(Process {
                    id: attrs.get("id").unwrap_or_default().to_string(),
                    name: attrs.get("name").map(str::to_string),
                    ..Process::default()
                });
                Scope::Process
            }
            "sequenceFlow" if parent == Some(Scope::Process) => {
                if let Some(process) = self.definitions.processes.last_mut() {
                    process.flows.push(SequenceFlow {
                        id: attrs.get("id").unwrap_or_default().to_string(),
                        source_ref: attrs.get("sourceRef").unwrap_or_default().to_string(),
                        target_ref: attrs.get("targetRef").unwrap_or_default().to_string(),
                        name: attrs.get("name").map(str::to_string),
                    });
                }
                Scope::Other
            }
            "BPMNShape" => {
                self.shape = Some(DiagramShape {
                    element: attrs.get("bpmnElement").unwrap_or_default().to_string(),
                    bounds: None,
                });
                Scope::Shape
            }
            "Bounds" if parent == Some(Scope::Shape) => {
                if let Some(shape) = self.shape.as_mut() {
                    shape.bounds = Some(Bounds::new(
                        attrs.number("x").unwrap_or(0.0),
                        attrs.number("y").unwrap_or(0.0),
                        attrs.extent("width"),
                        attrs.extent("height"),
                    ));
                }
                Scope::Other
            }
            "BPMNEdge" => {
                self.edge = Some(DiagramEdge {
                    element: attrs.get("bpmnElement").unwrap_or_default().to_string(),
                    waypoints: Vec::new(),
                });
                Scope::Edge
            }
            "waypoint" if parent == Some(Scope::Edge) => {
                if let Some(edge) = self.edge.as_mut() {
                    edge.waypoints.push(Point::new(
                        attrs.number("x").unwrap_or(0.0),
                        attrs.number("y").unwrap_or(0.0),
                    ));
                }
                Scope::Other
            }
            _ if parent == Some(Scope::Process) => {
                if let Some(id) = attrs.get("id") {
                    if let Some(process) = self.definitions.processes.last_mut() {
                        process.nodes.push(FlowNode {
                            id: id.to_string(),
                            kind: NodeKind::from_local_name(&local),
                            name: attrs.get("name").map(str::to_string),
                        });
                    }
                }
                Scope::Other
            }
            _ => Scope::Other,
        };

        self.enter(scope, empty);
        Ok(())
    }

    fn enter(&mut self, scope: Scope, empty: bool) {
        if empty {
            self.finish(scope);
        } else {
            self.stack.push(scope);
        }
    }

    fn close(&mut self) {
        if let Some(scope) = self.stack.pop() {
            self.finish(scope);
        }
    }

    fn finish(&mut self, scope: Scope) {
        match scope {
            Scope::Shape => {
                if let Some(shape) = self.shape.take() {
                    self.definitions.diagram.shapes.push(shape);
                }
            }
            Scope::Edge => {
                if let Some(edge) = self.edge.take() {
                    self.definitions.diagram.edges.push(edge);
                }
            }
            Scope::Process | Scope::Other => {}
        }
    }
}

/// Attributes of one element keyed by local name.
struct Attributes(Vec<(String, String)>);

impl Attributes {
    fn read(element: &BytesStart<'_>, position: usize) -> Result<Self, RenderError> {
        let mut values = Vec::new();
        for attr in element.attributes() {
            let attr = attr?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value: Cow<'_, str> = attr
                .unescape_value()
                .map_err(|source| RenderError::Syntax { position, source })?;
            values.push((key, value.into_owned()));
        }
        Ok(Self(values))
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn number(&self, key: &str) -> Option<f64> {
        self.get(key)?
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    /// Width/height: missing, unparsable or zero falls back to the event size.
    fn extent(&self, key: &str) -> f64 {
        self.number(key)
            .filter(|v| *v != 0.0)
            .unwrap_or(DEFAULT_EXTENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOREIGN: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn2:definitions xmlns:bpmn2="http://www.omg.org/spec/BPMN/20100524/MODEL"
                   xmlns:bpmndi="http://www.omg.org/spec/BPMN/20100524/DI"
                   xmlns:dc="http://www.omg.org/spec/DD/20100524/DC"
                   xmlns:di="http://www.omg.org/spec/DD/20100524/DI" id="defs">
  <bpmn2:process id="P1" name="Claims">
    <bpmn2:startEvent id="s"/>
    <bpmn2:userTask id="t" name="Check &amp; file"><bpmn2:documentation>x</bpmn2:documentation></bpmn2:userTask>
    <bpmn2:endEvent id="e" name="Done"/>
    <bpmn2:sequenceFlow id="f1" sourceRef="s" targetRef="t"/>
    <bpmn2:sequenceFlow id="f2" sourceRef="t" targetRef="e" name="ok"/>
  </bpmn2:process>
  <bpmndi:BPMNDiagram id="d">
    <bpmndi:BPMNPlane id="pl" bpmnElement="P1">
      <bpmndi:BPMNShape id="t_di" bpmnElement="t">
        <dc:Bounds x="200" y="abc" width="0"/>
      </bpmndi:BPMNShape>
      <bpmndi:BPMNEdge id="f1_di" bpmnElement="f1">
        <di:waypoint x="10" y="20"/>
        <di:waypoint x="30" y="40"/>
      </bpmndi:BPMNEdge>
    </bpmndi:BPMNPlane>
  </bpmndi:BPMNDiagram>
</bpmn2:definitions>"#;

    #[test]
    fn reads_foreign_prefixes() {
        let defs = parse_document(FOREIGN).unwrap();
        assert_eq!(defs.id.as_deref(), Some("defs"));
        let ids: Vec<&str> = defs.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["s", "t", "e"]);
        assert_eq!(defs.node("t").unwrap().kind, NodeKind::Task);
        assert_eq!(defs.node("t").unwrap().name.as_deref(), Some("Check & file"));
        assert_eq!(defs.flow("f2").unwrap().name.as_deref(), Some("ok"));
    }

    #[test]
    fn bad_bounds_fall_back_to_defaults() {
        let defs = parse_document(FOREIGN).unwrap();
        let shape = &defs.diagram.shapes[0];
        assert_eq!(shape.bounds, Some(Bounds::new(200.0, 0.0, 36.0, 36.0)));
        assert_eq!(defs.diagram.edges[0].waypoints.len(), 2);
    }

    #[test]
    fn rejects_empty_and_plain_text() {
        assert!(matches!(parse_document("   "), Err(RenderError::EmptyDocument)));
        assert!(matches!(
            parse_document("this is not a diagram"),
            Err(RenderError::NotXml)
        ));
    }

    #[test]
    fn rejects_foreign_root() {
        let err = parse_document("<svg><g/></svg>").unwrap_err();
        assert!(matches!(err, RenderError::MissingDefinitions { ref found } if found == "svg"));
    }

    #[test]
    fn rejects_mismatched_and_unclosed_elements() {
        assert!(matches!(
            parse_document("<definitions><process></definitions>"),
            Err(RenderError::Syntax { .. })
        ));
        assert!(matches!(
            parse_document("<definitions><process>"),
            Err(RenderError::Truncated { open: 2 })
        ));
    }
}
