use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::MarkupError;
use crate::model::{Bounds, ProcessDesign};

use super::connections::{ConnectionPlan, NodeRef};
use super::layout::Layout;

pub const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
pub const BPMN_DI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
pub const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
pub const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
pub const TARGET_NS: &str = "http://bpmn.io/schema/bpmn";

type XmlWriter = Writer<Vec<u8>>;

/// Serialize a design, its connections and its layout into one BPMN document.
///
/// Pure string assembly: connections are written in plan order so flow ids
/// are reproducible.
pub fn assemble(
    design: &ProcessDesign,
    plan: &ConnectionPlan,
    layout: &Layout,
) -> Result<String, MarkupError> {
    let mut w = Writer::new_with_indent(Vec::new(), b' ', 2);
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let root = BytesStart::new("bpmn:definitions").with_attributes([
        ("xmlns:bpmn", BPMN_MODEL_NS),
        ("xmlns:bpmndi", BPMN_DI_NS),
        ("xmlns:dc", DC_NS),
        ("xmlns:di", DI_NS),
        ("xmlns:xsi", XSI_NS),
        ("id", "Definitions_1"),
        ("targetNamespace", TARGET_NS),
    ]);
    w.write_event(Event::Start(root))?;

    let process_id = design.process_id();
    write_process(&mut w, design, &process_id, plan)?;
    write_diagram(&mut w, &process_id, plan, layout)?;

    w.write_event(Event::End(BytesEnd::new("bpmn:definitions")))?;
    Ok(String::from_utf8(w.into_inner())?)
}

fn write_process(
    w: &mut XmlWriter,
    design: &ProcessDesign,
    process_id: &str,
    plan: &ConnectionPlan,
) -> Result<(), MarkupError> {
    let process = BytesStart::new("bpmn:process").with_attributes([
        ("id", process_id),
        ("name", design.name()),
        ("isExecutable", "false"),
    ]);
    w.write_event(Event::Start(process))?;

    empty(w, "bpmn:startEvent", &[("id", "start"), ("name", "Start")])?;
    for (i, step) in design.steps().iter().enumerate() {
        let id = NodeRef::Task(i).to_string();
        empty(w, "bpmn:task", &[("id", id.as_str()), ("name", step.label.as_str())])?;
    }
    for (i, gateway) in design.gateways().iter().enumerate() {
        let id = NodeRef::Gateway(i).to_string();
        empty(
            w,
            gateway.gateway_type.tag(),
            &[
                ("id", id.as_str()),
                ("name", gateway.label.as_str()),
                ("gatewayDirection", "Diverging"),
            ],
        )?;
    }
    empty(w, "bpmn:endEvent", &[("id", "end"), ("name", "End")])?;

    for (id, connection) in plan.iter_with_ids() {
        let source = connection.source.to_string();
        let target = connection.target.to_string();
        let mut flow = BytesStart::new("bpmn:sequenceFlow").with_attributes([
            ("id", id.as_str()),
            ("sourceRef", source.as_str()),
            ("targetRef", target.as_str()),
        ]);
        if let Some(label) = &connection.label {
            flow.push_attribute(("name", label.as_str()));
        }

        match &connection.expression {
            Some(expression) => {
                w.write_event(Event::Start(flow))?;
                let condition = BytesStart::new("bpmn:conditionExpression")
                    .with_attributes([("xsi:type", "bpmn:tFormalExpression")]);
                w.write_event(Event::Start(condition))?;
                w.write_event(Event::Text(BytesText::new(expression)))?;
                w.write_event(Event::End(BytesEnd::new("bpmn:conditionExpression")))?;
                w.write_event(Event::End(BytesEnd::new("bpmn:sequenceFlow")))?;
            }
            None => w.write_event(Event::Empty(flow))?,
        }
    }

    w.write_event(Event::End(BytesEnd::new("bpmn:process")))?;
    Ok(())
}

fn write_diagram(
    w: &mut XmlWriter,
    process_id: &str,
    plan: &ConnectionPlan,
    layout: &Layout,
) -> Result<(), MarkupError> {
    w.write_event(Event::Start(
        BytesStart::new("bpmndi:BPMNDiagram").with_attributes([("id", "BPMNDiagram_1")]),
    ))?;
    w.write_event(Event::Start(
        BytesStart::new("bpmndi:BPMNPlane")
            .with_attributes([("id", "BPMNPlane_1"), ("bpmnElement", process_id)]),
    ))?;

    let nodes = std::iter::once((NodeRef::Start, layout.start))
        .chain(layout.steps.iter().enumerate().map(|(i, b)| (NodeRef::Task(i), *b)))
        .chain(
            layout
                .gateways
                .iter()
                .enumerate()
                .map(|(i, b)| (NodeRef::Gateway(i), *b)),
        )
        .chain(std::iter::once((NodeRef::End, layout.end)));
    for (node, bounds) in nodes {
        write_shape(w, &node.to_string(), bounds)?;
    }

    for (id, connection) in plan.iter_with_ids() {
        let shape_id = format!("{id}_di");
        w.write_event(Event::Start(
            BytesStart::new("bpmndi:BPMNEdge")
                .with_attributes([("id", shape_id.as_str()), ("bpmnElement", id.as_str())]),
        ))?;
        // Dangling references (only possible with out-of-range input) get no geometry.
        if let Some(points) = layout.waypoints(connection.source, connection.target) {
            for p in points {
                let (x, y) = (fmt_num(p.x), fmt_num(p.y));
                empty(w, "di:waypoint", &[("x", x.as_str()), ("y", y.as_str())])?;
            }
        }
        w.write_event(Event::End(BytesEnd::new("bpmndi:BPMNEdge")))?;
    }

    w.write_event(Event::End(BytesEnd::new("bpmndi:BPMNPlane")))?;
    w.write_event(Event::End(BytesEnd::new("bpmndi:BPMNDiagram")))?;
    Ok(())
}

fn write_shape(w: &mut XmlWriter, element: &str, bounds: Bounds) -> Result<(), MarkupError> {
    let shape_id = format!("{element}_di");
    w.write_event(Event::Start(
        BytesStart::new("bpmndi:BPMNShape")
            .with_attributes([("id", shape_id.as_str()), ("bpmnElement", element)]),
    ))?;
    let (x, y) = (fmt_num(bounds.x), fmt_num(bounds.y));
    let (width, height) = (fmt_num(bounds.width), fmt_num(bounds.height));
    empty(
        w,
        "dc:Bounds",
        &[
            ("x", x.as_str()),
            ("y", y.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
        ],
    )?;
    w.write_event(Event::End(BytesEnd::new("bpmndi:BPMNShape")))?;
    Ok(())
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), MarkupError> {
    let element = BytesStart::new(name).with_attributes(attrs.iter().copied());
    w.write_event(Event::Empty(element))?;
    Ok(())
}

/// Shortest decimal form; integral values print without a fraction.
pub(crate) fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if nearest == 0.0 && v.abs() < 1e-6 {
        "0".to_string()
    } else if (v - nearest).abs() < 1e-6 {
        format!("{nearest}")
    } else {
        format!("{v}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConditionWiring, LayoutOptions};
    use crate::model::{Condition, Gateway, GatewayType, Step};
    use crate::preview::connections::resolve;
    use crate::types::NonEmptyVec;

    fn render(design: &ProcessDesign) -> String {
        let plan = resolve(design, ConditionWiring::default());
        let layout = Layout::compute(
            design.step_count(),
            design.gateways().len(),
            &LayoutOptions::default(),
        );
        assemble(design, &plan, &layout).unwrap()
    }

    #[test]
    fn linear_document_declares_every_element() {
        let steps =
            NonEmptyVec::from_vec(vec![Step::normal("Start Review"), Step::normal("Approve")])
                .unwrap();
        let design = ProcessDesign::new("Onboarding", steps, Vec::new()).unwrap();
        let xml = render(&design);

        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(xml.contains(r#"<bpmn:process id="Process_Onboarding" name="Onboarding" isExecutable="false">"#));
        assert!(xml.contains(r#"<bpmn:task id="task_0" name="Start Review"/>"#));
        assert!(xml.contains(
            r#"<bpmn:sequenceFlow id="flow_start" sourceRef="start" targetRef="task_0"/>"#
        ));
        assert!(xml.contains(
            r#"<bpmn:sequenceFlow id="flow_0" sourceRef="task_0" targetRef="task_1"/>"#
        ));
        assert!(xml.contains(
            r#"<bpmn:sequenceFlow id="flow_end" sourceRef="task_1" targetRef="end"/>"#
        ));
        assert!(xml.contains(r#"<dc:Bounds x="150" y="100" width="36" height="36"/>"#));
        assert!(xml.contains(r#"<bpmndi:BPMNEdge id="flow_0_di" bpmnElement="flow_0">"#));
        assert!(xml.trim_end().ends_with("</bpmn:definitions>"));
    }

    #[test]
    fn labels_are_escaped_and_expressions_kept() {
        let steps = NonEmptyVec::from_vec(vec![Step::normal("A & B"), Step::normal("C")]).unwrap();
        let gateway = Gateway::new(
            "Amount <check>",
            GatewayType::Inclusive,
            0,
            NonEmptyVec::new(Condition::new("\"big\"", "amount > 100", 1)),
        );
        let design = ProcessDesign::new("Escapes", steps, vec![gateway]).unwrap();
        let xml = render(&design);

        assert!(xml.contains(r#"name="A &amp; B""#));
        assert!(xml.contains(r#"<bpmn:inclusiveGateway id="gateway_0" name="Amount &lt;check&gt;" gatewayDirection="Diverging"/>"#));
        assert!(xml.contains(r#"name="&quot;big&quot;""#));
        assert!(xml.contains(
            r#"<bpmn:conditionExpression xsi:type="bpmn:tFormalExpression">amount &gt; 100</bpmn:conditionExpression>"#
        ));
    }

    #[test]
    fn numbers_print_without_noise() {
        assert_eq!(fmt_num(150.0), "150");
        assert_eq!(fmt_num(-0.0), "0");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(f64::NAN), "0");
    }
}
