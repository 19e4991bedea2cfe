use std::collections::HashSet;

use bpmn_preview::preview::{Layout, NodeRef};
use bpmn_preview::render::parse_document;
use bpmn_preview::{
    generate_preview, render_scene, Condition, Gateway, GatewayType, LayoutOptions,
    NonEmptyVec, PreviewOptions, ProcessDesign, RenderOptions, Step,
};
use proptest::prelude::*;

fn gateway_type() -> impl Strategy<Value = GatewayType> {
    prop_oneof![
        Just(GatewayType::Exclusive),
        Just(GatewayType::Parallel),
        Just(GatewayType::Inclusive),
    ]
}

fn gateway(steps: usize) -> impl Strategy<Value = Gateway> {
    let condition = ("[a-z <>&\"]{0,8}", "[a-z=<> ]{0,12}", 0..steps)
        .prop_map(|(label, expression, target)| Condition::new(label, expression, target));
    (
        "[A-Za-z][A-Za-z ]{0,9}",
        gateway_type(),
        0..steps,
        prop::collection::vec(condition, 1..4),
    )
        .prop_map(|(label, kind, after, conditions)| {
            let conditions = NonEmptyVec::from_vec(conditions).expect("at least one condition");
            Gateway::new(label, kind, after, conditions)
        })
}

/// Designs whose indices are all in range.
fn design(max_gateways: usize) -> impl Strategy<Value = ProcessDesign> {
    (1usize..8).prop_flat_map(move |steps| {
        (
            "[A-Za-z][A-Za-z ]{0,12}",
            prop::collection::vec("[A-Za-z][A-Za-z &<>]{0,9}", steps),
            prop::collection::vec(gateway(steps), 0..=max_gateways),
        )
            .prop_map(|(name, labels, gateways)| {
                let steps: Vec<Step> = labels.into_iter().map(Step::normal).collect();
                let steps = NonEmptyVec::from_vec(steps).expect("at least one step");
                ProcessDesign::new(name, steps, gateways).expect("non-empty name")
            })
    })
}

proptest! {
    #[test]
    fn without_gateways_the_flow_is_one_chain(design in design(0)) {
        let preview = generate_preview(&design, &PreviewOptions::default()).unwrap();
        let n = design.step_count();
        let connections = preview.plan.connections();
        prop_assert_eq!(connections.len(), n + 1);

        let mut expected = vec![NodeRef::Start];
        expected.extend((0..n).map(NodeRef::Task));
        expected.push(NodeRef::End);
        for (c, pair) in connections.iter().zip(expected.windows(2)) {
            prop_assert_eq!(c.source, pair[0]);
            prop_assert_eq!(c.target, pair[1]);
        }
    }

    #[test]
    fn layout_depends_only_on_counts(steps in 1usize..50, gateways in 0usize..20) {
        let options = LayoutOptions::default();
        prop_assert_eq!(
            Layout::compute(steps, gateways, &options),
            Layout::compute(steps, gateways, &options)
        );
    }

    #[test]
    fn generated_documents_have_no_dangling_references(design in design(4)) {
        design.validate().unwrap();
        let preview = generate_preview(&design, &PreviewOptions::default()).unwrap();
        let defs = parse_document(&preview.xml).unwrap();

        let declared: HashSet<&str> = defs.nodes().map(|n| n.id.as_str()).collect();
        for flow in defs.flows() {
            prop_assert!(declared.contains(flow.source_ref.as_str()), "{}", flow.source_ref);
            prop_assert!(declared.contains(flow.target_ref.as_str()), "{}", flow.target_ref);
        }
        let flows: HashSet<&str> = defs.flows().map(|f| f.id.as_str()).collect();
        prop_assert_eq!(flows.len(), preview.plan.len());
        for shape in &defs.diagram.shapes {
            prop_assert!(declared.contains(shape.element.as_str()));
        }
        for edge in &defs.diagram.edges {
            prop_assert!(flows.contains(edge.element.as_str()));
        }
    }

    #[test]
    fn rendering_own_output_round_trips(design in design(4)) {
        let preview = generate_preview(&design, &PreviewOptions::default()).unwrap();
        let scene = render_scene(&preview.xml, &RenderOptions::default()).unwrap();

        prop_assert_eq!(scene.shapes.len(), design.step_count() + design.gateways().len() + 2);
        prop_assert_eq!(scene.paths.len(), preview.plan.len());
        let names: Vec<&str> = scene
            .shapes
            .iter()
            .filter(|s| s.id.starts_with("task_"))
            .map(|s| s.name.as_str())
            .collect();
        let labels: Vec<&str> = design.steps().iter().map(|s| s.label.as_str()).collect();
        prop_assert_eq!(names, labels);
    }

    #[test]
    fn regeneration_is_byte_identical(design in design(4)) {
        let options = PreviewOptions::default();
        let first = generate_preview(&design, &options).unwrap();
        let second = generate_preview(&design, &options).unwrap();
        prop_assert_eq!(first.xml, second.xml);
    }
}
