//! Single-lane placement for preview documents.
//!
//! Coordinates depend only on how many steps and gateways a design has.
//! Gateways are parked in a run after the last step, so their position does
//! not reflect where they sit in the flow.

use crate::config::LayoutOptions;
use crate::model::{Bounds, Point};

use super::connections::NodeRef;

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub start: Bounds,
    pub steps: Vec<Bounds>,
    pub gateways: Vec<Bounds>,
    pub end: Bounds,
}

impl Layout {
    /// Compute boxes for `steps` tasks and `gateways` gateways.
    ///
    /// Callers guarantee `steps >= 1`; a design without steps never reaches
    /// the layout stage.
    pub fn compute(steps: usize, gateways: usize, options: &LayoutOptions) -> Self {
        let LayoutOptions {
            origin_x,
            origin_y,
            spacing,
            event_size,
            task_width,
            task_height,
            gateway_size,
        } = *options;
        let axis = origin_y + event_size / 2.0;

        let start = Bounds::new(origin_x, origin_y, event_size, event_size);

        let steps_box = (0..steps)
            .map(|i| {
                Bounds::new(
                    origin_x + (i + 1) as f64 * spacing,
                    axis - task_height / 2.0,
                    task_width,
                    task_height,
                )
            })
            .collect();

        let gateway_origin = origin_x + (steps + 1) as f64 * spacing;
        let gateways_box = (0..gateways)
            .map(|i| {
                Bounds::new(
                    gateway_origin + i as f64 * spacing,
                    axis - gateway_size / 2.0,
                    gateway_size,
                    gateway_size,
                )
            })
            .collect();

        let end_x = f64::max(
            origin_x + (steps + 1) as f64 * spacing,
            gateway_origin + gateways as f64 * spacing,
        );
        let end = Bounds::new(end_x, origin_y, event_size, event_size);

        Self {
            start,
            steps: steps_box,
            gateways: gateways_box,
            end,
        }
    }

    pub fn bounds(&self, node: NodeRef) -> Option<Bounds> {
        match node {
            NodeRef::Start => Some(self.start),
            NodeRef::End => Some(self.end),
            NodeRef::Task(i) => self.steps.get(i).copied(),
            NodeRef::Gateway(i) => self.gateways.get(i).copied(),
        }
    }

    /// Straight connector from the source's right edge to the target's left edge.
    pub fn waypoints(&self, source: NodeRef, target: NodeRef) -> Option<[Point; 2]> {
        let from = self.bounds(source)?;
        let to = self.bounds(target)?;
        Some([from.right_center(), to.left_center()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steps_follow_the_start_marker() {
        let layout = Layout::compute(3, 0, &LayoutOptions::default());
        assert_eq!(layout.start, Bounds::new(150.0, 100.0, 36.0, 36.0));
        let xs: Vec<f64> = layout.steps.iter().map(|b| b.x).collect();
        assert_eq!(xs, vec![300.0, 450.0, 600.0]);
        assert_eq!(layout.end.x, 750.0);
    }

    #[test]
    fn boxes_share_the_marker_axis() {
        let layout = Layout::compute(2, 2, &LayoutOptions::default());
        let axis = layout.start.center().y;
        for b in layout.steps.iter().chain(&layout.gateways) {
            assert_eq!(b.center().y, axis);
        }
        assert_eq!(layout.end.center().y, axis);
    }

    #[test]
    fn gateways_are_placed_after_steps_and_push_the_end() {
        let layout = Layout::compute(2, 2, &LayoutOptions::default());
        assert_eq!(layout.gateways[0].x, 600.0);
        assert_eq!(layout.gateways[1].x, 750.0);
        assert_eq!(layout.end.x, 900.0);
    }

    #[test]
    fn unknown_nodes_have_no_bounds() {
        let layout = Layout::compute(1, 0, &LayoutOptions::default());
        assert!(layout.bounds(NodeRef::Task(1)).is_none());
        assert!(layout.waypoints(NodeRef::Start, NodeRef::Gateway(0)).is_none());
    }
}
