//! Live-preview generation: design in, BPMN document out.

pub mod connections;
pub mod layout;
pub mod markup;

use tracing::debug;

use crate::config::PreviewOptions;
use crate::error::Result;
use crate::model::ProcessDesign;

pub use connections::{resolve, Connection, ConnectionPlan, NodeRef};
pub use layout::Layout;
pub use markup::assemble;

/// A generated preview together with the intermediate results it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub xml: String,
    pub plan: ConnectionPlan,
    pub layout: Layout,
}

/// Run resolver, layout and assembler over a design snapshot.
///
/// Recomputed from scratch on every call; identical designs give
/// byte-identical documents.
pub fn generate_preview(design: &ProcessDesign, options: &PreviewOptions) -> Result<Preview> {
    let plan = resolve(design, options.conditions);
    let layout = Layout::compute(
        design.step_count(),
        design.gateways().len(),
        &options.layout,
    );
    let xml = assemble(design, &plan, &layout)?;
    debug!(
        process = design.name(),
        steps = design.step_count(),
        gateways = design.gateways().len(),
        flows = plan.len(),
        "generated BPMN preview"
    );
    Ok(Preview { xml, plan, layout })
}
