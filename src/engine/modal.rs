use std::collections::HashSet;

use tracing::debug;

use crate::{
    engine::engine_model::ModalSplit,
    geometry::bbox::ScreenSize,
    trace::{
        logger::TraceLogger,
        trace::{TraceEvent, TraceStage},
    },
    tree::element_model::{Element, ElementId},
};

/// Strategy that isolates one kind of transient overlay.
///
/// Implementations only look at `background` and must return every id they
/// were given, either as modal, background or dropped. Finding no anchors is
/// [`ModalSplit::unchanged`].
pub trait ModalDetector {
    fn name(&self) -> &'static str;

    fn detect(
        &self,
        elements: &[Element],
        background: &[ElementId],
        screen: ScreenSize,
    ) -> ModalSplit;
}

/// Run `detectors` in order, each over what the previous ones left behind.
pub fn run_modal_chain(
    detectors: &[Box<dyn ModalDetector>],
    elements: &[Element],
    candidates: &[ElementId],
    screen: ScreenSize,
    trace: &TraceLogger,
) -> ModalSplit {
    let mut acc = ModalSplit::unchanged(candidates);

    for detector in detectors {
        let step = detector.detect(elements, &acc.background, screen);

        if step.is_empty() {
            continue;
        }

        debug!(
            detector = detector.name(),
            modal = step.modal.len(),
            dropped = step.dropped.len(),
            "modal detector matched"
        );
        if trace.is_enabled() {
            trace.log(
                TraceEvent::now(TraceStage::Modal)
                    .with_reason(detector.name())
                    .with_total(step.modal.len() as i64),
            );
        }

        // Ids outside the current remainder are ignored.
        let offered: HashSet<ElementId> = acc.background.iter().copied().collect();
        let modal: Vec<ElementId> = step.modal.into_iter().filter(|id| offered.contains(id)).collect();
        let dropped: Vec<ElementId> = step
            .dropped
            .into_iter()
            .filter(|id| offered.contains(id) && !modal.contains(id))
            .collect();

        let claimed: HashSet<ElementId> = modal.iter().chain(dropped.iter()).copied().collect();
        acc.background.retain(|id| !claimed.contains(id));
        acc.modal.extend(modal);
        acc.dropped.extend(dropped);
    }

    acc
}
