use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    domain::{domain_model::Domain, scorer::score_domains_traced},
    engine::{
        engine_model::{Compression, FormatContext, ModalSplit, View},
        modal::run_modal_chain,
        plugin::plugin_for,
    },
    geometry::bbox::estimate_screen_size,
    trace::{
        logger::TraceLogger,
        trace::{TraceEvent, TraceStage},
    },
    tree::{
        element_model::{Element, ElementId},
        reconstruct::Reconstructor,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressOptions {
    /// Calls with modal detection suppressed after a view change
    #[serde(default = "default_view_cooldown")]
    pub view_cooldown: u32,

    #[serde(default = "default_label_max_len")]
    pub label_max_len: usize,

    /// Fold terminal descriptions into their text like paragraphs
    #[serde(default = "default_true")]
    pub track_terminals: bool,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            view_cooldown: default_view_cooldown(),
            label_max_len: default_label_max_len(),
            track_terminals: true,
        }
    }
}

fn default_view_cooldown() -> u32 { 2 }
fn default_label_max_len() -> usize { 140 }
fn default_true() -> bool { true }

/// One conversation's compression session. The only state kept between calls
/// is the last detected view and the modal-suppression cooldown.
pub struct Compressor {
    options: CompressOptions,
    trace: TraceLogger,
    last_view: Option<View>,
    cooldown: u32,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(CompressOptions::default())
    }
}

impl Compressor {
    pub fn new(options: CompressOptions) -> Self {
        Self {
            options,
            trace: TraceLogger::disabled(),
            last_view: None,
            cooldown: 0,
        }
    }

    pub fn with_trace(mut self, trace: TraceLogger) -> Self {
        self.trace = trace;
        self
    }

    pub fn options(&self) -> &CompressOptions {
        &self.options
    }

    pub fn trace(&self) -> &TraceLogger {
        &self.trace
    }

    pub fn cooldown(&self) -> u32 {
        self.cooldown
    }

    pub fn last_view(&self) -> Option<View> {
        self.last_view
    }

    pub fn reconstruct(&self, raw_text: &str) -> Vec<Element> {
        Reconstructor::new(self.options.track_terminals).run(raw_text)
    }

    /// Reconstruct, detect the domain and compress.
    pub fn compress_raw(&mut self, raw_text: &str, keywords: &BTreeSet<String>) -> Compression {
        let elements = self.reconstruct(raw_text);
        self.compress(&elements, keywords)
    }

    pub fn compress(&mut self, elements: &[Element], keywords: &BTreeSet<String>) -> Compression {
        let scores = score_domains_traced(elements, &self.trace);
        self.compress_as(scores.best, elements, keywords)
    }

    /// Compress with a fixed domain, skipping detection.
    pub fn compress_as(
        &mut self,
        domain: Domain,
        elements: &[Element],
        keywords: &BTreeSet<String>,
    ) -> Compression {
        let plugin = plugin_for(domain);
        let screen = estimate_screen_size(elements);
        let ids: Vec<ElementId> = elements.iter().map(|el| el.id).collect();

        let view = plugin.detect_view(elements);

        let mut regions = plugin.classify_regions(elements, &ids, screen, view, false);
        let split = plugin.split_static_dynamic(elements, &ids, screen, &regions);
        let missing = regions.fill_missing(&ids, plugin.fallback_region());
        if missing > 0 {
            debug!(count = missing, region = plugin.fallback_region(), "unclassified elements");
        }

        let suppressed = self.observe_view(domain, view);

        let modal = if suppressed {
            ModalSplit::unchanged(&split.dynamic)
        } else {
            let detectors = plugin.modal_detectors();
            run_modal_chain(&detectors, elements, &split.dynamic, screen, &self.trace)
        };

        let ctx = FormatContext {
            screen,
            view,
            keywords: keywords.clone(),
            label_max_len: self.options.label_max_len,
        };
        let lines = plugin.assemble(elements, &regions, &modal.modal, &modal.dropped, &ctx);

        debug!(
            domain = %domain,
            elements = elements.len(),
            modal = modal.modal.len(),
            lines = lines.len(),
            "compressed"
        );

        Compression {
            domain,
            screen,
            view,
            modal_suppressed: suppressed,
            split,
            regions,
            modal: modal.modal,
            dropped: modal.dropped,
            lines,
        }
    }

    /// Record `view` and report whether modal detection is suppressed for
    /// this call.
    fn observe_view(&mut self, domain: Domain, view: Option<View>) -> bool {
        let changed = matches!((self.last_view, view), (Some(prev), Some(cur)) if prev != cur);

        if changed && self.cooldown == 0 {
            self.cooldown = self.options.view_cooldown;
            debug!(from = ?self.last_view, to = ?view, cooldown = self.cooldown, "view changed");
            if self.trace.is_enabled() {
                let reason = format!(
                    "{} -> {}",
                    self.last_view.map(|v| v.as_str()).unwrap_or("none"),
                    view.map(|v| v.as_str()).unwrap_or("none"),
                );
                self.trace.log(
                    TraceEvent::now(TraceStage::ViewChange)
                        .with_domain(domain)
                        .with_reason(reason)
                        .with_total(self.cooldown as i64),
                );
            }
        }
        if view.is_some() {
            self.last_view = view;
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
            debug!(remaining = self.cooldown, "modal detection suppressed");
            true
        } else {
            false
        }
    }
}
