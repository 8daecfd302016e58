use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{domain::domain_model::Domain, tree::element_model::Element};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStage {
    Score,
    ScoreSummary,
    Modal,
    ViewChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub stage: TraceStage,

    pub domain: Option<String>,

    pub delta: Option<i64>,
    pub total: Option<i64>,

    pub reason: Option<String>,
    pub element: Option<String>,
}

impl TraceEvent {
    pub fn now(stage: TraceStage) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            stage,
            domain: None,
            delta: None,
            total: None,
            reason: None,
            element: None,
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = Some(domain.as_str().to_string());
        self
    }

    pub fn with_score(mut self, delta: i64, total: i64) -> Self {
        self.delta = Some(delta);
        self.total = Some(total);
        self
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_reason(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }

    pub fn with_element(mut self, el: &Element) -> Self {
        self.element = Some(format!("{} {:?} {:?}", el.tag, el.name, el.text));
        self
    }
}
