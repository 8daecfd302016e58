use crate::{
    domain::domain_model::Domain,
    engine::{
        engine_model::{RegionMap, View},
        plugin::{DomainPlugin, CONTENT_REGION},
    },
    geometry::bbox::ScreenSize,
    tree::element_model::{Element, ElementId},
};

/// Everything in one CONTENT region, no modal detection.
#[derive(Debug, Clone, Copy)]
pub struct GenericPlugin {
    domain: Domain,
}

impl GenericPlugin {
    pub fn new(domain: Domain) -> Self {
        Self { domain }
    }
}

impl Default for GenericPlugin {
    fn default() -> Self {
        Self::new(Domain::Generic)
    }
}

impl DomainPlugin for GenericPlugin {
    fn domain(&self) -> Domain {
        self.domain
    }

    fn classify_regions(
        &self,
        _elements: &[Element],
        ids: &[ElementId],
        _screen: ScreenSize,
        _view: Option<View>,
        _dry_run: bool,
    ) -> RegionMap {
        let mut regions = RegionMap::new(&[CONTENT_REGION]);
        for &id in ids {
            regions.push(CONTENT_REGION, id);
        }
        regions
    }
}
