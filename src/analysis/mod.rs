//! Architecture summary of an application
//!
//! Produces a structured, read-only view of the whole app: size and density,
//! domain classification, relationship topology, data and UI patterns,
//! access control, technical-debt indicators and extensibility.
//!
//! Every section is a pure function of the borrowed snapshot.

mod debt;
mod domain;
mod overview;
mod patterns;
mod topology;
mod ui;

pub use debt::{OrphanedField, TechnicalDebt};
pub use domain::{DomainModel, EntitySummary, PrimaryRole};
pub use overview::{ApplicationOverview, ComplexityMetrics};
pub use patterns::{
    formula_references, CalculationComplexity, DataPatterns, LifecyclePattern, TemporalObject,
};
pub use topology::{
    ArchitecturalStyle, ConnectionGraph, CoupledPair, CouplingReason, DependencyCluster,
    Extensibility, GraphEdge, HubObject, RelationshipMap,
};
pub use ui::{
    AccessPatterns, AuthenticationModel, NavigationDepth, RoleUsage, ScenePatterns,
    UiArchitecture, ViewChainDepth, ViewPatterns, ViewTypeCount,
};

use serde::Serialize;

use crate::schema::Object;
use crate::search::Sleuth;

/// Full architecture summary
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    pub application: ApplicationOverview,
    pub domain_model: DomainModel,
    pub relationship_map: RelationshipMap,
    pub data_patterns: DataPatterns,
    pub ui_architecture: UiArchitecture,
    pub access_patterns: AccessPatterns,
    pub technical_debt_indicators: TechnicalDebt,
    pub extensibility_assessment: Extensibility,
}

/// Name and key of an object
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectRef {
    pub object: String,
    pub object_key: String,
}

impl From<&Object> for ObjectRef {
    fn from(obj: &Object) -> Self {
        Self {
            object: obj.name.clone(),
            object_key: obj.key.clone(),
        }
    }
}

/// Afferent / efferent coupling of one object
#[derive(Debug, Clone, Default, Serialize)]
pub struct ObjectCoupling {
    pub object_key: String,
    pub name: String,
    pub record_count: u64,
    pub field_count: usize,
    /// Afferent coupling (inbound connections)
    pub afferent: usize,
    /// Efferent coupling (outbound connections)
    pub efferent: usize,
}

impl ObjectCoupling {
    pub fn total(&self) -> usize {
        self.afferent + self.efferent
    }

    /// Calculate instability metric (Ce / (Ca + Ce))
    /// 0 = maximally stable (hard to change)
    /// 1 = maximally unstable (easy to change)
    pub fn instability(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.5
        } else {
            self.efferent as f64 / total as f64
        }
    }
}

/// Round half away from zero to `places` decimals
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

impl<'a> Sleuth<'a> {
    /// Summarize the architecture of the whole application
    pub fn generate_app_summary(&self) -> AppSummary {
        let app = self.application();
        let relationship_map = topology::relationship_map(app);
        let extensibility = topology::extensibility(app, &relationship_map.dependency_clusters);

        AppSummary {
            application: overview::analyze(app),
            domain_model: domain::analyze(app),
            relationship_map,
            data_patterns: patterns::analyze(app),
            ui_architecture: ui::analyze(app),
            access_patterns: ui::access_patterns(app),
            technical_debt_indicators: debt::analyze(self),
            extensibility_assessment: extensibility,
        }
    }

    /// Coupling metrics for one object
    pub fn object_coupling(&self, object_key: &str) -> Option<ObjectCoupling> {
        let obj = self.object_info(object_key)?;
        Some(self.coupling_of(obj))
    }

    /// Coupling metrics for every object, in declaration order
    pub fn coupling_table(&self) -> Vec<ObjectCoupling> {
        self.application()
            .objects
            .iter()
            .map(|obj| self.coupling_of(obj))
            .collect()
    }

    fn coupling_of(&self, obj: &Object) -> ObjectCoupling {
        ObjectCoupling {
            object_key: obj.key.clone(),
            name: obj.name.clone(),
            record_count: self.application().record_count(&obj.key),
            field_count: obj.fields.len(),
            afferent: obj.inbound().len(),
            efferent: obj.outbound().len(),
        }
    }
}
