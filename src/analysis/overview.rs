//! Application identity and size metrics

use serde::Serialize;

use super::round_to;
use crate::interpret::CONNECTION_DENSITY;
use crate::schema::Application;

#[derive(Debug, Clone, Serialize)]
pub struct ComplexityMetrics {
    pub total_objects: usize,
    pub total_fields: usize,
    pub total_scenes: usize,
    pub total_views: usize,
    /// Sum of record counts of the declared objects
    pub total_records: u64,
    /// Connection entries over possible ordered object pairs
    pub connection_density: f64,
    pub interpretation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationOverview {
    pub name: String,
    pub id: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub complexity_metrics: ComplexityMetrics,
}

pub(super) fn analyze(app: &Application) -> ApplicationOverview {
    let n = app.objects.len();
    let actual: usize = app.objects.iter().map(|o| o.connection_count()).sum();
    let possible = n.saturating_mul(n.saturating_sub(1));
    let density = if possible > 0 {
        round_to(actual as f64 / possible as f64, 3)
    } else {
        0.0
    };

    ApplicationOverview {
        name: app.name.clone(),
        id: app.id.clone(),
        slug: app.slug.clone(),
        description: app.description.clone().filter(|d| !d.is_empty()),
        complexity_metrics: ComplexityMetrics {
            total_objects: n,
            total_fields: app.total_fields(),
            total_scenes: app.scenes.len(),
            total_views: app.total_views(),
            total_records: app.objects.iter().map(|o| app.record_count(&o.key)).sum(),
            connection_density: density,
            interpretation: CONNECTION_DENSITY.interpret(density).to_string(),
        },
    }
}
