//! App summary command handler

use crate::analysis::{
    AppSummary, ArchitecturalStyle, AuthenticationModel, CouplingReason, EntitySummary,
    LifecyclePattern, ObjectRef, PrimaryRole,
};
use crate::cli::SummaryArgs;
use crate::commands::{typed_json, write_or_return, CommandContext};
use crate::error::Result;
use crate::search::Sleuth;

fn role_label(role: PrimaryRole) -> &'static str {
    match role {
        PrimaryRole::Transactional => "transactional",
        PrimaryRole::Reference => "reference",
        PrimaryRole::Supporting => "supporting",
    }
}

fn style_label(style: ArchitecturalStyle) -> &'static str {
    match style {
        ArchitecturalStyle::HubAndSpoke => "hub and spoke",
        ArchitecturalStyle::Modular => "modular",
        ArchitecturalStyle::Mixed => "mixed",
    }
}

fn push_entities(out: &mut String, title: &str, entities: &[EntitySummary]) {
    if entities.is_empty() {
        return;
    }
    out.push_str(&format!("### {} ({})\n\n", title, entities.len()));
    out.push_str("| Object | Key | Records | Fields | Connections | Importance | Role |\n");
    out.push_str("|---|---|---:|---:|---:|---:|---|\n");
    for e in entities {
        out.push_str(&format!(
            "| {} | `{}` | {} | {} | {} | {} | {} |\n",
            e.name,
            e.object_key,
            e.record_count,
            e.field_count,
            e.total_connections,
            e.importance_score,
            role_label(e.primary_role)
        ));
    }
    out.push('\n');
}

/// Render an app summary as markdown
pub fn render_markdown(summary: &AppSummary) -> String {
    let mut out = String::new();
    let app = &summary.application;
    let metrics = &app.complexity_metrics;

    out.push_str(&format!("# Application Summary: {}\n\n", app.name));
    out.push_str("## Application\n\n");
    out.push_str(&format!("- **ID**: `{}`\n", app.id));
    out.push_str(&format!("- **Slug**: {}\n", app.slug));
    if let Some(description) = &app.description {
        out.push_str(&format!("- **Description**: {}\n", description));
    }
    out.push_str(&format!(
        "- **Objects / fields**: {} / {}\n",
        metrics.total_objects, metrics.total_fields
    ));
    out.push_str(&format!(
        "- **Scenes / views**: {} / {}\n",
        metrics.total_scenes, metrics.total_views
    ));
    out.push_str(&format!("- **Records**: {}\n", metrics.total_records));
    out.push_str(&format!(
        "- **Connection density**: {}\n",
        metrics.connection_density
    ));
    out.push_str(&format!("- **Assessment**: {}\n\n", metrics.interpretation));

    let domain = &summary.domain_model;
    out.push_str("## Domain Model\n\n");
    push_entities(&mut out, "User profiles", &domain.user_profiles);
    push_entities(&mut out, "Core entities", &domain.core_entities);
    push_entities(&mut out, "Transactional entities", &domain.transactional_entities);
    push_entities(&mut out, "Reference data", &domain.reference_data);
    push_entities(&mut out, "Supporting entities", &domain.supporting_entities);

    let rel = &summary.relationship_map;
    out.push_str("## Relationships\n\n");
    out.push_str(&format!(
        "- **Connections**: {}\n",
        rel.connection_graph.total_connections
    ));
    if rel.hub_objects.is_empty() {
        out.push_str("- **Hub objects**: none\n");
    } else {
        out.push_str("- **Hub objects**:\n");
        for hub in &rel.hub_objects {
            out.push_str(&format!(
                "  - {} (`{}`): {} in / {} out, {}\n",
                hub.object,
                hub.object_key,
                hub.inbound_connections,
                hub.outbound_connections,
                hub.interpretation
            ));
        }
    }
    for (i, cluster) in rel.dependency_clusters.iter().enumerate() {
        out.push_str(&format!(
            "- **Cluster {}** ({} cohesion): {}\n",
            i + 1,
            cluster.cohesion,
            cluster.objects.join(", ")
        ));
    }
    out.push('\n');

    let patterns = &summary.data_patterns;
    let calc = &patterns.calculation_complexity;
    out.push_str("## Data Patterns\n\n");
    out.push_str(&format!("- **Formula fields**: {}\n", calc.total_formula_fields));
    out.push_str(&format!(
        "- **Objects with formulas**: {}\n",
        calc.objects_with_formulas
    ));
    out.push_str(&format!(
        "- **Max chain depth**: {}\n",
        calc.max_formula_chain_depth
    ));
    if !calc.cyclic_formula_fields.is_empty() {
        out.push_str(&format!(
            "- **Cyclic formulas**: {}\n",
            calc.cyclic_formula_fields.join(", ")
        ));
    }
    out.push_str(&format!("- **Assessment**: {}\n", calc.interpretation));
    for temporal in &patterns.temporal_objects {
        let pattern = match temporal.lifecycle_pattern {
            LifecyclePattern::StatefulEntity => "stateful",
            LifecyclePattern::Timestamped => "timestamped",
        };
        out.push_str(&format!(
            "- **{}** (`{}`): {}\n",
            temporal.object, temporal.object_key, pattern
        ));
    }
    out.push('\n');

    let ui = &summary.ui_architecture;
    out.push_str("## UI Architecture\n\n");
    out.push_str(&format!(
        "- **Scenes**: {} authenticated, {} public\n",
        ui.scene_patterns.authenticated_scenes, ui.scene_patterns.public_scenes
    ));
    out.push_str(&format!(
        "- **Views**: {} authenticated, {} public\n",
        ui.scene_patterns.authenticated_views, ui.scene_patterns.public_views
    ));
    let histogram: Vec<String> = ui
        .view_patterns
        .counts
        .iter()
        .map(|c| format!("{} {}", c.view_type, c.count))
        .collect();
    out.push_str(&format!("- **View types**: {}\n", histogram.join(", ")));
    out.push_str(&format!(
        "- **Navigation depth**: max {}, avg {}\n",
        ui.navigation_depth.max_depth, ui.navigation_depth.avg_depth
    ));
    out.push_str(&format!(
        "- **Views through a parent record**: {}\n",
        ui.navigation_depth.views_with_parent_source
    ));
    let chain = &ui.navigation_depth.view_chain;
    out.push_str(&format!(
        "- **View drill-down depth**: max {}, avg {} ({})\n",
        chain.max_depth, chain.avg_depth, chain.interpretation
    ));
    out.push_str(&format!("- **Assessment**: {}\n\n", ui.scene_patterns.interpretation));

    let access = &summary.access_patterns;
    out.push_str("## Access\n\n");
    let model = match access.authentication_model {
        AuthenticationModel::UserBased => "user based",
        AuthenticationModel::Public => "public",
    };
    out.push_str(&format!("- **Authentication**: {}\n", model));
    if !access.user_objects.is_empty() {
        out.push_str(&format!(
            "- **User objects**: {}\n",
            access.user_objects.join(", ")
        ));
    }
    out.push_str(&format!(
        "- **Role restricted scenes**: {}\n\n",
        access.role_usage.scenes_with_role_restrictions
    ));

    let debt = &summary.technical_debt_indicators;
    out.push_str("## Technical Debt\n\n");
    out.push_str(&format!("- **Orphaned fields**: {}\n", debt.orphaned_fields));
    out.push_str(&format!("- **Orphaned objects**: {}\n", debt.orphaned_objects));
    let names = |refs: &[ObjectRef]| {
        refs.iter()
            .map(|r| r.object.clone())
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !debt.bottleneck_objects.is_empty() {
        out.push_str(&format!(
            "- **Bottlenecks**: {}\n",
            names(&debt.bottleneck_objects)
        ));
    }
    if !debt.high_fan_out_objects.is_empty() {
        out.push_str(&format!(
            "- **High fan-out**: {}\n",
            names(&debt.high_fan_out_objects)
        ));
    }
    out.push_str(&format!("- **Assessment**: {}\n\n", debt.interpretation));

    let ext = &summary.extensibility_assessment;
    out.push_str("## Extensibility\n\n");
    out.push_str(&format!("- **Modularity score**: {}\n", ext.modularity_score));
    out.push_str(&format!(
        "- **Architectural style**: {}\n",
        style_label(ext.architectural_style)
    ));
    for pair in &ext.tight_coupling_pairs {
        let reason = match pair.reason {
            CouplingReason::Bidirectional => "bidirectional",
            CouplingReason::SharedTargets => "shared targets",
        };
        out.push_str(&format!(
            "- **Tightly coupled**: {} and {} ({})\n",
            pair.object_a, pair.object_b, reason
        ));
    }
    out.push_str(&format!("- **Assessment**: {}\n", ext.interpretation));
    out
}

/// Run the app-summary command
pub fn run_summary(args: &SummaryArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let sleuth = Sleuth::with_policy(&export.application, ctx.config.risk.clone());
    let summary = sleuth.generate_app_summary();

    let json_value = typed_json("app_summary", &summary);
    let rendered = ctx.render(&json_value, || render_markdown(&summary));
    write_or_return(args.output.as_deref(), rendered, "App summary")
}
