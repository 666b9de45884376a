//! Impact analysis command handler

use std::collections::BTreeSet;

use crate::cli::ImpactArgs;
use crate::commands::{typed_json, write_or_return, CommandContext};
use crate::error::{Result, SleuthError};
use crate::impact::ImpactReport;
use crate::search::Sleuth;

/// Render an impact report as markdown
pub fn render_markdown(report: &ImpactReport, builder_pages: &[String]) -> String {
    let target = &report.target;
    let risk = &report.risk_assessment;
    let direct = &report.direct_impacts;
    let mut out = String::new();

    out.push_str(&format!("# Impact Analysis: {}\n\n", target.name));

    out.push_str("## Target\n\n");
    out.push_str(&format!("- **Key**: `{}`\n", target.key));
    out.push_str(&format!("- **Type**: {}\n", target.target_type.as_str()));
    if let Some(object_key) = &target.object_key {
        out.push_str(&format!("- **Object**: `{}`\n", object_key));
    }
    out.push_str(&format!("- **Description**: {}\n", target.description));
    for role in &target.schema_roles {
        out.push_str(&format!("- **Schema role**: {}\n", role.context));
    }

    out.push_str("\n## Risk Assessment\n\n");
    out.push_str(&format!(
        "- **Breaking change likelihood**: {}\n",
        risk.breaking_change_likelihood
    ));
    out.push_str(&format!("- **Impact score**: {}\n", risk.impact_score));
    out.push_str(&format!(
        "- **Direct impacts**: {}\n",
        report.metadata.total_direct_impacts
    ));
    out.push_str(&format!(
        "- **Cascade impacts**: {}\n",
        report.metadata.total_cascade_impacts
    ));
    if !risk.workflow_categories.is_empty() {
        out.push_str(&format!(
            "- **Workflow categories**: {}\n",
            risk.workflow_categories.join(", ")
        ));
    }
    if !risk.affected_user_workflows.is_empty() {
        out.push_str(&format!(
            "- **Affected workflows**: {}\n",
            risk.affected_user_workflows.join(", ")
        ));
    }

    out.push_str("\n## Direct Impacts\n\n");

    out.push_str(&format!("### Connections ({})\n\n", direct.connections.len()));
    if direct.connections.is_empty() {
        out.push_str("*No connection impacts*\n");
    }
    for c in &direct.connections {
        out.push_str(&format!("- [{}] {}\n", c.location_type, c.description));
    }

    out.push_str(&format!("\n### Views ({})\n\n", direct.views.len()));
    if direct.views.is_empty() {
        out.push_str("*No view impacts*\n");
    }
    for v in &direct.views {
        out.push_str(&format!(
            "- [{}] {} `{}` ({}) in scene {}\n",
            v.location_type,
            v.view_name.as_deref().unwrap_or("unnamed view"),
            v.view_key.as_deref().unwrap_or("?"),
            v.view_type.as_deref().unwrap_or("view"),
            v.scene_name.as_deref().unwrap_or("?")
        ));
    }

    out.push_str(&format!("\n### Forms ({})\n\n", direct.forms.len()));
    if direct.forms.is_empty() {
        out.push_str("*No form impacts*\n");
    }
    for f in &direct.forms {
        out.push_str(&format!(
            "- {} `{}` in scene {}\n",
            f.view_name.as_deref().unwrap_or("unnamed form"),
            f.view_key.as_deref().unwrap_or("?"),
            f.scene_name.as_deref().unwrap_or("?")
        ));
    }

    out.push_str(&format!("\n### Formulas ({})\n\n", direct.formulas.len()));
    if direct.formulas.is_empty() {
        out.push_str("*No formula impacts*\n");
    }
    for f in &direct.formulas {
        out.push_str(&format!(
            "- {} `{}` on {}",
            f.field_name.as_deref().unwrap_or("unnamed field"),
            f.field_key.as_deref().unwrap_or("?"),
            f.object_name.as_deref().unwrap_or("?")
        ));
        match &f.equation {
            Some(eq) => out.push_str(&format!(": `{}`\n", eq)),
            None => out.push('\n'),
        }
    }

    out.push_str(&format!("\n### Scenes ({})\n\n", direct.scenes.len()));
    if direct.scenes.is_empty() {
        out.push_str("*No scenes affected*\n");
    }
    for s in &direct.scenes {
        out.push_str(&format!(
            "- {} `{}` (/{})\n",
            s.scene_name, s.scene_key, s.scene_slug
        ));
    }

    let cascade = &report.cascade_impacts;
    out.push_str("\n## Cascade Impacts\n\n");
    if cascade.affected_fields.is_empty() {
        out.push_str("*No cascade impacts*\n");
    }
    for field in &cascade.affected_fields {
        out.push_str(&format!(
            "- {} `{}` ({}): {} usages\n",
            field.field_name, field.field_key, field.field_type, field.usage_count
        ));
        for usage in &field.usages {
            out.push_str(&format!("  - [{}] {}\n", usage.location_type, usage.context));
        }
    }

    if !builder_pages.is_empty() {
        out.push_str("\n## Builder Pages to Review\n\n");
        for url in builder_pages {
            out.push_str(&format!("- {}\n", url));
        }
    }
    out
}

/// Run the impact-analysis command
pub fn run_impact(args: &ImpactArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;
    let sleuth = Sleuth::with_policy(app, ctx.config.risk.clone());

    let (key, target_type) =
        sleuth
            .resolve_target(&args.target)
            .ok_or_else(|| SleuthError::NotFound {
                kind: "Object or field",
                identifier: args.target.clone(),
            })?;
    let report = sleuth.analyze_impact(&key, Some(target_type))?;

    let scene_keys: BTreeSet<String> = report
        .cascade_impacts
        .affected_scenes
        .iter()
        .cloned()
        .collect();
    let pages = ctx.builder_pages(app, &scene_keys);

    let mut json_value = typed_json("impact_analysis", &report);
    json_value["builder_pages"] = serde_json::json!(pages);

    let rendered = ctx.render(&json_value, || render_markdown(&report, &pages));
    write_or_return(args.output.as_deref(), rendered, "Impact analysis")
}
