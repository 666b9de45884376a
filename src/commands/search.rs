//! Search command handlers - object and field usage search

use std::collections::BTreeSet;

use serde_json::json;

use crate::cli::{SearchFieldArgs, SearchObjectArgs};
use crate::commands::{banner, CommandContext};
use crate::error::{Result, SleuthError};
use crate::search::{Sleuth, Usage};

/// Scene keys mentioned by a set of usages
pub(crate) fn scenes_of<'u>(usages: impl IntoIterator<Item = &'u Usage>) -> BTreeSet<String> {
    usages
        .into_iter()
        .filter_map(|u| u.details.scene_key.clone())
        .collect()
}

fn push_usages(output: &mut String, usages: &[Usage], indent: &str) {
    for usage in usages {
        output.push_str(&format!(
            "{}• [{}] {}\n",
            indent, usage.location_type, usage.context
        ));
    }
}

fn push_builder_pages(output: &mut String, ctx: &CommandContext, pages: &[String]) {
    if pages.is_empty() {
        return;
    }
    output.push_str(&format!("\nBuilder Pages to Review: {} scenes\n\n", pages.len()));
    for url in pages {
        output.push_str(&format!("  {}\n", url));
    }
    if !ctx.config.api.next_gen_builder {
        output.push_str("\nTip: Set KNACK_NEXT_GEN_BUILDER=true to use Next-Gen builder URLs\n");
    }
}

/// Run the search-object command
pub fn run_search_object(args: &SearchObjectArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;
    let sleuth = Sleuth::with_policy(app, ctx.config.risk.clone());

    let obj = sleuth
        .resolve_object(&args.object)
        .ok_or_else(|| SleuthError::NotFound {
            kind: "Object",
            identifier: args.object.clone(),
        })?;
    let results = sleuth.search_object(&obj.key);

    let scene_keys = if args.no_fields {
        scenes_of(&results.object_usages)
    } else {
        scenes_of(results.all_usages())
    };
    let pages = ctx.builder_pages(app, &scene_keys);

    let field_rows: Vec<serde_json::Value> = if args.no_fields {
        Vec::new()
    } else {
        results
            .fields
            .iter()
            .map(|f| {
                let field = obj.field(&f.field_key);
                json!({
                    "field_key": f.field_key,
                    "field_name": field.map(|x| x.name.as_str()),
                    "field_type": field.map(|x| x.field_type.as_str()),
                    "usage_count": f.usages.len(),
                    "usages": f.usages,
                })
            })
            .collect()
    };

    let json_value = json!({
        "_type": "object_search",
        "object": {
            "key": obj.key,
            "name": obj.name,
            "field_count": obj.fields.len(),
        },
        "object_usages": results.object_usages,
        "field_usages": field_rows,
        "builder_pages": pages,
    });

    Ok(ctx.render(&json_value, || {
        let mut output = banner(&format!("OBJECT SEARCH: {} ({})", obj.name, obj.key));
        output.push_str(&format!("fields: {}\n\n", obj.fields.len()));

        output.push_str(&format!(
            "Object-level usages: {}\n",
            results.object_usages.len()
        ));
        if results.object_usages.is_empty() {
            output.push_str("  No direct object usages found\n");
        } else {
            push_usages(&mut output, &results.object_usages, "  ");
        }

        if !args.no_fields {
            if results.fields.is_empty() {
                output.push_str("\nNo field usages found\n");
            } else {
                output.push_str(&format!(
                    "\nField-level usages: {} fields with usages\n",
                    results.fields.len()
                ));
                for f in &results.fields {
                    let Some(field) = obj.field(&f.field_key) else {
                        continue;
                    };
                    output.push_str(&format!(
                        "\n  {} ({}) - {} - {} usages\n",
                        field.name,
                        f.field_key,
                        field.field_type,
                        f.usages.len()
                    ));
                    push_usages(&mut output, &f.usages, "    ");
                }
            }
        }

        push_builder_pages(&mut output, ctx, &pages);
        output
    }))
}

/// Run the search-field command
pub fn run_search_field(args: &SearchFieldArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;
    let sleuth = Sleuth::with_policy(app, ctx.config.risk.clone());

    let (owner, field) = sleuth
        .resolve_field(&args.field)
        .ok_or_else(|| SleuthError::NotFound {
            kind: "Field",
            identifier: args.field.clone(),
        })?;
    let usages = sleuth.search_field(&field.key);
    let pages = ctx.builder_pages(app, &scenes_of(&usages));

    let json_value = json!({
        "_type": "field_search",
        "field": {
            "key": field.key,
            "name": field.name,
            "type": field.field_type.as_str(),
            "object_key": owner.key,
            "object_name": owner.name,
        },
        "usage_count": usages.len(),
        "usages": usages,
        "builder_pages": pages,
    });

    Ok(ctx.render(&json_value, || {
        let mut output = banner(&format!("FIELD SEARCH: {} ({})", field.name, field.key));
        output.push_str(&format!("object: {} ({})\n", owner.name, owner.key));
        output.push_str(&format!("type: {}\n\n", field.field_type));

        output.push_str(&format!("Usages: {}\n", usages.len()));
        if usages.is_empty() {
            output.push_str("  No usages found\n");
        } else {
            push_usages(&mut output, &usages, "  ");
        }

        push_builder_pages(&mut output, ctx, &pages);
        output
    }))
}
