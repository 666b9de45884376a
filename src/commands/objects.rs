//! Object listing and coupling command handlers

use serde::Serialize;
use serde_json::json;

use crate::analysis::ObjectCoupling;
use crate::cli::{ListObjectsArgs, ShowCouplingArgs};
use crate::commands::{banner, typed_json, CommandContext};
use crate::error::{Result, SleuthError};
use crate::schema::{Application, Connection};
use crate::search::Sleuth;

#[derive(Debug, Default, Serialize)]
struct Totals {
    objects: usize,
    record_count: u64,
    field_count: usize,
    afferent: usize,
    efferent: usize,
    total: usize,
}

impl Totals {
    fn of(rows: &[ObjectCoupling]) -> Self {
        rows.iter().fold(
            Self {
                objects: rows.len(),
                ..Default::default()
            },
            |mut t, row| {
                t.record_count += row.record_count;
                t.field_count += row.field_count;
                t.afferent += row.afferent;
                t.efferent += row.efferent;
                t.total += row.total();
                t
            },
        )
    }
}

/// Coupling rows sorted by name, or by record count (largest first)
fn sorted_rows(sleuth: &Sleuth<'_>, by_rows: bool) -> Vec<ObjectCoupling> {
    let mut rows = sleuth.coupling_table();
    if by_rows {
        rows.sort_by(|a, b| {
            b.record_count
                .cmp(&a.record_count)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
    } else {
        rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    }
    rows
}

/// Run the list-objects command
pub fn run_list_objects(args: &ListObjectsArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;
    let sleuth = Sleuth::new(app);

    let rows = sorted_rows(&sleuth, args.sort_by_rows);
    let totals = Totals::of(&rows);

    let objects: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            let mut value = typed_json("object", row);
            value["total"] = json!(row.total());
            value
        })
        .collect();
    let json_value = json!({
        "_type": "object_list",
        "application": app.name,
        "objects": objects,
        "totals": totals,
    });

    Ok(ctx.render(&json_value, || {
        let mut output = banner(&format!("OBJECTS: {}", app.name));
        let name_width = rows
            .iter()
            .map(|r| r.name.chars().count())
            .max()
            .unwrap_or(4)
            .max(5);

        output.push_str(&format!(
            "{:<12} {:<name_width$} {:>8} {:>6} {:>4} {:>4} {:>5}\n",
            "KEY", "NAME", "ROWS", "FIELDS", "CA", "CE", "TOTAL"
        ));
        output.push_str(&format!("{}\n", "─".repeat(12 + name_width + 36)));
        for row in &rows {
            output.push_str(&format!(
                "{:<12} {:<name_width$} {:>8} {:>6} {:>4} {:>4} {:>5}\n",
                row.object_key,
                row.name,
                row.record_count,
                row.field_count,
                row.afferent,
                row.efferent,
                row.total()
            ));
        }
        output.push_str(&format!("{}\n", "─".repeat(12 + name_width + 36)));
        output.push_str(&format!(
            "{:<12} {:<name_width$} {:>8} {:>6} {:>4} {:>4} {:>5}\n",
            format!("{} objects", totals.objects),
            "TOTAL",
            totals.record_count,
            totals.field_count,
            totals.afferent,
            totals.efferent,
            totals.total
        ));

        if ctx.verbose {
            output.push_str("\nCa = afferent (inbound) connections, Ce = efferent (outbound)\n");
        }
        output
    }))
}

fn connection_rows(app: &Application, connections: &[Connection]) -> Vec<serde_json::Value> {
    connections
        .iter()
        .map(|conn| {
            let other = app.objects.iter().find(|o| o.key == conn.object);
            json!({
                "object_key": conn.object,
                "object_name": other.map(|o| o.name.as_str()),
                "connection_field": conn.key,
                "connection_name": conn.name,
                "relationship": conn.relationship(),
            })
        })
        .collect()
}

fn push_connections(output: &mut String, app: &Application, connections: &[Connection], arrow: &str) {
    for conn in connections {
        let other = app
            .objects
            .iter()
            .find(|o| o.key == conn.object)
            .map(|o| o.name.as_str())
            .unwrap_or("unknown object");
        output.push_str(&format!(
            "  {} {} ({}) via {} '{}' [{}]\n",
            arrow,
            other,
            conn.object,
            conn.key,
            conn.name,
            conn.relationship()
        ));
    }
}

/// Run the show-coupling command
pub fn run_show_coupling(args: &ShowCouplingArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;
    let sleuth = Sleuth::new(app);

    let obj = sleuth
        .resolve_object(&args.object)
        .ok_or_else(|| SleuthError::NotFound {
            kind: "Object",
            identifier: args.object.clone(),
        })?;
    let coupling = sleuth
        .object_coupling(&obj.key)
        .unwrap_or_default();

    let json_value = json!({
        "_type": "object_coupling",
        "object_key": obj.key,
        "name": obj.name,
        "afferent": coupling.afferent,
        "efferent": coupling.efferent,
        "total": coupling.total(),
        "instability": crate::analysis::round_to(coupling.instability(), 2),
        "inbound": connection_rows(app, obj.inbound()),
        "outbound": connection_rows(app, obj.outbound()),
    });

    Ok(ctx.render(&json_value, || {
        let mut output = banner(&format!("COUPLING: {} ({})", obj.name, obj.key));

        output.push_str(&format!(
            "Afferent coupling (Ca): {} - objects that depend on {}\n",
            coupling.afferent, obj.name
        ));
        if obj.inbound().is_empty() {
            output.push_str("  none\n");
        } else {
            push_connections(&mut output, app, obj.inbound(), "←");
        }

        output.push_str(&format!(
            "\nEfferent coupling (Ce): {} - objects {} depends on\n",
            coupling.efferent, obj.name
        ));
        if obj.outbound().is_empty() {
            output.push_str("  none\n");
        } else {
            push_connections(&mut output, app, obj.outbound(), "→");
        }

        output.push_str(&format!(
            "\nInstability: {:.2} (0 = stable, 1 = unstable)\n",
            coupling.instability()
        ));
        output
    }))
}
