//! Validate command handler - data-quality issues in a metadata document

use serde_json::json;

use crate::cli::ValidateArgs;
use crate::commands::{banner, CommandContext};
use crate::error::{Result, SleuthError};
use crate::quality::{has_errors, DataQualityIssue, Severity};

fn render_text(app_name: &str, issues: &[DataQualityIssue]) -> String {
    let mut output = banner(&format!("VALIDATE: {}", app_name));
    if issues.is_empty() {
        output.push_str("✓ No data-quality issues found\n");
        return output;
    }

    for issue in issues {
        let marker = match issue.severity {
            Severity::Error => "✗",
            Severity::Warning => "⚠",
        };
        output.push_str(&format!(
            "{} [{}] {} {}: {}\n",
            marker, issue.severity, issue.code, issue.subject, issue.message
        ));
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    output.push_str(&format!(
        "\n{} errors, {} warnings\n",
        errors,
        issues.len() - errors
    ));
    output
}

/// Run the validate command.
///
/// Error-level issues fail the command; the report is carried in the error.
pub fn run_validate(args: &ValidateArgs, ctx: &CommandContext) -> Result<String> {
    let export = ctx.load_app(&args.source)?;
    let app = &export.application;

    let mut issues = app.validate();
    issues.sort_by(|a, b| b.severity.cmp(&a.severity));

    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();
    let json_value = json!({
        "_type": "validation",
        "application": app.name,
        "valid": !has_errors(&issues),
        "errors": errors,
        "warnings": issues.len() - errors,
        "issues": issues,
    });

    let report = ctx.render(&json_value, || render_text(&app.name, &issues));
    if has_errors(&issues) {
        return Err(SleuthError::ValidationFailed { errors, report });
    }
    Ok(report)
}
