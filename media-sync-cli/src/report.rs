//! Human-readable run summaries

use core_service::{PlanStatus, SyncErrorEntry, SyncPlan, SyncReport, SyncResult};
use std::fmt::Write;

pub fn render(report: &SyncReport) -> String {
    match report {
        SyncReport::Synced(result) => render_result(result),
        SyncReport::Planned(plan) => render_plan(plan),
    }
}

fn render_result(result: &SyncResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sync finished");
    let _ = writeln!(out, "  Links:    {}", result.links);
    let _ = writeln!(out, "  Eligible: {}", result.eligible);
    let _ = writeln!(out, "  Created:  {}", result.created);
    let _ = writeln!(out, "  Skipped:  {}", result.skipped);
    let _ = writeln!(out, "  Errors:   {}", result.errors.len());

    for batch in &result.batches {
        let _ = writeln!(
            out,
            "  Batch {}: {} items, {} created, {} failed",
            batch.index + 1,
            batch.size,
            batch.created,
            batch.failed
        );
    }

    render_errors(&mut out, &result.errors);
    out
}

fn render_plan(plan: &SyncPlan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dry run: nothing was written");
    let _ = writeln!(out, "  Links:          {}", plan.links);
    let _ = writeln!(out, "  Would create:   {}", plan.would_create());
    let _ = writeln!(out, "  Already exists: {}", plan.already_exists());
    let _ = writeln!(out, "  Duplicates:     {}", plan.duplicates());
    let _ = writeln!(out, "  Check failures: {}", plan.check_failures());

    if !plan.entries.is_empty() {
        let _ = writeln!(out);
    }
    for entry in &plan.entries {
        let status = match &entry.status {
            PlanStatus::WouldCreate => "create".to_string(),
            PlanStatus::AlreadyExists => "exists".to_string(),
            PlanStatus::DuplicateInRun => "duplicate".to_string(),
            PlanStatus::CheckFailed { error } => format!("check failed: {}", error),
        };
        let _ = writeln!(out, "  [{}] {} {}", status, entry.file_name, entry.link);
    }

    render_errors(&mut out, &plan.errors);
    out
}

fn render_errors(out: &mut String, errors: &[SyncErrorEntry]) {
    if errors.is_empty() {
        return;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Errors:");
    for error in errors {
        let _ = writeln!(out, "  {}", error);
    }
}
