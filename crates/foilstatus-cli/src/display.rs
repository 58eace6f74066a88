//! Console rendering of a reconciliation report.
//!
//! Layout: summary counts, then one block per officer, then one block per FOIL
//! batch. Each block lists received and waiting complaints, marking waiting
//! ones held up by an APU decision, or prints `complete` when nothing is
//! outstanding.

use std::fmt::Write;

use foilstatus_core::{ComplaintSet, OfficerRef, Report, Warning};

const PROFILE_BASE: &str = "https://50-a.org";
const INDENT: &str = "   ";

// ── Public API ──

/// Render the full report.
pub fn render_report(report: &Report, generated_at: &str) -> String {
    let mut out = String::new();
    writeln!(out, "Report generated {generated_at}").ok();
    render_summary(&mut out, report);
    out.push('\n');
    render_officers(&mut out, report);
    out.push('\n');
    render_foils(&mut out, report);
    out
}

/// Render only the roster rows that failed to match an officer.
pub fn render_unmatched(report: &Report) -> String {
    let mut out = String::new();
    let mut count = 0usize;
    for warning in report.diagnostics.warnings() {
        if let Warning::UnresolvedRecord { record, error } = warning {
            count += 1;
            writeln!(
                out,
                "{}, {} shield={} foil={} requester={}",
                record.last_name,
                record.first_name,
                record.shield_no.as_deref().unwrap_or("-"),
                record.foil_id.as_deref().unwrap_or("-"),
                record.requester.as_deref().unwrap_or("-"),
            )
            .ok();
            writeln!(out, "{INDENT}{error}").ok();
        }
    }
    if count == 0 {
        out.push_str("all roster rows matched\n");
    }
    out
}

// ── Sections ──

fn render_summary(out: &mut String, report: &Report) {
    let s = &report.summary;
    writeln!(out, "Officers requested: {}", s.officers).ok();
    writeln!(out, "Complaints for officers requested: {}", s.requested).ok();
    writeln!(out, "Complaints for officers remaining: {}", s.remaining).ok();
    writeln!(out, "Complaints remaining, pending APU decision: {}", s.pending).ok();
    writeln!(out, "Complaint Closing Reports received: {}", s.received).ok();
    writeln!(out, "FOIL requests: {}", s.foils).ok();
    if !report.diagnostics.is_empty() {
        writeln!(out, "Warnings: {}", report.diagnostics.len()).ok();
    }
}

fn render_officers(out: &mut String, report: &Report) {
    writeln!(out, "OFFICER STATUS:").ok();
    for status in &report.officers {
        writeln!(out, "{}", officer_line(&status.officer)).ok();
        render_complaints(out, &status.complaints);
    }
}

fn render_foils(out: &mut String, report: &Report) {
    writeln!(out, "FOIL STATUS:").ok();
    for foil in &report.foils {
        let mut header = foil.foil_id.clone();
        if let Some(submitted) = &foil.submitted_date {
            write!(header, " submitted {submitted}").ok();
        }
        if let Some(deadline) = &foil.deadline_date {
            write!(header, " deadline {deadline}").ok();
        }
        writeln!(out, "{header}").ok();
        for officer in &foil.officers {
            writeln!(out, "{INDENT}{}", officer_line(officer)).ok();
        }
        render_complaints(out, &foil.complaints);
    }
}

fn render_complaints(out: &mut String, set: &ComplaintSet) {
    if !set.received.is_empty() {
        writeln!(out, "received:").ok();
        for c in &set.received {
            writeln!(out, "{INDENT}{}", c.complaint_id).ok();
        }
    }

    if set.completed {
        writeln!(out, "complete").ok();
        return;
    }

    writeln!(out, "waiting:").ok();
    for c in &set.waiting {
        if c.pending {
            writeln!(out, "{INDENT}{} pending-apu", c.complaint_id).ok();
        } else {
            writeln!(out, "{INDENT}{}", c.complaint_id).ok();
        }
    }
}

// ── Formatting helpers ──

fn officer_line(officer: &OfficerRef) -> String {
    format!(
        "{}, {} {PROFILE_BASE}/{}",
        officer.last_name, officer.first_name, officer.officer_id
    )
}
