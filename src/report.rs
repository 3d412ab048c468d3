//! Rendering of a [`Comparison`] for people and for machines.

use itertools::Itertools;
use std::fmt::Write;

use crate::compare::{Comparison, StrategyResult};
use crate::data::ClinicInput;

/// Renders the comparison as the plain-text report printed by the CLI.
pub fn render_text(clinic: &ClinicInput, comparison: &Comparison) -> String {
    let mut out = String::new();
    // fmt::Write for String never returns an error
    write_report(&mut out, clinic, comparison).expect("writing to a String cannot fail");
    out
}

pub fn render_json(comparison: &Comparison) -> serde_json::Result<String> {
    serde_json::to_string_pretty(comparison)
}

fn write_report(
    out: &mut String,
    clinic: &ClinicInput,
    comparison: &Comparison,
) -> std::fmt::Result {
    writeln!(out, "Status: {}", comparison.status)?;
    write_strategy(out, clinic, &comparison.optimal)?;
    write_strategy(out, clinic, &comparison.manual)?;

    writeln!(out, "\nComparison summary:")?;
    for result in [&comparison.optimal, &comparison.manual] {
        writeln!(out, "Total unmet ({}): {}", result.label, result.total())?;
    }
    writeln!(out, "{}", comparison.verdict.sentence())
}

fn write_strategy(
    out: &mut String,
    clinic: &ClinicInput,
    result: &StrategyResult,
) -> std::fmt::Result {
    writeln!(out, "\nStaff schedule ({}):", result.label)?;
    for professional in &clinic.professionals {
        let shifts = result.schedule.ordered_shifts(clinic, &professional.id);
        writeln!(
            out,
            "{} ({}): [{}]",
            professional.id,
            professional.kind,
            shifts.iter().join(", ")
        )?;
    }

    if !result.violations.is_empty() {
        writeln!(out, "\nConstraint violations ({}):", result.label)?;
        for violation in &result.violations {
            writeln!(out, "{}", violation)?;
        }
    }

    writeln!(out, "\nUnmet demand per shift ({}):", result.label)?;
    for entry in result.shortfall.unmet_entries() {
        writeln!(
            out,
            "Shift {} - {}: {} patients unmet",
            entry.shift, entry.professional_type, entry.unmet
        )?;
    }
    writeln!(out, "\nTotal unmet patients ({}): {}", result.label, result.total())
}
