//! Scores any schedule against the demand table.

use serde::Serialize;

use crate::data::{ClinicInput, ProfessionalType, Schedule, ShiftId};

/// Coverage of one type in one shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortfallEntry {
    pub shift: ShiftId,
    pub professional_type: ProfessionalType,
    pub demand: u32,
    pub served: u32,
    /// `max(0, demand - served)`
    pub unmet: u32,
}

/// Unmet demand of a schedule, one entry per shift and type in shift order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    entries: Vec<ShortfallEntry>,
    total: u64,
}

impl Shortfall {
    pub fn entries(&self) -> &[ShortfallEntry] {
        &self.entries
    }

    /// Entries that leave patients without care.
    pub fn unmet_entries(&self) -> impl Iterator<Item = &ShortfallEntry> {
        self.entries.iter().filter(|entry| entry.unmet > 0)
    }

    pub fn total(&self) -> u64 {
        self.total
    }
}

/// Computes the unmet demand of `schedule`.
///
/// Served patients of a type in a shift are the capacity of that type times
/// the number of rostered professionals of the type working the shift.
/// Schedule entries for ids missing from the roster contribute nothing.
pub fn evaluate(clinic: &ClinicInput, schedule: &Schedule) -> Shortfall {
    let mut entries = Vec::with_capacity(clinic.shifts.len() * ProfessionalType::ALL.len());
    for shift in &clinic.shifts {
        for kind in ProfessionalType::ALL {
            let working = clinic
                .professionals
                .iter()
                .filter(|p| p.kind == kind && schedule.works(&p.id, shift))
                .count() as u32;
            let served = working.saturating_mul(clinic.capacity(kind));
            let demand = clinic.demand(shift, kind);
            entries.push(ShortfallEntry {
                shift: shift.clone(),
                professional_type: kind,
                demand,
                served,
                unmet: demand.saturating_sub(served),
            });
        }
    }
    let total = entries.iter().map(|entry| u64::from(entry.unmet)).sum();
    Shortfall { entries, total }
}
