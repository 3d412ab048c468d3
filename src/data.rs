//! Input tables, schedules and their validation.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::error::{SchedulerError, SchedulerResult};
use crate::solver::SolverOptions;

// Type aliases for clarity
pub type ProfessionalId = String;
pub type ShiftId = String;

/// The kinds of professional the clinic staffs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalType {
    Generalist,
    SpecialistA,
    SpecialistB,
}

impl ProfessionalType {
    pub const ALL: [ProfessionalType; 3] = [
        ProfessionalType::Generalist,
        ProfessionalType::SpecialistA,
        ProfessionalType::SpecialistB,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProfessionalType::Generalist => "generalist",
            ProfessionalType::SpecialistA => "specialist_a",
            ProfessionalType::SpecialistB => "specialist_b",
        }
    }
}

impl fmt::Display for ProfessionalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A professional on the roster and the most shifts they may work.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Professional {
    pub id: ProfessionalId,
    #[serde(rename = "type")]
    pub kind: ProfessionalType,
    pub availability: u32,
}

/// The static tables of one scheduling run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicInput {
    /// Shift ids in schedule order.
    pub shifts: Vec<ShiftId>,
    pub professionals: Vec<Professional>,
    /// Patients one professional of a type handles per shift worked.
    pub capacity_per_assignment: BTreeMap<ProfessionalType, u32>,
    /// Patients per shift and type; missing entries mean no demand.
    #[serde(default)]
    pub demand: BTreeMap<ShiftId, BTreeMap<ProfessionalType, u32>>,
    /// Rooms available in every shift.
    pub rooms_per_shift: u32,
    /// Shifts whose room count differs from `rooms_per_shift`.
    #[serde(default)]
    pub room_overrides: BTreeMap<ShiftId, u32>,
}

impl ClinicInput {
    pub fn demand(&self, shift: &str, kind: ProfessionalType) -> u32 {
        self.demand
            .get(shift)
            .and_then(|by_type| by_type.get(&kind))
            .copied()
            .unwrap_or(0)
    }

    pub fn capacity(&self, kind: ProfessionalType) -> u32 {
        self.capacity_per_assignment.get(&kind).copied().unwrap_or(0)
    }

    pub fn rooms_for(&self, shift: &str) -> u32 {
        self.room_overrides
            .get(shift)
            .copied()
            .unwrap_or(self.rooms_per_shift)
    }

    pub fn professional(&self, id: &str) -> Option<&Professional> {
        self.professionals.iter().find(|p| p.id == id)
    }

    pub fn has_shift(&self, shift: &str) -> bool {
        self.shifts.iter().any(|s| s == shift)
    }

    /// Checks that every key the tables reference is defined.
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.shifts.is_empty() {
            return Err(SchedulerError::config("shifts", "at least one shift is required"));
        }
        if let Some(dup) = self.shifts.iter().duplicates().next() {
            return Err(SchedulerError::config(dup.as_str(), "duplicate shift id"));
        }
        if let Some(dup) = self.professionals.iter().map(|p| &p.id).duplicates().next() {
            return Err(SchedulerError::config(dup.as_str(), "duplicate professional id"));
        }

        let shift_set: HashSet<&str> = self.shifts.iter().map(String::as_str).collect();
        for shift in self.demand.keys() {
            if !shift_set.contains(shift.as_str()) {
                return Err(SchedulerError::config(
                    shift.as_str(),
                    "demand table references an undefined shift",
                ));
            }
        }
        for shift in self.room_overrides.keys() {
            if !shift_set.contains(shift.as_str()) {
                return Err(SchedulerError::config(
                    shift.as_str(),
                    "room override references an undefined shift",
                ));
            }
        }
        for professional in &self.professionals {
            if !self.capacity_per_assignment.contains_key(&professional.kind) {
                return Err(SchedulerError::config(
                    professional.kind.as_str(),
                    format!(
                        "no capacity per assignment defined for the type of '{}'",
                        professional.id
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Which professional works which shift.
///
/// Serialized as a map from professional id to the list of shifts worked.
/// Lists are kept as given so that repeated shifts can be reported by
/// [`Schedule::validate_references`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Schedule(BTreeMap<ProfessionalId, Vec<ShiftId>>);

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, professional: impl Into<String>, shift: impl Into<String>) {
        let shift = shift.into();
        let shifts = self.0.entry(professional.into()).or_default();
        if !shifts.contains(&shift) {
            shifts.push(shift);
        }
    }

    pub fn works(&self, professional: &str, shift: &str) -> bool {
        self.0
            .get(professional)
            .is_some_and(|shifts| shifts.iter().any(|s| s == shift))
    }

    /// Number of shifts assigned to a professional.
    pub fn load(&self, professional: &str) -> usize {
        self.0.get(professional).map_or(0, Vec::len)
    }

    /// Number of professionals assigned to a shift.
    pub fn staffed(&self, shift: &str) -> usize {
        self.0
            .values()
            .filter(|shifts| shifts.iter().any(|s| s == shift))
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProfessionalId, &Vec<ShiftId>)> {
        self.0.iter()
    }

    /// Shifts worked by `professional`, in the clinic's shift order.
    pub fn ordered_shifts<'a>(
        &self,
        clinic: &'a ClinicInput,
        professional: &str,
    ) -> Vec<&'a str> {
        clinic
            .shifts
            .iter()
            .filter(|shift| self.works(professional, shift))
            .map(String::as_str)
            .collect()
    }

    /// Fails on the first professional or shift id the clinic does not define,
    /// or on a shift listed twice for the same professional.
    pub fn validate_references(&self, clinic: &ClinicInput) -> SchedulerResult<()> {
        for (professional, shifts) in &self.0 {
            if clinic.professional(professional).is_none() {
                return Err(SchedulerError::config(
                    professional.as_str(),
                    "schedule references an undefined professional",
                ));
            }
            if let Some(shift) = shifts.iter().find(|s| !clinic.has_shift(s)) {
                return Err(SchedulerError::config(
                    shift.as_str(),
                    format!("schedule of '{}' references an undefined shift", professional),
                ));
            }
            if let Some(shift) = shifts.iter().duplicates().next() {
                return Err(SchedulerError::config(
                    shift.as_str(),
                    format!("shift listed more than once for '{}'", professional),
                ));
            }
        }
        Ok(())
    }

    /// Availability and room-cap breaches of this schedule.
    pub fn violations(&self, clinic: &ClinicInput) -> Vec<ScheduleViolation> {
        let mut violations = Vec::new();
        for professional in &clinic.professionals {
            let assigned = self.load(&professional.id);
            if assigned > professional.availability as usize {
                violations.push(ScheduleViolation::Availability {
                    professional: professional.id.clone(),
                    assigned,
                    availability: professional.availability,
                });
            }
        }
        for shift in &clinic.shifts {
            let staffed = self.staffed(shift);
            let rooms = clinic.rooms_for(shift);
            if staffed > rooms as usize {
                violations.push(ScheduleViolation::RoomCapacity {
                    shift: shift.clone(),
                    staffed,
                    rooms,
                });
            }
        }
        violations
    }
}

impl<P, S, I> FromIterator<(P, I)> for Schedule
where
    P: Into<String>,
    S: Into<String>,
    I: IntoIterator<Item = S>,
{
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut schedule = Schedule::new();
        for (professional, shifts) in iter {
            let professional = professional.into();
            // keep professionals with an empty list visible in the map
            let entry = schedule.0.entry(professional).or_default();
            entry.extend(shifts.into_iter().map(Into::into));
        }
        schedule
    }
}

/// A hard constraint that a schedule does not respect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScheduleViolation {
    Availability {
        professional: ProfessionalId,
        assigned: usize,
        availability: u32,
    },
    RoomCapacity {
        shift: ShiftId,
        staffed: usize,
        rooms: u32,
    },
}

impl fmt::Display for ScheduleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleViolation::Availability {
                professional,
                assigned,
                availability,
            } => write!(
                f,
                "[Availability] {} works {} shifts, availability is {}",
                professional, assigned, availability
            ),
            ScheduleViolation::RoomCapacity {
                shift,
                staffed,
                rooms,
            } => write!(
                f,
                "[Room Capacity] shift {} has {} professionals for {} rooms",
                shift, staffed, rooms
            ),
        }
    }
}

/// What to do with a manual schedule that breaks availability or room caps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ManualPolicy {
    /// Score it anyway and list the violations next to the result.
    #[default]
    Report,
    /// Abort the run.
    Reject,
}

/// The complete input for one optimal-versus-manual comparison.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub clinic: ClinicInput,
    pub manual_schedule: Schedule,
    #[serde(default)]
    pub manual_policy: ManualPolicy,
    #[serde(default)]
    pub options: SolverOptions,
}
