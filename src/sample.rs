//! Built-in clinic: one week of 12 shifts (6 days, 2 shifts a day).

use std::collections::BTreeMap;

use crate::data::{
    ClinicInput, CompareRequest, ManualPolicy, Professional, ProfessionalType, Schedule,
};
use crate::solver::SolverOptions;

const ROOMS_PER_SHIFT: u32 = 5;

// (shift, generalist, specialist A, specialist B)
const DEMAND: [(&str, u32, u32, u32); 12] = [
    ("T1", 10, 3, 2),
    ("T2", 18, 4, 2),
    ("T3", 12, 5, 4),
    ("T4", 20, 7, 3),
    ("T5", 13, 5, 2),
    ("T6", 15, 6, 3),
    ("T7", 14, 5, 1),
    ("T8", 19, 8, 4),
    ("T9", 11, 3, 3),
    ("T10", 16, 4, 2),
    ("T11", 17, 6, 4),
    ("T12", 12, 4, 3),
];

const ROSTER: [(&str, ProfessionalType, u32); 10] = [
    ("PS1", ProfessionalType::Generalist, 6),
    ("PS2", ProfessionalType::Generalist, 6),
    ("PS3", ProfessionalType::Generalist, 6),
    ("PS4", ProfessionalType::Generalist, 6),
    ("PS5", ProfessionalType::Generalist, 6),
    ("PQ1", ProfessionalType::SpecialistA, 4),
    ("PQ2", ProfessionalType::SpecialistA, 4),
    ("PQ3", ProfessionalType::SpecialistA, 4),
    ("PA1", ProfessionalType::SpecialistB, 3),
    ("PA2", ProfessionalType::SpecialistB, 3),
];

const MANUAL: [(&str, &[&str]); 10] = [
    ("PS1", &["T1", "T2", "T5", "T6", "T9", "T10"]),
    ("PS2", &["T3", "T4", "T7", "T8", "T11", "T12"]),
    ("PS3", &["T1", "T3", "T5", "T7", "T9", "T11"]),
    ("PS4", &["T2", "T4", "T6", "T8", "T10", "T12"]),
    ("PS5", &["T1", "T2", "T3", "T10", "T11", "T12"]),
    ("PQ1", &["T1", "T2", "T3", "T4"]),
    ("PQ2", &["T5", "T6", "T7", "T8"]),
    ("PQ3", &["T9", "T10", "T11", "T12"]),
    ("PA1", &["T1", "T3", "T5"]),
    ("PA2", &["T7", "T9", "T11"]),
];

pub fn clinic() -> ClinicInput {
    ClinicInput {
        shifts: DEMAND.iter().map(|(shift, ..)| shift.to_string()).collect(),
        professionals: ROSTER
            .iter()
            .map(|&(id, kind, availability)| Professional {
                id: id.to_string(),
                kind,
                availability,
            })
            .collect(),
        capacity_per_assignment: BTreeMap::from([
            (ProfessionalType::Generalist, 3),
            (ProfessionalType::SpecialistA, 4),
            (ProfessionalType::SpecialistB, 2),
        ]),
        demand: DEMAND
            .iter()
            .map(|&(shift, generalist, specialist_a, specialist_b)| {
                (
                    shift.to_string(),
                    BTreeMap::from([
                        (ProfessionalType::Generalist, generalist),
                        (ProfessionalType::SpecialistA, specialist_a),
                        (ProfessionalType::SpecialistB, specialist_b),
                    ]),
                )
            })
            .collect(),
        rooms_per_shift: ROOMS_PER_SHIFT,
        room_overrides: BTreeMap::new(),
    }
}

/// The hand-written schedule the optimizer is measured against.
pub fn manual_schedule() -> Schedule {
    MANUAL
        .iter()
        .map(|&(id, shifts)| (id, shifts.iter().copied()))
        .collect()
}

pub fn request() -> CompareRequest {
    CompareRequest {
        clinic: clinic(),
        manual_schedule: manual_schedule(),
        manual_policy: ManualPolicy::default(),
        options: SolverOptions::default(),
    }
}
