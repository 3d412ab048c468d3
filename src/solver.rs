//! MILP model of the staffing problem, solved with HiGHS.

use crate::data::{ClinicInput, ProfessionalType, Schedule};
use crate::error::{SchedulerError, SchedulerResult};
use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolutionStatus, SolverModel,
    Variable, constraint, default_solver,
};
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

/// Solved binaries at or above this value count as "works this shift".
pub const ASSIGNED_THRESHOLD: f64 = 0.5;

/// Knobs passed through to HiGHS.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolverOptions {
    pub threads: i32,
    pub random_seed: i32,
    pub log_to_console: bool,
    /// Relative MIP gap at which HiGHS may stop; 0 requires proven optimality.
    pub mip_rel_gap: f64,
    /// Safety valve for larger rosters; `None` solves to proven optimality.
    pub time_limit_secs: Option<f64>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            threads: 1,        // limit to 1 thread for reproducibility
            random_seed: 1234, // set seed for reproducibility
            log_to_console: false,
            mip_rel_gap: 0.0,
            time_limit_secs: None,
        }
    }
}

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    Optimal,
    TimeLimit,
    GapLimit,
    Infeasible,
    Unbounded,
    NotSolved,
}

impl SolverStatus {
    /// Whether the solver handed back an assignment we can read.
    pub fn has_solution(self) -> bool {
        matches!(
            self,
            SolverStatus::Optimal | SolverStatus::TimeLimit | SolverStatus::GapLimit
        )
    }
}

impl fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverStatus::Optimal => "Optimal",
            SolverStatus::TimeLimit => "TimeLimit",
            SolverStatus::GapLimit => "GapLimit",
            SolverStatus::Infeasible => "Infeasible",
            SolverStatus::Unbounded => "Unbounded",
            SolverStatus::NotSolved => "NotSolved",
        };
        f.write_str(name)
    }
}

/// The schedule picked by the solver.
#[derive(Debug, Clone)]
pub struct OptimizedSchedule {
    pub status: SolverStatus,
    pub schedule: Schedule,
    /// Sum of the shortfall variables at the solution.
    pub objective: f64,
}

/// Finds the schedule with the least unmet demand using the HiGHS MILP solver.
///
/// `clinic` must already have passed [`ClinicInput::validate`].
pub fn optimize(
    clinic: &ClinicInput,
    options: &SolverOptions,
) -> SchedulerResult<OptimizedSchedule> {
    let start_time = Instant::now();
    info!(
        "Setting up MILP model with {} professionals and {} shifts...",
        clinic.professionals.len(),
        clinic.shifts.len()
    );
    let mut problem = ProblemVariables::new();

    // x_ps = 1 if professional p works shift s
    //        0 otherwise
    let works: Vec<Vec<Variable>> = clinic
        .professionals
        .iter()
        .map(|_| problem.add_vector(variable().binary(), clinic.shifts.len()))
        .collect();

    // short_ks >= 0 absorbs the demand of type k in shift s that nobody covers.
    // No upper bound, so the model stays feasible whatever the demand.
    let mut shortfall_vars: BTreeMap<(ProfessionalType, usize), Variable> = BTreeMap::new();
    for kind in ProfessionalType::ALL {
        for s in 0..clinic.shifts.len() {
            shortfall_vars.insert((kind, s), problem.add(variable().min(0)));
        }
    }
    trace!(
        "Generated {} assignment variables and {} shortfall variables.",
        clinic.professionals.len() * clinic.shifts.len(),
        shortfall_vars.len()
    );

    let objective: Expression = shortfall_vars.values().copied().sum();

    let mut model = problem
        .minimise(objective)
        .using(default_solver)
        .set_option("threads", options.threads)
        .set_option("random_seed", options.random_seed)
        .set_option("mip_rel_gap", options.mip_rel_gap)
        .set_option("log_to_console", options.log_to_console);
    if let Some(limit) = options.time_limit_secs {
        debug!("Solver time limit set to {}s", limit);
        model = model.set_option("time_limit", limit);
    }

    info!("Adding coverage constraints...");
    for kind in ProfessionalType::ALL {
        let capacity = f64::from(clinic.capacity(kind));
        for (s, shift) in clinic.shifts.iter().enumerate() {
            let served: Expression = clinic
                .professionals
                .iter()
                .zip(&works)
                .filter(|(professional, _)| professional.kind == kind)
                .map(|(_, row)| capacity * row[s])
                .sum();
            let short = shortfall_vars[&(kind, s)];
            let demand = f64::from(clinic.demand(shift, kind));
            model.add_constraint(constraint!(served + short >= demand));
        }
    }

    info!("Adding availability constraints...");
    for (professional, row) in clinic.professionals.iter().zip(&works) {
        let assigned: Expression = row.iter().copied().sum();
        let availability = f64::from(professional.availability);
        model.add_constraint(constraint!(assigned <= availability));
    }

    info!("Adding room capacity constraints...");
    for (s, shift) in clinic.shifts.iter().enumerate() {
        let staffed: Expression = works.iter().map(|row| row[s]).sum();
        let rooms = f64::from(clinic.rooms_for(shift));
        model.add_constraint(constraint!(staffed <= rooms));
    }

    //solve
    info!("Starting MILP solver...");
    let solution = match model.solve() {
        Ok(s) => s,
        Err(e) => {
            let status = status_of_error(&e);
            warn!("Solver failed with status {}: {}", status, e);
            return Err(SchedulerError::Solver {
                status,
                message: e.to_string(),
            });
        }
    };
    let status = status_of_solution(solution.status());
    info!("Solution with status {} found in {:.2?}", status, start_time.elapsed());

    // get assignments from solution
    let mut schedule = Schedule::new();
    for (professional, row) in clinic.professionals.iter().zip(&works) {
        for (shift, var) in clinic.shifts.iter().zip(row) {
            if solution.value(*var) >= ASSIGNED_THRESHOLD {
                schedule.assign(professional.id.as_str(), shift.as_str());
            }
        }
    }

    let objective = shortfall_vars
        .values()
        .map(|var| solution.value(*var))
        .sum::<f64>();
    debug!("Objective value: {}", objective);

    Ok(OptimizedSchedule {
        status,
        schedule,
        objective,
    })
}

fn status_of_solution(status: SolutionStatus) -> SolverStatus {
    match status {
        SolutionStatus::Optimal => SolverStatus::Optimal,
        SolutionStatus::TimeLimit => SolverStatus::TimeLimit,
        SolutionStatus::GapLimit => SolverStatus::GapLimit,
    }
}

fn status_of_error(error: &ResolutionError) -> SolverStatus {
    match error {
        ResolutionError::Infeasible => SolverStatus::Infeasible,
        ResolutionError::Unbounded => SolverStatus::Unbounded,
        _ => SolverStatus::NotSolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Professional;
    use crate::evaluator::evaluate;
    use crate::sample;

    fn single_shift_clinic(demand: u32, availability: u32, rooms: u32) -> ClinicInput {
        ClinicInput {
            shifts: vec!["T1".into()],
            professionals: vec![Professional {
                id: "G1".into(),
                kind: ProfessionalType::Generalist,
                availability,
            }],
            capacity_per_assignment: BTreeMap::from([(ProfessionalType::Generalist, 3)]),
            demand: BTreeMap::from([(
                "T1".to_string(),
                BTreeMap::from([(ProfessionalType::Generalist, demand)]),
            )]),
            rooms_per_shift: rooms,
            room_overrides: BTreeMap::new(),
        }
    }

    fn optimal_total(clinic: &ClinicInput) -> u64 {
        let optimized = optimize(clinic, &SolverOptions::default()).unwrap();
        evaluate(clinic, &optimized.schedule).total()
    }

    #[test]
    fn default_options_are_reproducible() {
        let options = SolverOptions::default();
        assert_eq!(options.threads, 1);
        assert_eq!(options.random_seed, 1234);
        assert_eq!(options.mip_rel_gap, 0.0);
        assert_eq!(options.time_limit_secs, None);
    }

    #[test]
    fn options_fill_missing_fields_from_defaults() {
        let options: SolverOptions = serde_json::from_str(r#"{"timeLimitSecs": 2.5}"#).unwrap();
        assert_eq!(options.time_limit_secs, Some(2.5));
        assert_eq!(options.threads, 1);
        assert_eq!(options.mip_rel_gap, 0.0);
    }

    #[test]
    fn only_solved_statuses_carry_a_solution() {
        assert!(SolverStatus::Optimal.has_solution());
        assert!(SolverStatus::TimeLimit.has_solution());
        assert!(!SolverStatus::Infeasible.has_solution());
        assert!(!SolverStatus::NotSolved.has_solution());
    }

    #[test]
    fn single_professional_leaves_seven_unmet() {
        let clinic = single_shift_clinic(10, 1, 5);
        let optimized = optimize(&clinic, &SolverOptions::default()).unwrap();
        assert_eq!(optimized.status, SolverStatus::Optimal);
        assert!(optimized.schedule.works("G1", "T1"));
        assert_eq!(evaluate(&clinic, &optimized.schedule).total(), 7);
        assert!((optimized.objective - 7.0).abs() < 1e-6);
    }

    #[test]
    fn closed_shift_gets_nobody() {
        let mut clinic = sample::clinic();
        clinic.room_overrides.insert("T4".into(), 0);
        let optimized = optimize(&clinic, &SolverOptions::default()).unwrap();
        assert_eq!(optimized.schedule.staffed("T4"), 0);

        let shortfall = evaluate(&clinic, &optimized.schedule);
        for entry in shortfall.entries().iter().filter(|e| e.shift == "T4") {
            assert_eq!(entry.unmet, entry.demand);
        }
    }

    #[test]
    fn optimizer_respects_availability_and_rooms() {
        let clinic = sample::clinic();
        let optimized = optimize(&clinic, &SolverOptions::default()).unwrap();
        assert!(optimized.schedule.violations(&clinic).is_empty());
    }

    #[test]
    fn sample_clinic_optimum_is_121() {
        assert_eq!(optimal_total(&sample::clinic()), 121);
    }

    #[test]
    fn resolving_gives_the_same_total() {
        let clinic = sample::clinic();
        assert_eq!(optimal_total(&clinic), optimal_total(&clinic));
    }

    #[test]
    fn more_availability_never_hurts() {
        let mut clinic = sample::clinic();
        let before = optimal_total(&clinic);
        clinic.professionals[5].availability += 3;
        let after = optimal_total(&clinic);
        assert!(after <= before, "{after} > {before}");
    }

    #[test]
    fn zero_demand_needs_no_staff() {
        let clinic = single_shift_clinic(0, 1, 5);
        assert_eq!(optimal_total(&clinic), 0);
    }

    #[test]
    fn time_limit_still_returns_a_schedule() {
        let options = SolverOptions {
            time_limit_secs: Some(30.0),
            ..SolverOptions::default()
        };
        let optimized = optimize(&sample::clinic(), &options).unwrap();
        assert!(optimized.status.has_solution());
    }
}
