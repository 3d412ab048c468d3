//! Runs both scheduling strategies and decides which one serves more patients.

use log::{info, warn};
use serde::Serialize;
use std::cmp::Ordering;

use crate::data::{CompareRequest, ManualPolicy, Schedule, ScheduleViolation};
use crate::error::{SchedulerError, SchedulerResult};
use crate::evaluator::{Shortfall, evaluate};
use crate::solver::{SolverStatus, optimize};

/// Outcome of comparing the two totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Verdict {
    OptimalBetter,
    ManualBetter,
    Tie,
}

impl Verdict {
    pub fn sentence(self) -> &'static str {
        match self {
            Verdict::OptimalBetter => {
                "The optimal schedule serves more patients than the manual one."
            }
            Verdict::ManualBetter => {
                "The manual schedule serves more patients than the optimal one (check its constraints)."
            }
            Verdict::Tie => "Both schedules serve the same number of patients.",
        }
    }
}

/// Lower unmet total wins; equal totals tie.
pub fn verdict(optimal_total: u64, manual_total: u64) -> Verdict {
    match optimal_total.cmp(&manual_total) {
        Ordering::Less => Verdict::OptimalBetter,
        Ordering::Greater => Verdict::ManualBetter,
        Ordering::Equal => Verdict::Tie,
    }
}

/// One scored schedule.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub label: String,
    pub schedule: Schedule,
    pub shortfall: Shortfall,
    /// Availability or room-cap breaches; always empty for the optimizer.
    pub violations: Vec<ScheduleViolation>,
}

impl StrategyResult {
    fn score(label: &str, request: &CompareRequest, schedule: Schedule) -> Self {
        let shortfall = evaluate(&request.clinic, &schedule);
        let violations = schedule.violations(&request.clinic);
        StrategyResult {
            label: label.to_string(),
            schedule,
            shortfall,
            violations,
        }
    }

    pub fn total(&self) -> u64 {
        self.shortfall.total()
    }
}

/// Everything the report is rendered from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub status: SolverStatus,
    pub optimal: StrategyResult,
    pub manual: StrategyResult,
    pub verdict: Verdict,
}

/// Accepts a proven optimum, warns on a solve cut short by a configured time
/// or gap limit, and fails on anything without an assignment.
fn check_status(status: SolverStatus) -> SchedulerResult<()> {
    match status {
        SolverStatus::Optimal => Ok(()),
        SolverStatus::TimeLimit | SolverStatus::GapLimit => {
            warn!("Solver stopped with status {}; schedule may not be optimal", status);
            Ok(())
        }
        SolverStatus::Infeasible | SolverStatus::Unbounded | SolverStatus::NotSolved => {
            Err(SchedulerError::Solver {
                status,
                message: "solver returned without a usable assignment".to_string(),
            })
        }
    }
}

/// Validates the request, solves it and scores both schedules.
///
/// Fails before any scoring if the tables or the manual schedule reference
/// undefined keys, if the solver produces no solution, or if the manual
/// schedule breaks a hard constraint under [`ManualPolicy::Reject`].
pub fn run(request: &CompareRequest) -> SchedulerResult<Comparison> {
    request.clinic.validate()?;
    request.manual_schedule.validate_references(&request.clinic)?;

    let manual_violations = request.manual_schedule.violations(&request.clinic);
    if !manual_violations.is_empty() {
        match request.manual_policy {
            ManualPolicy::Reject => {
                return Err(SchedulerError::ManualRejected {
                    count: manual_violations.len(),
                    first: manual_violations[0].to_string(),
                });
            }
            ManualPolicy::Report => {
                for violation in &manual_violations {
                    warn!("Manual schedule: {}", violation);
                }
            }
        }
    }

    let optimized = optimize(&request.clinic, &request.options)?;
    check_status(optimized.status)?;

    let optimal = StrategyResult::score("optimal", request, optimized.schedule);
    if (optimized.objective - optimal.total() as f64).abs() > 1e-6 {
        warn!(
            "Solver objective {} differs from evaluated shortfall {}",
            optimized.objective,
            optimal.total()
        );
    }
    let manual = StrategyResult::score("manual", request, request.manual_schedule.clone());
    let verdict = verdict(optimal.total(), manual.total());
    info!(
        "Unmet patients: optimal {}, manual {} ({:?})",
        optimal.total(),
        manual.total(),
        verdict
    );

    Ok(Comparison {
        status: optimized.status,
        optimal,
        manual,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample;

    #[test]
    fn lower_total_wins() {
        assert_eq!(verdict(121, 123), Verdict::OptimalBetter);
        assert_eq!(verdict(10, 3), Verdict::ManualBetter);
        assert_eq!(verdict(0, 0), Verdict::Tie);
    }

    #[test]
    fn verdict_needs_exact_equality_for_tie() {
        assert_ne!(verdict(5, 6), Verdict::Tie);
        assert_ne!(verdict(6, 5), Verdict::Tie);
    }

    #[test]
    fn statuses_without_assignment_fail_the_run() {
        for status in [
            SolverStatus::Infeasible,
            SolverStatus::Unbounded,
            SolverStatus::NotSolved,
        ] {
            let err = check_status(status).unwrap_err();
            assert!(matches!(err, SchedulerError::Solver { status: s, .. } if s == status));
        }
    }

    #[test]
    fn limited_solves_are_still_reported() {
        check_status(SolverStatus::Optimal).unwrap();
        check_status(SolverStatus::TimeLimit).unwrap();
        check_status(SolverStatus::GapLimit).unwrap();
    }

    #[test]
    fn sample_comparison_prefers_optimal() {
        let comparison = run(&sample::request()).unwrap();
        assert_eq!(comparison.status, SolverStatus::Optimal);
        assert_eq!(comparison.manual.total(), 123);
        assert!(comparison.optimal.total() <= comparison.manual.total());
        assert_eq!(comparison.verdict, Verdict::OptimalBetter);
        assert!(comparison.optimal.violations.is_empty());
        assert!(comparison.manual.violations.is_empty());
    }

    #[test]
    fn infeasible_manual_schedule_is_reported() {
        let mut request = sample::request();
        request.manual_schedule.assign("PA1", "T2");
        let comparison = run(&request).unwrap();
        assert_eq!(
            comparison.manual.violations,
            vec![ScheduleViolation::Availability {
                professional: "PA1".into(),
                assigned: 4,
                availability: 3,
            }]
        );
    }

    #[test]
    fn infeasible_manual_schedule_can_be_rejected() {
        let mut request = sample::request();
        request.manual_policy = ManualPolicy::Reject;
        for id in ["PQ2", "PQ3"] {
            request.manual_schedule.assign(id, "T1");
        }
        let err = run(&request).unwrap_err();
        // PQ2 and PQ3 exceed availability and T1 exceeds its rooms
        assert!(matches!(err, SchedulerError::ManualRejected { count: 3, .. }));
    }

    #[test]
    fn unknown_manual_professional_fails_before_solving() {
        let mut request = sample::request();
        request.manual_schedule.assign("XX9", "T1");
        let err = run(&request).unwrap_err();
        assert!(matches!(err, SchedulerError::Config { ref key, .. } if key == "XX9"));
    }

    #[test]
    fn invalid_clinic_fails_before_solving() {
        let mut request = sample::request();
        request.clinic.demand.insert("T99".into(), Default::default());
        let err = run(&request).unwrap_err();
        assert!(matches!(err, SchedulerError::Config { ref key, .. } if key == "T99"));
    }
}
