/*
    Syzygy, rendezvous guidance and control in the three-body problem
    Copyright (C) 2023-onwards The Syzygy Developers

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::cosmic::{Cr3bpSystem, RendezvousState};
use crate::ctrl::{
    continuous_gain, discrete_gain, ControlError, ControlLaw, FeedbackGain, RegulatorConfig,
};
use crate::dynamics::{Linearization, RendezvousDynamics};
use crate::linalg::Vector3;
use crate::propagators::Propagator;
use crate::time::{Duration, Unit};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use typed_builder::TypedBuilder;

/// Options of a closed-loop rendezvous run.
#[derive(Clone, Copy, Debug, TypedBuilder)]
#[builder(doc)]
pub struct SimOpts {
    /// Guidance step: the gain is applied as a zero order hold over this span
    #[builder(default = 60.0 * Unit::Second)]
    pub step: Duration,
    /// The run converges when the relative state norm drops below this
    #[builder(default = 1e-6)]
    pub convergence_tol: f64,
    /// The run diverges when the relative state norm exceeds this
    #[builder(default = 10.0)]
    pub divergence_ceiling: f64,
    /// The run diverges after this many consecutive error increases. The
    /// default leaves room for the transient of a rest-to-rest maneuver, where
    /// the velocity buildup grows the error norm for a while
    #[builder(default = 1000)]
    pub max_growth_steps: usize,
}

impl Default for SimOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// How a closed-loop run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The relative state norm dropped below the convergence tolerance
    Converged,
    /// The relative state norm exceeded the ceiling or grew for too long
    Diverged,
    /// A guidance step failed, the report stores the reason
    StepFailed,
    /// The horizon elapsed without a convergence or divergence verdict
    HorizonReached,
    /// The caller requested a stop between two guidance steps
    Cancelled,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Converged => write!(f, "converged"),
            Self::Diverged => write!(f, "diverged"),
            Self::StepFailed => write!(f, "step failed"),
            Self::HorizonReached => write!(f, "horizon reached"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The report of a closed-loop run: the outcome, the error trace sampled at
/// every guidance step (initial error first), and the final state.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub error_trace: Vec<f64>,
    pub final_state: RendezvousState,
    pub steps: usize,
    /// The step failure which ended the run, when the outcome is `StepFailed`
    pub failure: Option<ControlError>,
}

impl RunReport {
    pub fn final_error(&self) -> f64 {
        // The trace always holds at least the initial error
        *self.error_trace.last().unwrap()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} after {} steps, |e| = {:.3e}",
            self.outcome,
            self.steps,
            self.final_error()
        )
    }
}

/// The closed-loop rendezvous simulator.
///
/// Each guidance step re-linearizes the plant at the instantaneous target
/// position, synthesizes the gain when the law demands it, and holds the
/// resulting acceleration command while the coupled dynamics are integrated
/// over the step.
#[derive(Clone, Debug)]
pub struct RendezvousSimulator {
    pub system: Cr3bpSystem,
    pub model: Linearization,
    pub law: ControlLaw,
    pub config: RegulatorConfig,
    pub opts: SimOpts,
}

impl RendezvousSimulator {
    pub fn new(
        system: Cr3bpSystem,
        model: Linearization,
        law: ControlLaw,
        config: RegulatorConfig,
        opts: SimOpts,
    ) -> Self {
        Self {
            system,
            model,
            law,
            config,
            opts,
        }
    }

    /// Runs the closed loop until convergence, divergence, a step failure, or
    /// the horizon.
    ///
    /// A synthesis failure of a static law aborts the run with an error since
    /// no gain ever existed. Failures inside the loop instead end the run with
    /// a [`RunOutcome::StepFailed`] report carrying the reason: the error
    /// trace accumulated so far remains usable.
    pub fn run(
        &self,
        initial: RendezvousState,
        horizon: Duration,
    ) -> Result<RunReport, ControlError> {
        self.run_with_cancellation(initial, horizon, &AtomicBool::new(false))
    }

    /// Same as [`Self::run`], polling `cancel` between guidance steps. The
    /// state never reflects a partial step: cancellation takes effect at the
    /// next step boundary.
    pub fn run_with_cancellation(
        &self,
        initial: RendezvousState,
        horizon: Duration,
        cancel: &AtomicBool,
    ) -> Result<RunReport, ControlError> {
        info!(
            "Running {} with the {} model for {horizon} (step {})",
            self.law, self.model, self.opts.step
        );
        let mut state = initial;
        let mut error_trace = vec![state.error_norm()];
        let static_gain = if self.law.is_static() {
            Some(self.synthesize(&state.target.position)?)
        } else {
            None
        };

        let coasting = RendezvousDynamics::new(self.system, self.model);
        let mut elapsed = Duration::ZERO;
        let mut steps = 0_usize;
        let mut growth_count = 0_usize;
        let mut outcome = RunOutcome::HorizonReached;
        let mut failure: Option<ControlError> = None;

        while elapsed < horizon {
            if cancel.load(Ordering::Relaxed) {
                outcome = RunOutcome::Cancelled;
                break;
            }
            let gain = match &static_gain {
                Some(gain) => gain.clone(),
                None => match self.synthesize(&state.target.position) {
                    Ok(gain) => gain,
                    Err(reason) => {
                        outcome = RunOutcome::StepFailed;
                        failure = Some(reason);
                        break;
                    }
                },
            };
            let command = gain.control(&state.regulator_vector());
            let dt = if horizon - elapsed < self.opts.step {
                horizon - elapsed
            } else {
                self.opts.step
            };
            let thrusting = coasting.with_control(command);
            let setup = Propagator::rk4(&thrusting, dt);
            let mut prop = setup.with(state);
            match prop.for_duration(dt) {
                Ok(next) => state = next,
                Err(reason) => {
                    outcome = RunOutcome::StepFailed;
                    failure = Some(reason.into());
                    break;
                }
            }
            elapsed += dt;
            steps += 1;

            let error = state.error_norm();
            let previous = *error_trace.last().unwrap();
            error_trace.push(error);
            if error <= self.opts.convergence_tol {
                outcome = RunOutcome::Converged;
                break;
            }
            if error > self.opts.divergence_ceiling {
                outcome = RunOutcome::Diverged;
                break;
            }
            if error > previous {
                growth_count += 1;
                if growth_count >= self.opts.max_growth_steps {
                    outcome = RunOutcome::Diverged;
                    break;
                }
            } else {
                growth_count = 0;
            }
        }

        let report = RunReport {
            outcome,
            error_trace,
            final_state: state,
            steps,
            failure,
        };
        info!("{report}");
        Ok(report)
    }

    /// Synthesizes the gain of the configured law at the provided target
    /// position.
    fn synthesize(&self, target_position: &Vector3<f64>) -> Result<FeedbackGain, ControlError> {
        if self.law.is_discrete() {
            let step_tu = self.opts.step.to_seconds() / self.system.time_unit_s;
            discrete_gain(
                &self.model,
                &self.system,
                target_position,
                &self.config,
                step_tu,
            )
        } else {
            continuous_gain(&self.model, &self.system, target_position, &self.config)
        }
    }
}
