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

use crate::cosmic::State;
use crate::dynamics::Dynamics;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, OVector};
use crate::propagators::{
    ErrorCtrl, IntegrationDetails, PropDynamicsSnafu, PropagationError, Propagator,
};
use crate::time::{Duration, Epoch, Unit};
use snafu::ResultExt;

/// A `PropInstance` allows one to propagate a state, holding the integration
/// details of the latest step and the scratch space of the stages.
pub struct PropInstance<'a, D: Dynamics, E: ErrorCtrl + Default>
where
    DefaultAllocator: Allocator<<D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::Size, <D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::VecLength>,
{
    /// The state of this propagator instance
    pub state: D::StateType,
    /// The propagator setup (kind, stages, etc.)
    pub prop: &'a Propagator<'a, D, E>,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    pub(crate) step_size: Duration,
    pub(crate) fixed_step: bool,
    // Allows us to do pre-allocation of the ki vectors
    pub(crate) k: Vec<OVector<f64, <D::StateType as State>::VecLength>>,
}

impl<'a, D: Dynamics, E: ErrorCtrl + Default> PropInstance<'a, D, E>
where
    DefaultAllocator: Allocator<<D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::Size, <D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::VecLength>,
{
    /// Returns the details of the latest integration step.
    pub fn latest_details(&self) -> &IntegrationDetails {
        &self.details
    }

    /// This method propagates the provided Dynamics for the provided duration.
    pub fn for_duration(&mut self, duration: Duration) -> Result<D::StateType, PropagationError> {
        if duration == Duration::ZERO {
            return Ok(self.state);
        }
        let stop_time = self.state.epoch() + duration;
        if duration.abs() > 2 * Unit::Minute {
            info!("Propagating for {duration} until {stop_time}");
        }
        // Orient the step in the direction of the propagation
        if duration.is_negative() {
            self.step_size = -self.step_size.abs();
        } else {
            self.step_size = self.step_size.abs();
        }
        loop {
            let dt = stop_time - self.state.epoch();
            if dt == Duration::ZERO {
                return Ok(self.state);
            }
            if dt.abs() <= self.step_size.abs() {
                // Take one final step of exactly the remaining duration
                let prev_step_size = self.step_size;
                let prev_fixed = self.fixed_step;
                self.step_size = dt;
                self.fixed_step = true;
                self.single_step()?;
                self.step_size = prev_step_size;
                self.fixed_step = prev_fixed;
                return Ok(self.state);
            }
            self.single_step()?;
        }
    }

    /// Propagates until the provided epoch.
    pub fn until_epoch(&mut self, end_time: Epoch) -> Result<D::StateType, PropagationError> {
        let duration: Duration = end_time - self.state.epoch();
        self.for_duration(duration)
    }

    /// Take a single step of the configured step size, adapting it if the
    /// error control requires so.
    pub fn single_step(&mut self) -> Result<(), PropagationError> {
        let (t, state_vec) = self.derive()?;
        self.state.set(self.state.epoch() + t, &state_vec);
        self.state = self
            .prop
            .dynamics
            .finally(self.state)
            .context(PropDynamicsSnafu)?;
        Ok(())
    }

    /// This method integrates whichever function is provided as `d_xdt`.
    /// Returns the step taken and the new state vector.
    fn derive(
        &mut self,
    ) -> Result<(Duration, OVector<f64, <D::StateType as State>::VecLength>), PropagationError>
    {
        let state_vec = self.state.to_vector();
        let state_ctx = self.state;
        // Reset the number of attempts used
        self.details.attempts = 1;
        let sign = if self.step_size.is_negative() {
            -1.0
        } else {
            1.0
        };
        let mut step_size = self.step_size.to_seconds();
        loop {
            let ki = self
                .prop
                .dynamics
                .eom(0.0, &state_vec, &state_ctx)
                .context(PropDynamicsSnafu)?;
            self.k[0] = ki;
            let mut a_idx: usize = 0;
            for i in 0..(self.prop.stages - 1) {
                // Compute the c_i from the relevant row of A coefficients while
                // accumulating the weighted sum of the previous stages
                let mut ci: f64 = 0.0;
                let mut wi = OVector::<f64, <D::StateType as State>::VecLength>::zeros();
                for kj in &self.k[0..=i] {
                    let a_ij = self.prop.a_coeffs[a_idx];
                    ci += a_ij;
                    wi += a_ij * kj;
                    a_idx += 1;
                }
                let ki = self
                    .prop
                    .dynamics
                    .eom(ci * step_size, &(&state_vec + step_size * wi), &state_ctx)
                    .context(PropDynamicsSnafu)?;
                self.k[i + 1] = ki;
            }
            // Compute the next state and the error estimate
            let mut next_state = state_vec.clone();
            let mut error_est = OVector::<f64, <D::StateType as State>::VecLength>::zeros();
            for (i, ki) in self.k.iter().enumerate() {
                let b_i = self.prop.b_coeffs[i];
                if !self.fixed_step {
                    let b_i_star = self.prop.b_coeffs[i + self.prop.stages];
                    error_est += step_size * (b_i - b_i_star) * ki;
                }
                next_state += step_size * b_i * ki;
            }

            if self.fixed_step {
                // Using a fixed step, no adaptive step necessary
                self.details.step = self.step_size;
                return Ok((self.details.step, next_state));
            }
            self.details.error = E::estimate(&error_est, &next_state, &state_vec);
            if self.details.error <= self.prop.opts.tolerance
                || step_size.abs() <= self.prop.opts.min_step.to_seconds()
                || self.details.attempts >= self.prop.opts.attempts
            {
                if self.details.attempts >= self.prop.opts.attempts {
                    warn!(
                        "Could not further decrease step size: maximum number of attempts reached ({})",
                        self.details.attempts
                    );
                }
                self.details.step = step_size * Unit::Second;
                if self.details.error < self.prop.opts.tolerance {
                    // Error is below tolerance: grow the step for the next call
                    let proposed = 0.9
                        * step_size.abs()
                        * (self.prop.opts.tolerance / self.details.error)
                            .powf(1.0 / f64::from(self.prop.order));
                    step_size = sign * proposed.min(self.prop.opts.max_step.to_seconds());
                }
                self.step_size = step_size * Unit::Second;
                return Ok((self.details.step, next_state));
            }
            // Error is too high: shrink the step and try again
            self.details.attempts += 1;
            let proposed = 0.9
                * step_size.abs()
                * (self.prop.opts.tolerance / self.details.error)
                    .powf(1.0 / f64::from(self.prop.order - 1));
            step_size = sign * proposed.max(self.prop.opts.min_step.to_seconds());
        }
    }
}
