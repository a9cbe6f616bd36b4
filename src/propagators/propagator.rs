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
    Dormand45, ErrorCtrl, IntegrationDetails, PropInstance, PropOpts, RK4Fixed, RSSStep, RK,
};
use crate::time::Duration;

/// A `Propagator` allows propagating a set of dynamics forward or backward in
/// time. It is an EOM integrator setup: the actual propagation is handled by
/// the [`PropInstance`] returned by [`Self::with`].
#[derive(Clone, Debug)]
pub struct Propagator<'a, D: Dynamics, E: ErrorCtrl + Default>
where
    DefaultAllocator: Allocator<<D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::Size, <D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::VecLength>,
{
    pub dynamics: &'a D,
    pub opts: PropOpts<E>,
    pub(crate) order: u8,
    pub(crate) stages: usize,
    pub(crate) a_coeffs: &'static [f64],
    pub(crate) b_coeffs: &'static [f64],
}

impl<'a, D: Dynamics, E: ErrorCtrl + Default> Propagator<'a, D, E>
where
    DefaultAllocator: Allocator<<D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::Size, <D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::VecLength>,
{
    /// Each propagator must be initialized with `new` which stores a pointer
    /// to the dynamics and the integrator to use.
    pub fn new<T: RK>(dynamics: &'a D, opts: PropOpts<E>) -> Self {
        Self {
            dynamics,
            opts,
            stages: T::STAGES,
            order: T::ORDER,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }

    pub fn set_tolerance(&mut self, tol: f64) {
        self.opts.tolerance = tol;
    }

    pub fn set_max_step(&mut self, step: Duration) {
        self.opts.max_step = step;
    }

    /// An instance of a propagator for the provided initial state.
    pub fn with(&'a self, state: D::StateType) -> PropInstance<'a, D, E> {
        let k = vec![
            OVector::<f64, <D::StateType as State>::VecLength>::zeros();
            self.stages
        ];
        PropInstance {
            state,
            prop: self,
            details: IntegrationDetails {
                step: self.opts.init_step,
                error: 0.0,
                attempts: 1,
            },
            step_size: self.opts.init_step,
            fixed_step: self.opts.fixed_step,
            k,
        }
    }
}

impl<'a, D: Dynamics> Propagator<'a, D, RSSStep>
where
    DefaultAllocator: Allocator<<D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::Size, <D::StateType as State>::Size>
        + Allocator<<D::StateType as State>::VecLength>,
{
    /// Default propagator is an adaptive Dormand-Prince 5(4) with the default
    /// options.
    pub fn default(dynamics: &'a D) -> Self {
        Self::new::<Dormand45>(dynamics, PropOpts::default())
    }

    /// An adaptive Dormand-Prince 5(4) with the provided step bounds and
    /// tolerance.
    pub fn dormand45(
        dynamics: &'a D,
        min_step: Duration,
        max_step: Duration,
        tolerance: f64,
    ) -> Self {
        Self::new::<Dormand45>(
            dynamics,
            PropOpts::with_adaptive_step(min_step, max_step, tolerance),
        )
    }

    /// A fixed step classical Runge Kutta 4, mostly useful when the sampling
    /// cadence matters more than the local truncation error.
    pub fn rk4(dynamics: &'a D, step: Duration) -> Self {
        Self::new::<RK4Fixed>(dynamics, PropOpts::with_fixed_step(step))
    }

    /// A fixed step Dormand-Prince 5(4).
    pub fn dormand45_fixed(dynamics: &'a D, step: Duration) -> Self {
        Self::new::<Dormand45>(dynamics, PropOpts::with_fixed_step(step))
    }
}
