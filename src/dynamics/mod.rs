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

use crate::cosmic::{AstroError, State};
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, OVector};
use snafu::Snafu;

/// The CR3BP vector field for a single spacecraft.
mod cr3bp;
pub use self::cr3bp::*;

/// The relative motion linearizations about a target or a libration point.
mod linearization;
pub use self::linearization::*;

/// The controlled target-plus-chaser rendezvous dynamics.
mod rendezvous;
pub use self::rendezvous::*;

/// The equations of motion of a propagatable state.
///
/// Implementors return the derivative of the full propagated vector, state
/// transition matrix included when one is enabled, in seconds of the epoch
/// time scale.
pub trait Dynamics: Clone + Sync + Send
where
    DefaultAllocator: Allocator<<Self::StateType as State>::Size>
        + Allocator<<Self::StateType as State>::Size, <Self::StateType as State>::Size>
        + Allocator<<Self::StateType as State>::VecLength>,
{
    /// The state on which these dynamics operate
    type StateType: State;

    /// Computes the derivative of the propagated vector at `delta_t` seconds
    /// past the epoch of `state_ctx`, the state at the start of the step.
    fn eom(
        &self,
        delta_t: f64,
        state_vec: &OVector<f64, <Self::StateType as State>::VecLength>,
        state_ctx: &Self::StateType,
    ) -> Result<OVector<f64, <Self::StateType as State>::VecLength>, DynamicsError>
    where
        DefaultAllocator: Allocator<<Self::StateType as State>::Size>
            + Allocator<<Self::StateType as State>::Size, <Self::StateType as State>::Size>
            + Allocator<<Self::StateType as State>::VecLength>;

    /// Called after each successful integration step, e.g. to renormalize or
    /// to reject a nonphysical state.
    fn finally(&self, next_state: Self::StateType) -> Result<Self::StateType, DynamicsError>
    where
        DefaultAllocator: Allocator<<Self::StateType as State>::Size>
            + Allocator<<Self::StateType as State>::Size, <Self::StateType as State>::Size>
            + Allocator<<Self::StateType as State>::VecLength>,
    {
        Ok(next_state)
    }
}

/// Errors raised while evaluating a dynamical model.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    #[snafu(display("state transition matrix is not enabled on this state"))]
    StateTransitionMatrixUnset,
    #[snafu(display(
        "state is {distance:.3e} from a primary, below the {limit:.1e} singularity guard"
    ))]
    SingularGeometry { distance: f64, limit: f64 },
    #[snafu(display("dynamics astro error: {source}"))]
    DynamicsAstro { source: AstroError },
}
