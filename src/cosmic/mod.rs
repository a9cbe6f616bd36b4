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

use crate::dynamics::DynamicsError;
use crate::linalg::allocator::Allocator;
use crate::linalg::{DefaultAllocator, DimName, OMatrix, OVector};
use crate::time::{Duration, Epoch};
use snafu::Snafu;
use std::fmt;

// Re-Export the three-body system and its libration points
mod system;
pub use self::system::*;

// Re-Export the states
mod state;
pub use self::state::*;

// Re-Export the nominal trajectory container
mod trajectory;
pub use self::trajectory::*;

/// A trait allowing for something to have an epoch
pub trait TimeTagged {
    /// Retrieve the Epoch
    fn epoch(&self) -> Epoch;
    /// Set the Epoch
    fn set_epoch(&mut self, epoch: Epoch);

    /// Shift this epoch by a duration (can be negative)
    fn shift_by(&mut self, duration: Duration) {
        self.set_epoch(self.epoch() + duration);
    }
}

/// A trait for a propagatable state.
/// The first parameter is the size of the state, the second is the size of the propagated vector including STM and extra items.
pub trait State: Default + Copy + PartialEq + fmt::Display + fmt::LowerExp + Send + Sync
where
    Self: Sized,
    DefaultAllocator:
        Allocator<Self::Size> + Allocator<Self::Size, Self::Size> + Allocator<Self::VecLength>,
{
    /// Size of the state and its STM
    type Size: DimName;
    type VecLength: DimName;

    /// Return this state as a vector for the propagation
    fn to_vector(&self) -> OVector<f64, Self::VecLength>;

    /// Return the state transition matrix, if set.
    fn stm(&self) -> Result<OMatrix<f64, Self::Size, Self::Size>, DynamicsError> {
        Err(DynamicsError::StateTransitionMatrixUnset)
    }

    /// Unsets the STM for this state
    fn unset_stm(&mut self);

    /// Set this state from the provided epoch and vector
    fn set(&mut self, epoch: Epoch, vector: &OVector<f64, Self::VecLength>);

    /// Reconstruct a new State from the provided delta time in seconds compared to the current state
    /// and with the provided vector.
    fn set_with_delta_seconds(
        mut self,
        delta_t_s: f64,
        vector: &OVector<f64, Self::VecLength>,
    ) -> Self
    where
        DefaultAllocator: Allocator<Self::VecLength>,
    {
        self.set(self.epoch() + delta_t_s, vector);
        self
    }

    /// Retrieve the Epoch
    fn epoch(&self) -> Epoch;
    /// Set the Epoch
    fn set_epoch(&mut self, epoch: Epoch);
}

/// Errors in the definition of a three-body system, its libration points, or a trajectory.
#[derive(Debug, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("mass ratio must be in (0, 0.5], got {mu}"))]
    MassRatioOutOfRange { mu: f64 },
    #[snafu(display("characteristic scale must be strictly positive, got {value}"))]
    NonPositiveScale { value: f64 },
    #[snafu(display("{point} solver did not converge after {attempts} iterations"))]
    LibrationSolverDiverged {
        point: LibrationPoint,
        attempts: usize,
    },
    #[snafu(display("{point} is not collinear, no distance ratio is defined"))]
    NotCollinear { point: LibrationPoint },
    #[snafu(display("a trajectory requires at least one sample"))]
    EmptyTrajectory,
    #[snafu(display(
        "trajectory samples must be in strictly increasing epoch order (sample {index})"
    ))]
    UnsortedTrajectory { index: usize },
}
