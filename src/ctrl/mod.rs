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

use crate::cosmic::AstroError;
use crate::dynamics::DynamicsError;
use crate::linalg::{DMatrix, Matrix3, OMatrix, OVector, Vector3, U3, U9};
use crate::propagators::PropagationError;
use crate::utils::diagonal_matrix;
use enum_iterator::Sequence;
use serde_derive::{Deserialize, Serialize};
use snafu::Snafu;
use std::fmt;

mod riccati;
pub use self::riccati::*;

mod controllability;
pub use self::controllability::*;

mod simulator;
pub use self::simulator::*;

mod sweep;
pub use self::sweep::*;

/// The feedback laws available to close the rendezvous loop.
///
/// The continuous laws solve an algebraic Riccati equation on the continuous
/// plant, the discrete ones on its zero order hold discretization at the
/// guidance step. The static laws synthesize the gain once at the start of the
/// run, the re-linearized ones at every step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Sequence)]
pub enum ControlLaw {
    /// Continuous Riccati gain, synthesized once
    Lqr,
    /// Discrete Riccati gain, synthesized once
    DiscreteLqr,
    /// Continuous Riccati gain, re-synthesized at every guidance step
    Sdre,
    /// Discrete Riccati gain, re-synthesized at every guidance step
    DiscreteSdre,
}

impl ControlLaw {
    /// Whether the gain is synthesized once and held for the entire run.
    pub const fn is_static(&self) -> bool {
        matches!(self, Self::Lqr | Self::DiscreteLqr)
    }

    /// Whether the Riccati equation is solved on the discretized plant.
    pub const fn is_discrete(&self) -> bool {
        matches!(self, Self::DiscreteLqr | Self::DiscreteSdre)
    }
}

impl fmt::Display for ControlLaw {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Lqr => write!(f, "LQR"),
            Self::DiscreteLqr => write!(f, "discrete LQR"),
            Self::Sdre => write!(f, "SDRE"),
            Self::DiscreteSdre => write!(f, "discrete SDRE"),
        }
    }
}

/// Weights of the quadratic regulator cost, stored as diagonals.
///
/// The state weight spans the nine entry regulator state `[integral dr dv]`,
/// the control weight the three axis acceleration command.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegulatorConfig {
    pub q_diagonal: [f64; 9],
    pub m_diagonal: [f64; 3],
}

impl RegulatorConfig {
    pub fn new(q_diagonal: [f64; 9], m_diagonal: [f64; 3]) -> Self {
        Self {
            q_diagonal,
            m_diagonal,
        }
    }

    /// The state weight as a 9x9 matrix.
    pub fn q_matrix(&self) -> DMatrix<f64> {
        diagonal_matrix(&self.q_diagonal)
    }

    /// The control weight as a 3x3 matrix.
    pub fn m_matrix(&self) -> Matrix3<f64> {
        Matrix3::from_diagonal(&Vector3::new(
            self.m_diagonal[0],
            self.m_diagonal[1],
            self.m_diagonal[2],
        ))
    }
}

impl Default for RegulatorConfig {
    /// Identity weights on both the state and the control.
    fn default() -> Self {
        Self {
            q_diagonal: [1.0; 9],
            m_diagonal: [1.0; 3],
        }
    }
}

/// A synthesized feedback gain mapping the regulator state to an acceleration
/// command.
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackGain {
    pub gain: OMatrix<f64, U3, U9>,
}

impl FeedbackGain {
    /// The acceleration command `u = -K x` for the provided regulator state.
    pub fn control(&self, regulator_state: &OVector<f64, U9>) -> Vector3<f64> {
        -(&self.gain * regulator_state)
    }
}

/// Errors raised while synthesizing a feedback gain or running the
/// closed-loop simulator.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ControlError {
    #[snafu(display("Riccati iteration did not converge after {max_iter} iterations"))]
    SynthesisDiverged { max_iter: usize },
    #[snafu(display("Riccati iterate became singular at iteration {iteration}"))]
    SingularIterate { iteration: usize },
    #[snafu(display("Riccati solution is not positive definite"))]
    IndefiniteSolution,
    #[snafu(display("could not extract the Riccati solution from the sign iterate"))]
    SolutionExtraction,
    #[snafu(display("control weight matrix is singular"))]
    SingularControlWeight,
    #[snafu(display("gain equation is singular"))]
    SingularGain,
    #[snafu(display("dispersion standard deviation must be finite and non-negative, got {sigma}"))]
    InvalidDispersion { sigma: f64 },
    #[snafu(context(false), display("{source}"))]
    CtrlDynamics { source: DynamicsError },
    #[snafu(context(false), display("{source}"))]
    CtrlPropagation { source: PropagationError },
    #[snafu(context(false), display("{source}"))]
    CtrlAstro { source: AstroError },
}
