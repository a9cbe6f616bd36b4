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

use crate::cosmic::{Cr3bpSystem, State, TimeTagged};
use crate::dynamics::DynamicsError;
use crate::linalg::{Matrix6, OVector, Vector3, Vector6, U15, U42, U51, U6, U9};
use crate::time::Epoch;
use approx::{abs_diff_eq, relative_eq};
use std::fmt;

pub fn assert_state_eq_or_abs(left: &Cr3bpState, right: &Cr3bpState, epsilon: f64, msg: &str) {
    if !(left.to_cartesian_vec() == right.to_cartesian_vec())
        && !abs_diff_eq!(
            left.to_cartesian_vec(),
            right.to_cartesian_vec(),
            epsilon = epsilon
        )
    {
        panic!(
            r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#,
            left.to_cartesian_vec(),
            right.to_cartesian_vec(),
            msg
        )
    }
}

pub fn assert_state_eq_or_rel(left: &Cr3bpState, right: &Cr3bpState, epsilon: f64, msg: &str) {
    if !(left.to_cartesian_vec() == right.to_cartesian_vec())
        && !relative_eq!(
            left.to_cartesian_vec(),
            right.to_cartesian_vec(),
            max_relative = epsilon
        )
    {
        panic!(
            r#"assertion failed: `(left == right)`
  left: `{:?}`,
 right: `{:?}`: {}"#,
            left.to_cartesian_vec(),
            right.to_cartesian_vec(),
            msg
        )
    }
}

/// The state of a single spacecraft in the nondimensional synodic frame of a
/// [`Cr3bpSystem`], with an optional 6x6 state transition matrix.
#[derive(Copy, Clone, Debug)]
pub struct Cr3bpState {
    pub system: Cr3bpSystem,
    pub epoch: Epoch,
    /// Synodic position, in units of the primary separation
    pub position: Vector3<f64>,
    /// Synodic velocity, in units of primary separation per nondimensional time
    pub velocity: Vector3<f64>,
    /// If set, the STM is propagated alongside the state.
    pub stm: Option<Matrix6<f64>>,
}

impl Cr3bpState {
    /// Builds a state from its synodic position and velocity, without an STM.
    pub fn from_synodic(
        system: Cr3bpSystem,
        epoch: Epoch,
        position: Vector3<f64>,
        velocity: Vector3<f64>,
    ) -> Self {
        Self {
            system,
            epoch,
            position,
            velocity,
            stm: None,
        }
    }

    /// Builds a state from a six entry synodic vector `[x y z vx vy vz]`.
    pub fn from_vector(system: Cr3bpSystem, epoch: Epoch, vector: Vector6<f64>) -> Self {
        Self::from_synodic(
            system,
            epoch,
            Vector3::new(vector[0], vector[1], vector[2]),
            Vector3::new(vector[3], vector[4], vector[5]),
        )
    }

    /// Returns the position and velocity stacked as a six entry vector.
    pub fn to_cartesian_vec(&self) -> Vector6<f64> {
        Vector6::new(
            self.position[0],
            self.position[1],
            self.position[2],
            self.velocity[0],
            self.velocity[1],
            self.velocity[2],
        )
    }

    /// Enables STM propagation from the identity.
    pub fn enable_stm(&mut self) {
        self.stm = Some(Matrix6::identity());
    }

    /// Copies this state with the STM enabled, e.g. for a sensitivity run.
    pub fn with_stm(mut self) -> Self {
        self.enable_stm();
        self
    }

    /// The Jacobi constant of this state, the only integral of motion of the CR3BP.
    pub fn jacobi_constant(&self) -> f64 {
        let mu = self.system.mu;
        let d1 = (self.position - self.system.primary_position()).norm();
        let d2 = (self.position - self.system.secondary_position()).norm();
        let x = self.position[0];
        let y = self.position[1];
        x.powi(2) + y.powi(2) + 2.0 * (1.0 - mu) / d1 + 2.0 * mu / d2
            - self.velocity.norm_squared()
    }
}

impl Default for Cr3bpState {
    fn default() -> Self {
        Self {
            system: Cr3bpSystem::earth_moon(),
            epoch: Epoch::from_tai_seconds(0.0),
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            stm: None,
        }
    }
}

impl PartialEq for Cr3bpState {
    fn eq(&self, other: &Self) -> bool {
        self.system == other.system
            && self.epoch == other.epoch
            && self.position == other.position
            && self.velocity == other.velocity
    }
}

impl TimeTagged for Cr3bpState {
    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
    }
}

impl State for Cr3bpState {
    type Size = U6;
    type VecLength = U42;

    /// Packs the state as `[position velocity]` followed by the STM rows,
    /// identity if the STM is unset.
    fn to_vector(&self) -> OVector<f64, U42> {
        let mut vector = OVector::<f64, U42>::zeros();
        for (i, val) in self.position.iter().enumerate() {
            vector[i] = *val;
        }
        for (i, val) in self.velocity.iter().enumerate() {
            vector[i + 3] = *val;
        }
        let stm = self.stm.unwrap_or_else(Matrix6::identity);
        for i in 0..6 {
            for j in 0..6 {
                vector[6 + 6 * i + j] = stm[(i, j)];
            }
        }
        vector
    }

    fn stm(&self) -> Result<Matrix6<f64>, DynamicsError> {
        self.stm.ok_or(DynamicsError::StateTransitionMatrixUnset)
    }

    fn unset_stm(&mut self) {
        self.stm = None;
    }

    fn set(&mut self, epoch: Epoch, vector: &OVector<f64, U42>) {
        self.epoch = epoch;
        self.position = Vector3::new(vector[0], vector[1], vector[2]);
        self.velocity = Vector3::new(vector[3], vector[4], vector[5]);
        if self.stm.is_some() {
            let mut stm = Matrix6::zeros();
            for i in 0..6 {
                for j in 0..6 {
                    stm[(i, j)] = vector[6 + 6 * i + j];
                }
            }
            self.stm = Some(stm);
        }
    }

    fn epoch(&self) -> Epoch {
        self.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.epoch = epoch;
    }
}

impl fmt::Display for Cr3bpState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(9);
        write!(
            f,
            "[{}] position = [{:.*}, {:.*}, {:.*}]  velocity = [{:.*}, {:.*}, {:.*}]",
            self.epoch,
            decimals,
            self.position[0],
            decimals,
            self.position[1],
            decimals,
            self.position[2],
            decimals,
            self.velocity[0],
            decimals,
            self.velocity[1],
            decimals,
            self.velocity[2],
        )
    }
}

impl fmt::LowerExp for Cr3bpState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] position = [{:e}, {:e}, {:e}]  velocity = [{:e}, {:e}, {:e}]",
            self.epoch,
            self.position[0],
            self.position[1],
            self.position[2],
            self.velocity[0],
            self.velocity[1],
            self.velocity[2],
        )
    }
}

/// The coupled state of a rendezvous: the target spacecraft in synodic
/// coordinates, the chaser relative to it, and the accumulated integral of the
/// relative position used by the augmented regulator.
#[derive(Copy, Clone, Debug)]
pub struct RendezvousState {
    pub target: Cr3bpState,
    /// Chaser position relative to the target, synodic axes
    pub relative_position: Vector3<f64>,
    /// Chaser velocity relative to the target, synodic axes
    pub relative_velocity: Vector3<f64>,
    /// Running integral of the relative position since the start of the run
    pub integral: Vector3<f64>,
}

impl RendezvousState {
    /// Builds a rendezvous state with a zero integral term.
    pub fn new(
        target: Cr3bpState,
        relative_position: Vector3<f64>,
        relative_velocity: Vector3<f64>,
    ) -> Self {
        Self {
            target,
            relative_position,
            relative_velocity,
            integral: Vector3::zeros(),
        }
    }

    /// The six entry relative state `[dr dv]`.
    pub fn relative_vector(&self) -> Vector6<f64> {
        Vector6::new(
            self.relative_position[0],
            self.relative_position[1],
            self.relative_position[2],
            self.relative_velocity[0],
            self.relative_velocity[1],
            self.relative_velocity[2],
        )
    }

    /// The nine entry regulator state `[integral dr dv]` fed to the feedback gain.
    pub fn regulator_vector(&self) -> OVector<f64, U9> {
        let mut vector = OVector::<f64, U9>::zeros();
        for i in 0..3 {
            vector[i] = self.integral[i];
            vector[i + 3] = self.relative_position[i];
            vector[i + 6] = self.relative_velocity[i];
        }
        vector
    }

    /// Norm of the six entry relative state, the scalar tracked by the simulator.
    pub fn error_norm(&self) -> f64 {
        self.relative_vector().norm()
    }

    /// Absolute synodic position of the chaser.
    pub fn chaser_position(&self) -> Vector3<f64> {
        self.target.position + self.relative_position
    }

    /// Absolute synodic velocity of the chaser.
    pub fn chaser_velocity(&self) -> Vector3<f64> {
        self.target.velocity + self.relative_velocity
    }
}

impl Default for RendezvousState {
    fn default() -> Self {
        Self {
            target: Cr3bpState::default(),
            relative_position: Vector3::zeros(),
            relative_velocity: Vector3::zeros(),
            integral: Vector3::zeros(),
        }
    }
}

impl PartialEq for RendezvousState {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
            && self.relative_position == other.relative_position
            && self.relative_velocity == other.relative_velocity
            && self.integral == other.integral
    }
}

impl TimeTagged for RendezvousState {
    fn epoch(&self) -> Epoch {
        self.target.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.target.epoch = epoch;
    }
}

impl State for RendezvousState {
    type Size = U15;
    type VecLength = U51;

    /// Packs `[target6 dr dv integral]` followed by the target STM rows.
    fn to_vector(&self) -> OVector<f64, U51> {
        let mut vector = OVector::<f64, U51>::zeros();
        let target = self.target.to_cartesian_vec();
        for i in 0..6 {
            vector[i] = target[i];
        }
        for i in 0..3 {
            vector[6 + i] = self.relative_position[i];
            vector[9 + i] = self.relative_velocity[i];
            vector[12 + i] = self.integral[i];
        }
        let stm = self.target.stm.unwrap_or_else(Matrix6::identity);
        for i in 0..6 {
            for j in 0..6 {
                vector[15 + 6 * i + j] = stm[(i, j)];
            }
        }
        vector
    }

    fn unset_stm(&mut self) {
        self.target.stm = None;
    }

    fn set(&mut self, epoch: Epoch, vector: &OVector<f64, U51>) {
        self.target.epoch = epoch;
        self.target.position = Vector3::new(vector[0], vector[1], vector[2]);
        self.target.velocity = Vector3::new(vector[3], vector[4], vector[5]);
        self.relative_position = Vector3::new(vector[6], vector[7], vector[8]);
        self.relative_velocity = Vector3::new(vector[9], vector[10], vector[11]);
        self.integral = Vector3::new(vector[12], vector[13], vector[14]);
        if self.target.stm.is_some() {
            let mut stm = Matrix6::zeros();
            for i in 0..6 {
                for j in 0..6 {
                    stm[(i, j)] = vector[15 + 6 * i + j];
                }
            }
            self.target.stm = Some(stm);
        }
    }

    fn epoch(&self) -> Epoch {
        self.target.epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        self.target.epoch = epoch;
    }
}

impl fmt::Display for RendezvousState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let decimals = f.precision().unwrap_or(9);
        write!(
            f,
            "[{}] dr = [{:.*}, {:.*}, {:.*}]  dv = [{:.*}, {:.*}, {:.*}]  |e| = {:.*e}",
            self.target.epoch,
            decimals,
            self.relative_position[0],
            decimals,
            self.relative_position[1],
            decimals,
            self.relative_position[2],
            decimals,
            self.relative_velocity[0],
            decimals,
            self.relative_velocity[1],
            decimals,
            self.relative_velocity[2],
            decimals,
            self.error_norm(),
        )
    }
}

impl fmt::LowerExp for RendezvousState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{}] dr = [{:e}, {:e}, {:e}]  dv = [{:e}, {:e}, {:e}]",
            self.target.epoch,
            self.relative_position[0],
            self.relative_position[1],
            self.relative_position[2],
            self.relative_velocity[0],
            self.relative_velocity[1],
            self.relative_velocity[2],
        )
    }
}
