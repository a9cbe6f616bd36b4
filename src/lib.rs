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

/*! # syzygy

Relative motion of two spacecraft in the Circular Restricted Three-Body Problem,
with re-linearized feedback control synthesis (LQR and SDRE, continuous and
discrete) for rendezvous along libration point orbits.

All states are expressed in the nondimensional synodic frame of a
[`Cr3bpSystem`](crate::cosmic::Cr3bpSystem): the rotating frame in which both
primaries are fixed on the x axis, distances are in units of the primary
separation, and time is in units of the inverse mean motion.
*/

/// Provides all the propagators / integrators available in `syzygy`.
pub mod propagators;

/// Provides the dynamical models: the CR3BP vector field, the relative-motion
/// linearizations, and the controlled rendezvous dynamics.
pub mod dynamics;

/// Provides the three-body systems, spacecraft states, and nominal trajectories.
pub mod cosmic;

/// Controllability analysis, Riccati based regulator synthesis, the closed-loop
/// rendezvous simulator, and batch sweeps.
pub mod ctrl;

/// Scenario configuration from YAML files.
pub mod io;

/// Utility functions shared by different modules.
pub mod utils;

mod errors;
/// Syzygy will (almost) never panic and functions which may fail will return an error.
pub use self::errors::SyzygyError;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

/// Re-export some useful things
pub use self::cosmic::{Cr3bpState, Cr3bpSystem, RendezvousState, State, TimeTagged};
