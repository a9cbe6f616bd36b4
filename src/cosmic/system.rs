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
use crate::linalg::Vector3;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Convergence criterion on the collinear equilibrium residual.
const LIBRATION_TOL: f64 = 1e-13;
/// Iteration cap of the collinear libration point solver.
const LIBRATION_MAX_ITER: usize = 50;

/// The five equilibrium points of the CR3BP.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibrationPoint {
    L1,
    L2,
    L3,
    L4,
    L5,
}

impl LibrationPoint {
    /// Returns whether this point lies on the line through both primaries.
    pub const fn is_collinear(&self) -> bool {
        matches!(self, Self::L1 | Self::L2 | Self::L3)
    }
}

impl fmt::Display for LibrationPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A circular restricted three-body system in nondimensional synodic coordinates.
///
/// The primary of reduced gravitational parameter `1 - mu` sits at `(-mu, 0, 0)`
/// and the secondary of parameter `mu` at `(1 - mu, 0, 0)`. The characteristic
/// length and time convert nondimensional states to kilometers and seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cr3bpSystem {
    /// Mass ratio of the secondary, in (0, 0.5]
    pub mu: f64,
    /// Distance between the primaries, in km
    pub length_unit_km: f64,
    /// Seconds per nondimensional time unit (inverse mean motion)
    pub time_unit_s: f64,
}

impl Cr3bpSystem {
    /// Builds a new system, validating the mass ratio and the characteristic scales.
    pub fn new(mu: f64, length_unit_km: f64, time_unit_s: f64) -> Result<Self, AstroError> {
        if !(mu > 0.0 && mu <= 0.5) || !mu.is_finite() {
            return Err(AstroError::MassRatioOutOfRange { mu });
        }
        for value in [length_unit_km, time_unit_s] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(AstroError::NonPositiveScale { value });
            }
        }
        Ok(Self {
            mu,
            length_unit_km,
            time_unit_s,
        })
    }

    /// The Earth-Moon system.
    pub fn earth_moon() -> Self {
        Self {
            mu: 0.012150585609624,
            length_unit_km: 384_400.0,
            time_unit_s: 375_190.258_8,
        }
    }

    /// The Sun-Earth system.
    pub fn sun_earth() -> Self {
        Self {
            mu: 3.003_489_614_9e-6,
            length_unit_km: 149_597_870.7,
            time_unit_s: 5_022_642.89,
        }
    }

    /// Reduced gravitational parameter of the primary.
    pub fn mu_primary(&self) -> f64 {
        1.0 - self.mu
    }

    /// Reduced gravitational parameter of the secondary.
    pub fn mu_secondary(&self) -> f64 {
        self.mu
    }

    /// Synodic position of the primary.
    pub fn primary_position(&self) -> Vector3<f64> {
        Vector3::new(-self.mu, 0.0, 0.0)
    }

    /// Synodic position of the secondary.
    pub fn secondary_position(&self) -> Vector3<f64> {
        Vector3::new(1.0 - self.mu, 0.0, 0.0)
    }

    /// Synodic position of the requested libration point.
    ///
    /// The collinear points are found by a Newton iteration on the axial force
    /// balance; the triangular points are analytical.
    pub fn libration_point(&self, point: LibrationPoint) -> Result<Vector3<f64>, AstroError> {
        match point {
            LibrationPoint::L4 => Ok(Vector3::new(0.5 - self.mu, 3.0_f64.sqrt() / 2.0, 0.0)),
            LibrationPoint::L5 => Ok(Vector3::new(0.5 - self.mu, -(3.0_f64.sqrt()) / 2.0, 0.0)),
            _ => {
                let x = self.collinear_abscissa(point)?;
                Ok(Vector3::new(x, 0.0, 0.0))
            }
        }
    }

    /// Ratio of the distance between the requested collinear point and its nearest
    /// primary to the distance between the primaries.
    pub fn gamma(&self, point: LibrationPoint) -> Result<f64, AstroError> {
        let x = self.collinear_abscissa(point)?;
        Ok(match point {
            LibrationPoint::L1 => (1.0 - self.mu) - x,
            LibrationPoint::L2 => x - (1.0 - self.mu),
            LibrationPoint::L3 => -(x + self.mu),
            _ => unreachable!(),
        })
    }

    /// Second order Legendre coefficient of the potential expansion about the
    /// requested collinear point, Richardson style.
    pub fn legendre_c2_fixed(&self, point: LibrationPoint) -> Result<f64, AstroError> {
        let gamma = self.gamma(point)?;
        let mu = self.mu;
        let g3 = gamma.powi(3);
        let c2 = match point {
            LibrationPoint::L1 => (mu + (1.0 - mu) * g3 / (1.0 - gamma).powi(3)) / g3,
            LibrationPoint::L2 => (mu + (1.0 - mu) * g3 / (1.0 + gamma).powi(3)) / g3,
            LibrationPoint::L3 => (1.0 - mu + mu * g3 / (1.0 + gamma).powi(3)) / g3,
            _ => unreachable!(),
        };
        Ok(c2)
    }

    /// Second order Legendre coefficient evaluated from the instantaneous
    /// distances of the provided position to both primaries.
    pub fn legendre_c2_moving(&self, position: &Vector3<f64>) -> f64 {
        let d1 = (position - self.primary_position()).norm();
        let d2 = (position - self.secondary_position()).norm();
        self.mu_primary() / d1.powi(3) + self.mu_secondary() / d2.powi(3)
    }

    /// Newton solve of the on-axis equilibrium x - (1-mu)(x+mu)/d1^3 - mu(x-1+mu)/d2^3 = 0.
    fn collinear_abscissa(&self, point: LibrationPoint) -> Result<f64, AstroError> {
        if !point.is_collinear() {
            return Err(AstroError::NotCollinear { point });
        }
        let mu = self.mu;
        let mut x = match point {
            LibrationPoint::L1 => 1.0 - mu - (mu / 3.0).cbrt(),
            LibrationPoint::L2 => 1.0 - mu + (mu / 3.0).cbrt(),
            LibrationPoint::L3 => -1.0 - 5.0 * mu / 12.0,
            _ => unreachable!(),
        };
        for _ in 0..LIBRATION_MAX_ITER {
            let d1 = (x + mu).abs();
            let d2 = (x - 1.0 + mu).abs();
            let g = x - (1.0 - mu) * (x + mu) / d1.powi(3) - mu * (x - 1.0 + mu) / d2.powi(3);
            // On the x axis the radial derivative is strictly positive
            let dg = 1.0 + 2.0 * (1.0 - mu) / d1.powi(3) + 2.0 * mu / d2.powi(3);
            let dx = g / dg;
            x -= dx;
            if g.abs() < LIBRATION_TOL && dx.abs() < LIBRATION_TOL {
                return Ok(x);
            }
        }
        Err(AstroError::LibrationSolverDiverged {
            point,
            attempts: LIBRATION_MAX_ITER,
        })
    }
}

impl fmt::Display for Cr3bpSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "CR3BP [mu = {:.9e}, l* = {:.1} km, t* = {:.3} s]",
            self.mu, self.length_unit_km, self.time_unit_s
        )
    }
}
