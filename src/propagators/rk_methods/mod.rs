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

mod rk;
pub use self::rk::*;

/// The `RK` trait defines a Runge Kutta integrator from its Butcher tableau.
pub trait RK
where
    Self: Sized,
{
    /// Returns the order of this integrator (as u8 because there probably
    /// isn't an order greater than 255).
    const ORDER: u8;

    /// Returns the stages of this integrator, i.e. how many times the
    /// derivatives will be called.
    const STAGES: usize;

    /// Returns a pointer to a list of f64 corresponding to the A coefficients
    /// of the Butcher table for that integrator, in row major order.
    const A_COEFFS: &'static [f64];

    /// Returns a pointer to a list of f64 corresponding to the b_i and b^*_i
    /// coefficients of the Butcher table for that integrator: the integration
    /// weights followed by the embedded error estimation weights.
    const B_COEFFS: &'static [f64];
}
