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

use crate::propagators::{ErrorCtrl, RSSStep};
use crate::time::{Duration, Unit};
use std::fmt;
use typed_builder::TypedBuilder;

/// Stores the integrator options, including the minimum and maximum step
/// sizes, and the tolerance of the adaptive step control.
#[derive(Clone, Copy, Debug, TypedBuilder)]
#[builder(doc)]
pub struct PropOpts<E: ErrorCtrl + Default> {
    /// Initial step size, also the actual step of a fixed step integrator
    #[builder(default = 60.0 * Unit::Second)]
    pub init_step: Duration,
    #[builder(default = 0.001 * Unit::Second)]
    pub min_step: Duration,
    #[builder(default = 2700.0 * Unit::Second)]
    pub max_step: Duration,
    #[builder(default = 1e-12)]
    pub tolerance: f64,
    /// Maximum number of step size reductions before accepting the step
    #[builder(default = 50)]
    pub attempts: u8,
    #[builder(default = false)]
    pub fixed_step: bool,
    #[builder(default)]
    pub errctrl: E,
}

impl<E: ErrorCtrl + Default> PropOpts<E> {
    /// `with_adaptive_step` initializes an `PropOpts` such that the integrator
    /// is used with an adaptive step size.
    pub fn with_adaptive_step(min_step: Duration, max_step: Duration, tolerance: f64) -> Self {
        Self {
            init_step: max_step,
            min_step,
            max_step,
            tolerance,
            attempts: 50,
            fixed_step: false,
            errctrl: E::default(),
        }
    }

    /// `with_fixed_step` initializes an `PropOpts` such that the integrator is
    /// used with a fixed step size.
    pub fn with_fixed_step(step: Duration) -> Self {
        Self {
            init_step: step,
            min_step: step,
            max_step: step,
            tolerance: 0.0,
            attempts: 0,
            fixed_step: true,
            errctrl: E::default(),
        }
    }

    /// Returns a string with the information about these options
    pub fn info(&self) -> String {
        format!("{self}")
    }
}

impl<E: ErrorCtrl + Default> fmt::Display for PropOpts<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.fixed_step {
            write!(f, "fixed step: {:e}", self.init_step)
        } else {
            write!(
                f,
                "min step: {:e}, max step: {:e}, tolerance: {:e}, attempts: {}",
                self.min_step, self.max_step, self.tolerance, self.attempts
            )
        }
    }
}

impl Default for PropOpts<RSSStep> {
    /// `default` returns the same default options as nearly all astrodynamics
    /// software: a minimum step of 1 millisecond, a maximum step of 45
    /// minutes, and an adaptive tolerance of 1e-12.
    fn default() -> PropOpts<RSSStep> {
        PropOpts {
            init_step: 60.0 * Unit::Second,
            min_step: 0.001 * Unit::Second,
            max_step: 2700.0 * Unit::Second,
            tolerance: 1e-12,
            attempts: 50,
            fixed_step: false,
            errctrl: RSSStep,
        }
    }
}

#[test]
fn test_options() {
    let opts = PropOpts::<RSSStep>::with_fixed_step(1e-1 * Unit::Second);
    assert_eq!(opts.min_step, 1e-1 * Unit::Second);
    assert_eq!(opts.max_step, 1e-1 * Unit::Second);
    assert!(opts.tolerance.abs() < f64::EPSILON);
    assert!(opts.fixed_step);

    let opts = PropOpts::<RSSStep>::with_adaptive_step(
        1e-2 * Unit::Second,
        10.0 * Unit::Second,
        1e-9,
    );
    assert_eq!(opts.min_step, 1e-2 * Unit::Second);
    assert_eq!(opts.max_step, 10.0 * Unit::Second);
    assert!((opts.tolerance - 1e-9).abs() < f64::EPSILON);
    assert!(!opts.fixed_step);

    let opts = PropOpts::<RSSStep>::default();
    assert_eq!(opts.init_step, 60.0 * Unit::Second);
    assert_eq!(opts.attempts, 50);

    let opts = PropOpts::<RSSStep>::builder()
        .tolerance(1e-10)
        .build();
    assert!((opts.tolerance - 1e-10).abs() < f64::EPSILON);
    assert_eq!(opts.min_step, 0.001 * Unit::Second);
}
