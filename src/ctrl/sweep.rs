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

use crate::cosmic::{Cr3bpSystem, RendezvousState};
use crate::ctrl::{
    ControlError, ControlLaw, RegulatorConfig, RendezvousSimulator, RunOutcome, RunReport, SimOpts,
};
use crate::dynamics::Linearization;
use crate::linalg::Vector3;
use crate::time::Duration;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;
use rayon::prelude::*;

/// Runs the same scenario under every feedback law, in parallel.
///
/// Each law gets its own simulator, so a failing synthesis in one law never
/// affects the others. The results are returned in the declaration order of
/// [`ControlLaw`].
pub fn law_sweep(
    system: Cr3bpSystem,
    model: Linearization,
    config: RegulatorConfig,
    opts: SimOpts,
    initial: RendezvousState,
    horizon: Duration,
) -> Vec<(ControlLaw, Result<RunReport, ControlError>)> {
    let laws: Vec<ControlLaw> = enum_iterator::all::<ControlLaw>().collect();
    laws.into_par_iter()
        .map(|law| {
            let simulator = RendezvousSimulator::new(system, model, law, config, opts);
            (law, simulator.run(initial, horizon))
        })
        .collect()
}

/// Draws `count` initial states about the template by dispersing the relative
/// position and velocity with independent zero mean Gaussians.
///
/// The generator is seeded, so a given seed always produces the same draw.
pub fn disperse_initial_states(
    template: &RendezvousState,
    position_sigma: f64,
    velocity_sigma: f64,
    count: usize,
    seed: u64,
) -> Result<Vec<RendezvousState>, ControlError> {
    for sigma in [position_sigma, velocity_sigma] {
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(ControlError::InvalidDispersion { sigma });
        }
    }
    let pos_dist = Normal::new(0.0, position_sigma)
        .map_err(|_| ControlError::InvalidDispersion {
            sigma: position_sigma,
        })?;
    let vel_dist = Normal::new(0.0, velocity_sigma)
        .map_err(|_| ControlError::InvalidDispersion {
            sigma: velocity_sigma,
        })?;
    let mut rng = Pcg64Mcg::seed_from_u64(seed);
    let mut states = Vec::with_capacity(count);
    for _ in 0..count {
        let mut state = *template;
        state.relative_position += Vector3::new(
            pos_dist.sample(&mut rng),
            pos_dist.sample(&mut rng),
            pos_dist.sample(&mut rng),
        );
        state.relative_velocity += Vector3::new(
            vel_dist.sample(&mut rng),
            vel_dist.sample(&mut rng),
            vel_dist.sample(&mut rng),
        );
        states.push(state);
    }
    Ok(states)
}

/// Runs the simulator over a dispersed set of initial states, in parallel.
pub fn monte_carlo(
    simulator: &RendezvousSimulator,
    template: &RendezvousState,
    position_sigma: f64,
    velocity_sigma: f64,
    count: usize,
    seed: u64,
    horizon: Duration,
) -> Result<Vec<RunReport>, ControlError> {
    let states = disperse_initial_states(template, position_sigma, velocity_sigma, count, seed)?;
    info!("Monte Carlo of {count} runs with seed {seed}");
    states
        .into_par_iter()
        .map(|initial| simulator.run(initial, horizon))
        .collect()
}

/// Fraction of the provided reports which converged.
pub fn converged_fraction(reports: &[RunReport]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let converged = reports
        .iter()
        .filter(|report| report.outcome == RunOutcome::Converged)
        .count();
    converged as f64 / reports.len() as f64
}
