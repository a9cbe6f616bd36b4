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

use crate::cosmic::{AstroError, Cr3bpState, Cr3bpSystem, RendezvousState};
use crate::ctrl::{
    ControlLaw, RegulatorConfig, RendezvousSimulator, RunReport, SimOpts,
};
use crate::dynamics::Linearization;
use crate::linalg::{Vector3, Vector6};
use crate::time::{Epoch, Unit};
use crate::SyzygyError;
use serde_derive::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use std::path::Path;

/// Errors loading a scenario from a YAML file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("could not read the scenario file: {source}"))]
    ReadError { source: std::io::Error },
    #[snafu(display("could not parse the scenario: {source}"))]
    ParseError { source: serde_yaml::Error },
    #[snafu(display("scenario defines an invalid system: {source}"))]
    InvalidSystem { source: AstroError },
}

/// The three-body system of a scenario, either a preset or explicit constants.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SystemConfig {
    EarthMoon,
    SunEarth,
    Custom {
        mu: f64,
        length_unit_km: f64,
        time_unit_s: f64,
    },
}

impl SystemConfig {
    pub fn to_system(self) -> Result<Cr3bpSystem, ConfigError> {
        match self {
            Self::EarthMoon => Ok(Cr3bpSystem::earth_moon()),
            Self::SunEarth => Ok(Cr3bpSystem::sun_earth()),
            Self::Custom {
                mu,
                length_unit_km,
                time_unit_s,
            } => Cr3bpSystem::new(mu, length_unit_km, time_unit_s).context(InvalidSystemSnafu),
        }
    }
}

fn default_convergence_tol() -> f64 {
    1e-6
}

fn default_divergence_ceiling() -> f64 {
    10.0
}

fn default_max_growth_steps() -> usize {
    1000
}

fn default_weights_q() -> [f64; 9] {
    [1.0; 9]
}

fn default_weights_m() -> [f64; 3] {
    [1.0; 3]
}

/// A full rendezvous scenario: the system, the linearization model, the
/// feedback law, the regulator weights, the run options, and the initial
/// target and relative states in synodic coordinates.
///
/// ## Example
/// ```yaml
/// system: EarthMoon
/// model: !FixedPoint
///   point: L1
/// law: Sdre
/// step_s: 60.0
/// horizon_s: 86400.0
/// target: [0.836915, 0.0, 0.0, 0.0, 0.0, 0.0]
/// relative: [1.0e-4, -2.0e-4, 5.0e-5, 0.0, 0.0, 0.0]
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub system: SystemConfig,
    pub model: Linearization,
    pub law: ControlLaw,
    #[serde(default = "default_weights_q")]
    pub q_diagonal: [f64; 9],
    #[serde(default = "default_weights_m")]
    pub m_diagonal: [f64; 3],
    /// Guidance step, in seconds
    pub step_s: f64,
    /// Run horizon, in seconds
    pub horizon_s: f64,
    #[serde(default = "default_convergence_tol")]
    pub convergence_tol: f64,
    #[serde(default = "default_divergence_ceiling")]
    pub divergence_ceiling: f64,
    #[serde(default = "default_max_growth_steps")]
    pub max_growth_steps: usize,
    /// Target state `[x y z vx vy vz]`, nondimensional synodic
    pub target: [f64; 6],
    /// Initial relative state `[dx dy dz dvx dvy dvz]`, nondimensional synodic
    pub relative: [f64; 6],
}

impl ScenarioConfig {
    /// Loads a scenario from a YAML file.
    pub fn from_yaml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).context(ReadSnafu)?;
        Self::from_yaml(&contents)
    }

    /// Parses a scenario from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).context(ParseSnafu)
    }

    pub fn system(&self) -> Result<Cr3bpSystem, ConfigError> {
        self.system.to_system()
    }

    pub fn regulator(&self) -> RegulatorConfig {
        RegulatorConfig::new(self.q_diagonal, self.m_diagonal)
    }

    pub fn sim_opts(&self) -> SimOpts {
        SimOpts::builder()
            .step(self.step_s * Unit::Second)
            .convergence_tol(self.convergence_tol)
            .divergence_ceiling(self.divergence_ceiling)
            .max_growth_steps(self.max_growth_steps)
            .build()
    }

    /// The initial rendezvous state, epoch provided by the caller since the
    /// dynamics are autonomous.
    pub fn initial_state(&self, epoch: Epoch) -> Result<RendezvousState, ConfigError> {
        let system = self.system()?;
        let target = Cr3bpState::from_vector(
            system,
            epoch,
            Vector6::from_row_slice(&self.target),
        );
        Ok(RendezvousState::new(
            target,
            Vector3::new(self.relative[0], self.relative[1], self.relative[2]),
            Vector3::new(self.relative[3], self.relative[4], self.relative[5]),
        ))
    }

    pub fn simulator(&self) -> Result<RendezvousSimulator, ConfigError> {
        Ok(RendezvousSimulator::new(
            self.system()?,
            self.model,
            self.law,
            self.regulator(),
            self.sim_opts(),
        ))
    }

    /// Builds the simulator and runs the scenario from the provided epoch.
    pub fn run(&self, epoch: Epoch) -> Result<RunReport, SyzygyError> {
        let simulator = self.simulator()?;
        let initial = self.initial_state(epoch)?;
        let horizon = self.horizon_s * Unit::Second;
        Ok(simulator.run(initial, horizon)?)
    }
}
