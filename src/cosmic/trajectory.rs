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

use crate::cosmic::{AstroError, Cr3bpState, TimeTagged};
use crate::dynamics::Cr3bpDynamics;
use crate::propagators::Propagator;
use crate::time::{Duration, Epoch};
use crate::SyzygyError;
use std::fmt;

/// A nominal target trajectory stored as a time ordered sequence of synodic
/// states. Samples are append only: analyses index into the sequence but never
/// reorder or rewrite it.
#[derive(Clone, Debug, PartialEq)]
pub struct NominalTrajectory {
    samples: Vec<Cr3bpState>,
}

impl NominalTrajectory {
    /// Builds a trajectory, rejecting empty and unsorted sample sequences.
    pub fn new(samples: Vec<Cr3bpState>) -> Result<Self, AstroError> {
        if samples.is_empty() {
            return Err(AstroError::EmptyTrajectory);
        }
        for index in 1..samples.len() {
            if samples[index].epoch <= samples[index - 1].epoch {
                return Err(AstroError::UnsortedTrajectory { index });
            }
        }
        Ok(Self { samples })
    }

    /// Propagates `initial` for `count` fixed steps of `step`, collecting every
    /// intermediate state (and the initial one) as a sample.
    pub fn generate(
        dynamics: &Cr3bpDynamics,
        initial: Cr3bpState,
        step: Duration,
        count: usize,
    ) -> Result<Self, SyzygyError> {
        let setup = Propagator::rk4(dynamics, step);
        let mut samples = Vec::with_capacity(count + 1);
        samples.push(initial);
        let mut prop = setup.with(initial);
        for _ in 0..count {
            prop.for_duration(step)?;
            samples.push(prop.state);
        }
        Ok(Self::new(samples)?)
    }

    pub fn first(&self) -> &Cr3bpState {
        // Emptiness is rejected at construction
        self.samples.first().unwrap()
    }

    pub fn last(&self) -> &Cr3bpState {
        self.samples.last().unwrap()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The sample at the provided index, if within bounds.
    pub fn sample(&self, index: usize) -> Option<&Cr3bpState> {
        self.samples.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cr3bpState> {
        self.samples.iter()
    }

    /// The sample whose epoch is nearest to the requested one.
    pub fn nearest(&self, epoch: Epoch) -> &Cr3bpState {
        self.samples
            .iter()
            .min_by(|a, b| {
                let da = (a.epoch - epoch).abs();
                let db = (b.epoch - epoch).abs();
                da.partial_cmp(&db).unwrap()
            })
            .unwrap()
    }

    /// Time span covered by the samples.
    pub fn duration(&self) -> Duration {
        self.last().epoch - self.first().epoch
    }
}

impl fmt::Display for NominalTrajectory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Trajectory of {} samples from {} to {} ({})",
            self.len(),
            self.first().epoch,
            self.last().epoch,
            self.duration()
        )
    }
}

impl TimeTagged for NominalTrajectory {
    fn epoch(&self) -> Epoch {
        self.first().epoch
    }

    fn set_epoch(&mut self, epoch: Epoch) {
        let shift = epoch - self.first().epoch;
        for sample in self.samples.iter_mut() {
            sample.epoch += shift;
        }
    }
}
