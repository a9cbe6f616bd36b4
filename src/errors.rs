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

use snafu::prelude::*;

use crate::cosmic::AstroError;
use crate::ctrl::ControlError;
use crate::dynamics::DynamicsError;
use crate::io::ConfigError;
use crate::propagators::PropagationError;

/// Top level error enum, composing the errors of each module.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SyzygyError {
    #[snafu(context(false), display("{source}"))]
    Astro { source: AstroError },
    #[snafu(context(false), display("{source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(context(false), display("{source}"))]
    Propagation { source: PropagationError },
    #[snafu(context(false), display("{source}"))]
    Control { source: ControlError },
    #[snafu(context(false), display("{source}"))]
    Config { source: ConfigError },
}
