// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for planning operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during placement planning and validation.
///
/// Constraint violations are never errors; they are returned as structured
/// result data. Only precondition failures and missing external data land
/// here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("geometry error: {0}")]
    GeometryError(#[from] roomplan_geometry::Error),

    #[error("core data error: {0}")]
    CoreError(#[from] roomplan_core::Error),

    #[error("invalid optimization config: {0}")]
    InvalidConfig(String),
}
