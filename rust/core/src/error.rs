// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core data-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised when required external data is missing
#[derive(Error, Debug)]
pub enum Error {
    #[error("no room found for space analysis: {0}")]
    RoomNotFound(String),

    #[error("unknown scene object: {0}")]
    UnknownObject(String),

    #[error("invalid scene data: {0}")]
    InvalidSceneData(String),
}
