// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::collections::TryReserveError;
use std::fmt;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Allocation failure, or the id space is exhausted
    OutOfMemory,

    /// Entity id is not live
    EntityNotFound,

    /// No registration with the requested (component, role) pair
    KeyNotFound,

    /// Component type was never declared in the schema
    UnknownComponent(&'static str),

    /// The same component type appears twice in one bundle
    DuplicateComponent(&'static str),

    /// Data components must carry data; declare zero-sized types as markers
    ZeroSizedComponent(&'static str),

    /// Marker components must be zero-sized
    MarkerNotEmpty(&'static str),

    /// The schema is limited to one machine word of component kinds
    TooManyComponents,

    /// A schema with no component kinds is forbidden
    EmptySchema,
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::OutOfMemory => write!(f, "out of memory"),
            EcsError::EntityNotFound => write!(f, "entity not found"),
            EcsError::KeyNotFound => write!(f, "no registration matches the key"),
            EcsError::UnknownComponent(name) => {
                write!(f, "component {name} is not declared in the schema")
            }
            EcsError::DuplicateComponent(name) => {
                write!(f, "component {name} appears more than once in the bundle")
            }
            EcsError::ZeroSizedComponent(name) => {
                write!(f, "component {name} is zero-sized; declare it as a marker")
            }
            EcsError::MarkerNotEmpty(name) => {
                write!(f, "marker {name} carries data; declare it as a component")
            }
            EcsError::TooManyComponents => write!(f, "schema exceeds 64 component kinds"),
            EcsError::EmptySchema => write!(f, "schema declares no component kinds"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<TryReserveError> for EcsError {
    fn from(_: TryReserveError) -> Self {
        EcsError::OutOfMemory
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;
