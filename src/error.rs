//! Errors raised while building bodies, systems and scenarios
//!
//! A simulation step never fails; everything that can go wrong is rejected
//! up front, when the caller creates bodies or loads configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("body '{id}' has invalid mass {mass}; non-fixed bodies need a finite mass > 0")]
    InvalidMass { id: String, mass: f64 },

    #[error("body '{id}' has invalid radius {radius}")]
    InvalidRadius { id: String, radius: f64 },

    #[error("a body with id '{0}' already exists")]
    DuplicateBody(String),

    #[error("'{owner}' references unknown body '{id}'")]
    UnknownBody { owner: String, id: String },

    #[error("field '{field}' expects {expected} components, got {got}")]
    BadVector { field: String, expected: usize, got: usize },

    #[error("unknown element symbol '{0}'")]
    UnknownElement(String),

    #[error("unknown preset '{0}'")]
    UnknownPreset(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("could not parse scenario YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type SimResult<T> = Result<T, SimError>;
