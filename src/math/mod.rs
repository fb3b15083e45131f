//! Numeric building blocks shared by every part of the simulation
//!
//! - `vector`     free functions over `NVec3`
//! - `quaternion` orientation helpers over `NQuat`
//! - `transform`  TRS matrix composition for the renderer
//!
//! Everything here is pure: inputs are taken by reference or value and a new
//! value is returned.

pub mod vector;
pub mod quaternion;
pub mod transform;

use nalgebra::{Matrix4, Quaternion, Vector3};

pub type NVec3 = Vector3<f64>;
pub type NQuat = Quaternion<f64>;
pub type NMat4 = Matrix4<f64>;
