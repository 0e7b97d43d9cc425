#![deny(unsafe_op_in_unsafe_fn)]

pub mod vec3;
pub mod quat;
pub mod relativity;
pub mod error;
pub mod mission;
pub mod phase;
pub mod interpolate;
pub mod clock;
pub mod orientation;
pub mod colour;
pub mod starfield;
pub mod optics;
pub mod kinematics;
pub mod image;
pub mod config;
pub mod frame;
