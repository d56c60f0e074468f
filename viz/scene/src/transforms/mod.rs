//! Built-in transform implementations, one module per provider type.

pub mod seismic;
pub mod surface;
pub mod wellbore;
