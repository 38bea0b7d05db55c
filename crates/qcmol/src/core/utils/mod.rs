//! Small numeric helpers shared by the engine and the I/O layer.

pub mod geometry;
