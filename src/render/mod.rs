//! Draw surfaces that execute a [`crate::FramePlan`].

/// Surface contract and plan replay.
pub mod backend;
/// `vello_cpu` raster surface.
pub mod cpu;
