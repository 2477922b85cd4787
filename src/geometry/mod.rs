//! Element placement as a pure function of progress, canvas and bitmap sizes.

pub mod layout;
