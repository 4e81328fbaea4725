//! Miscellaneous runtime utilities for the facilitator binary.

mod sig_down;

pub use sig_down::SigDown;
