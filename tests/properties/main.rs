//! Property-based tests.

mod routing;
mod synth;
