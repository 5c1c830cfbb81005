#![warn(missing_docs)]
//! Deterministic scenario surfaces for driving whole placement frames.

mod fonts;
mod scenario;
mod sink;

pub use fonts::*;
pub use scenario::*;
pub use sink::*;
