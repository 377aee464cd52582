pub mod bridge;
pub mod docker;

pub use bridge::*;
pub use docker::*;
