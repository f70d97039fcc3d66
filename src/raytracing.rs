pub mod camera;
pub mod core;
pub mod math;
pub mod model;
pub mod parser;
pub mod renderer;
pub mod shading;
pub mod solid;

pub use math::*;
