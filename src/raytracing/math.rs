pub mod interval;
pub mod mat4;
pub mod ray;
pub mod vec3;

pub use interval::*;
pub use mat4::*;
pub use ray::*;
pub use vec3::*;
