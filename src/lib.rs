//! Whitted-style CPU ray tracer.
//!
//! Spheres, triangles and planes lit by a single point light with
//! ambient, diffuse, specular, hard shadow and mirror reflection terms.
//! Image encoding lives in the binary; the library only fills a
//! [`raytracing::renderer::PixelBuffer`].

pub mod raytracing;
