//! Wavefront OBJ import.
//!
//! Polygons are fan-triangulated around their first vertex, so a quad
//! `a b c d` becomes `a b c` and `a c d`, sharing the `a-c` diagonal.
//! Faces whose vertices are collinear after transforming are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, warn};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};
use thiserror::Error;

use super::solid::Triangle;
use super::{Mat4, Vec3};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ parse error: {0}")]
    Obj(#[from] obj::ObjError),
    #[error("face {face} references vertex {index}, but only {count} are defined")]
    IndexOutOfRange {
        face: usize,
        index: usize,
        count: usize,
    },
    #[error("model contains no usable triangles")]
    Empty,
}

fn polygon_indices(polygon: &Polygon) -> Vec<usize> {
    match polygon {
        Polygon::P(indices) => indices.clone(),
        Polygon::PT(indices) | Polygon::PN(indices) => indices.iter().map(|(p, _)| *p).collect(),
        Polygon::PTN(indices) => indices.iter().map(|(p, _, _)| *p).collect(),
    }
}

fn triangles_from_raw(raw: &RawObj, transform: &Mat4) -> Result<Vec<Triangle>, ModelError> {
    let positions: Vec<Vec3> = raw
        .positions
        .iter()
        .map(|&(x, y, z, _)| transform.apply([x, y, z].into()))
        .collect();

    let mut triangles = Vec::new();
    let mut skipped = 0;
    for (face, polygon) in raw.polygons.iter().enumerate() {
        let indices = polygon_indices(polygon);
        if let Some(&index) = indices.iter().find(|&&i| i >= positions.len()) {
            return Err(ModelError::IndexOutOfRange {
                face,
                index,
                count: positions.len(),
            });
        }
        if indices.len() < 3 {
            continue;
        }
        let a = positions[indices[0]];
        for pair in indices[1..].windows(2) {
            match Triangle::new(a, positions[pair[0]], positions[pair[1]]) {
                Ok(triangle) => triangles.push(triangle),
                Err(_) => skipped += 1,
            }
        }
    }

    if skipped > 0 {
        warn!("skipped {} degenerate triangle(s)", skipped);
    }
    if triangles.is_empty() {
        return Err(ModelError::Empty);
    }
    Ok(triangles)
}

pub fn parse_triangles(input: impl BufRead, transform: &Mat4) -> Result<Vec<Triangle>, ModelError> {
    let raw = parse_obj(input)?;
    triangles_from_raw(&raw, transform)
}

pub fn load_triangles(path: impl AsRef<Path>, transform: &Mat4) -> Result<Vec<Triangle>, ModelError> {
    let path = path.as_ref();
    let input = BufReader::new(File::open(path)?);
    let triangles = parse_triangles(input, transform)?;
    debug!("loaded {} triangles from {}", triangles.len(), path.display());
    Ok(triangles)
}
