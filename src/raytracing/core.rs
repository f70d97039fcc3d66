use super::solid::{RayIntersectable, Solid};
use super::{Color, Interval, Ray, Vec3};

pub const DEFAULT_AMBIENT: f64 = 0.1;

/// Idealized white point light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
}

impl Light {
    pub fn new(position: Vec3) -> Light {
        Light { position }
    }
}

/// Surface response used by the shading terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// fraction of incoming light reflected diffusely
    pub albedo: f64,
    /// Kd
    pub diffuse: f64,
    /// Ks
    pub specular: f64,
    /// specular exponent
    pub shininess: f64,
    /// 0 is fully diffuse, 1 is a perfect mirror
    pub reflectivity: f64,
}

impl Default for Material {
    /// Matte surface: pure Lambert, no highlight, no mirror.
    fn default() -> Self {
        Material {
            albedo: 1.0,
            diffuse: 1.0,
            specular: 0.0,
            shininess: 1.0,
            reflectivity: 0.0,
        }
    }
}

impl Material {
    pub fn plastic() -> Material {
        Material {
            albedo: 1.0,
            diffuse: 0.9,
            specular: 0.1,
            shininess: 10.0,
            reflectivity: 0.0,
        }
    }

    pub fn metal() -> Material {
        Material {
            albedo: 1.0,
            diffuse: 0.2,
            specular: 0.8,
            shininess: 50.0,
            reflectivity: 0.8,
        }
    }

    pub fn mirror() -> Material {
        Material {
            reflectivity: 1.0,
            ..Material::metal()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub solid: Solid,
    pub color: Color,
    pub material: Material,
}

impl SceneObject {
    pub fn new(solid: impl Into<Solid>, color: Color, material: Material) -> SceneObject {
        SceneObject {
            solid: solid.into(),
            color,
            material,
        }
    }
}

/// Everything the tracer reads while rendering one frame.
///
/// Only the first light takes part in shading.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub lights: Vec<Light>,
    /// Ka
    pub ambient: f64,
}

impl Default for Scene {
    fn default() -> Self {
        Scene::new(DEFAULT_AMBIENT)
    }
}

impl Scene {
    /// Empty scene; every call allocates its own containers.
    pub fn new(ambient: f64) -> Scene {
        Scene {
            objects: Vec::new(),
            lights: Vec::new(),
            ambient,
        }
    }

    pub fn add_object(&mut self, object: SceneObject) -> &mut Self {
        self.objects.push(object);
        self
    }

    pub fn add_light(&mut self, light: Light) -> &mut Self {
        self.lights.push(light);
        self
    }

    /// The light used by the single-light shading model.
    pub fn light(&self) -> Option<&Light> {
        self.lights.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Scan everything and keep the smallest `t`; used for camera and
    /// reflection rays.
    Nearest,
    /// Stop at the first hit; used for shadow rays where only occlusion
    /// matters.
    Any,
}

#[derive(Debug, Clone, Copy)]
pub struct RaycastResult<'a> {
    pub hitted_object: &'a SceneObject,
    pub t: f64,
}

pub fn hit<'a>(
    objects: &'a [SceneObject],
    ray: &Ray,
    window: Interval,
    mode: SearchMode,
) -> Option<RaycastResult<'a>> {
    let mut closest: Option<RaycastResult<'a>> = None;
    for object in objects {
        let Some(t) = object.solid.intersect(ray, window) else {
            continue;
        };
        if mode == SearchMode::Any {
            return Some(RaycastResult {
                hitted_object: object,
                t,
            });
        }
        // strict comparison: on ties the earlier object wins
        if closest.map_or(true, |c| t < c.t) {
            closest = Some(RaycastResult {
                hitted_object: object,
                t,
            });
        }
    }
    closest
}

pub fn nearest_hit<'a>(
    objects: &'a [SceneObject],
    ray: &Ray,
    window: Interval,
) -> Option<RaycastResult<'a>> {
    hit(objects, ray, window, SearchMode::Nearest)
}

pub fn any_hit<'a>(
    objects: &'a [SceneObject],
    ray: &Ray,
    window: Interval,
) -> Option<RaycastResult<'a>> {
    hit(objects, ray, window, SearchMode::Any)
}
