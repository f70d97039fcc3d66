//! Recursive shading.
//!
//! The terms are layered instead of forming a single BRDF: the object's
//! base color is blended with its mirror reflection, darkened when the
//! light is blocked, then scaled by either the Lambert factor or the
//! full ambient + diffuse + specular combination. Each layer has its own
//! switch in [`RenderConfig`].

use super::core::{any_hit, nearest_hit, Scene};
use super::solid::RayIntersectable;
use super::{Color, Interval, Ray, Vec3};

pub const DEFAULT_MAX_BOUNCES: u32 = 4;

/// Render configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Samples per pixel; above 1 the samples are jittered inside the pixel
    pub samples_per_pixel: u32,
    /// Reflection rays traced before falling back to the background
    pub max_bounces: u32,
    pub hard_shadows: bool,
    pub reflection: bool,
    pub lambert: bool,
    /// Ambient + diffuse + specular; takes precedence over `lambert`
    pub phong: bool,
    /// Greyscale by hit distance, no lighting at all
    pub depth_shading: bool,
    /// Accepted ray parameters for camera and reflection rays
    pub hit_window: Interval,
    /// Multiplier applied to occluded points
    pub shadow_factor: f64,
    /// Distance secondary rays start above the surface
    pub surface_offset: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 1,
            max_bounces: DEFAULT_MAX_BOUNCES,
            hard_shadows: true,
            reflection: true,
            lambert: false,
            phong: true,
            depth_shading: false,
            hit_window: Interval::RENDER_DISTANCE,
            shadow_factor: 0.2,
            surface_offset: 1e-3,
        }
    }
}

/// Vertical white-to-blue gradient seen by rays that hit nothing.
pub fn sky_gradient(ray: &Ray) -> Color {
    let a = 0.5 * (ray.direction().y + 1.0);
    Vec3::one().lerp(Vec3::new(0.5, 0.7, 1.0), a)
}

/// Color seen along `ray`, which has already been reflected `bounce` times.
pub fn trace(scene: &Scene, ray: &Ray, bounce: u32, config: &RenderConfig) -> Color {
    if bounce > config.max_bounces {
        return sky_gradient(ray);
    }

    let Some(hit) = nearest_hit(&scene.objects, ray, config.hit_window) else {
        return sky_gradient(ray);
    };

    if config.depth_shading {
        let window = config.hit_window;
        let depth = (hit.t - window.min) / window.size();
        // an unbounded window has no far plane to fade towards
        let grey = if depth.is_finite() {
            (1.0 - depth).clamp(0.0, 1.0)
        } else {
            0.0
        };
        return Vec3::splat(grey);
    }

    let object = hit.hitted_object;
    let material = object.material;
    let mut color = object.color;

    let hit_point = ray.at(hit.t);
    let mut normal = object.solid.normal_at(hit_point);
    if ray.direction().dot(normal) > 0.0 {
        // back face or a ray leaving a sphere: shade the side we came from
        normal = -normal;
    }
    let origin = hit_point + normal * config.surface_offset;

    if config.reflection && material.reflectivity > 0.0 {
        let direction = ray.direction().reflect(normal);
        // the reflection of a unit vector is never degenerate
        if let Ok(reflected) = Ray::new(origin, direction) {
            let reflected_color = trace(scene, &reflected, bounce + 1, config);
            color = color.lerp(reflected_color, material.reflectivity);
        }
    }

    let Some(light) = scene.light() else {
        return color.clamp(0.0, 1.0);
    };
    let to_light = light.position - origin;
    let Ok(light_dir) = to_light.try_normalize() else {
        // light sits on the surface; nothing sensible to shade with
        return color.clamp(0.0, 1.0);
    };

    let mut in_shadow = false;
    if config.hard_shadows {
        let shadow_window = config
            .hit_window
            .with_max(to_light.len().min(config.hit_window.max));
        if let Ok(shadow_ray) = Ray::new(origin, light_dir) {
            if let Some(occluder) = any_hit(&scene.objects, &shadow_ray, shadow_window) {
                log::trace!("shadow ray blocked at t = {}", occluder.t);
                in_shadow = true;
                color *= config.shadow_factor;
            }
        }
    }

    let diffuse = material.albedo * normal.dot(light_dir).max(0.0);
    if config.phong {
        let view_dir = -ray.direction();
        let reflected_light = (-light_dir).reflect(normal);
        let specular = if in_shadow {
            0.0
        } else {
            reflected_light
                .dot(view_dir)
                .max(0.0)
                .powf(material.shininess)
        };
        let ambient = Vec3::one() * scene.ambient;
        color = ambient
            + color * diffuse * material.diffuse
            + Vec3::one() * specular * material.specular;
    } else if config.lambert {
        // ambient is the floor for surfaces turned away from the light
        color = color * diffuse.max(scene.ambient);
    }

    color.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raytracing::core::{Light, Material, SceneObject};
    use crate::raytracing::solid::{Sphere, Triangle};

    fn flat_config() -> RenderConfig {
        RenderConfig {
            hard_shadows: false,
            reflection: false,
            lambert: false,
            phong: false,
            ..RenderConfig::default()
        }
    }

    fn forward() -> Ray {
        Ray::new(Vec3::zero(), -Vec3::z_axis()).unwrap()
    }

    fn single_sphere(material: Material) -> Scene {
        let mut scene = Scene::new(0.1);
        scene.add_object(SceneObject::new(
            Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5),
            Vec3::new(0.8, 0.4, 0.2),
            material,
        ));
        scene
    }

    #[test]
    fn test_sky_gradient() {
        let up = sky_gradient(&Ray::new(Vec3::zero(), Vec3::y_axis()).unwrap());
        let down = sky_gradient(&Ray::new(Vec3::zero(), -Vec3::y_axis()).unwrap());
        assert_eq!(up, Vec3::new(0.5, 0.7, 1.0));
        assert_eq!(down, Vec3::one());
    }

    #[test]
    fn miss_returns_background() {
        let scene = Scene::default();
        let color = trace(&scene, &forward(), 0, &RenderConfig::default());
        assert_eq!(color, sky_gradient(&forward()));
    }

    #[test]
    fn flat_shading_returns_base_color() {
        let scene = single_sphere(Material::default());
        let color = trace(&scene, &forward(), 0, &flat_config());
        assert_eq!(color, Vec3::new(0.8, 0.4, 0.2));
    }

    #[test]
    fn bounce_over_limit_returns_background() {
        let scene = single_sphere(Material::default());
        let config = flat_config();
        let color = trace(&scene, &forward(), config.max_bounces + 1, &config);
        assert_eq!(color, sky_gradient(&forward()));
    }

    #[test]
    fn lambert_stays_between_ambient_and_albedo() {
        let mut scene = single_sphere(Material {
            albedo: 0.7,
            ..Material::default()
        });
        scene.add_light(Light::new(Vec3::new(1.0, 1.0, 0.0)));
        let config = RenderConfig {
            lambert: true,
            ..flat_config()
        };
        let base = Vec3::new(0.8, 0.4, 0.2);
        for dx in [-0.2, -0.1, 0.0, 0.1, 0.2] {
            let ray = Ray::new(Vec3::zero(), Vec3::new(dx, dx * 0.5, -1.0)).unwrap();
            let c = trace(&scene, &ray, 0, &config);
            assert!(c.x >= base.x * 0.1 - 1e-12 && c.x <= base.x * 0.7 + 1e-12);
            assert!(c.y >= base.y * 0.1 - 1e-12 && c.y <= base.y * 0.7 + 1e-12);
            assert!(c.z >= base.z * 0.1 - 1e-12 && c.z <= base.z * 0.7 + 1e-12);
        }
    }

    #[test]
    fn lambert_facing_away_from_the_light_keeps_ambient() {
        let mut scene = single_sphere(Material::default());
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, -10.0)));
        let config = RenderConfig {
            lambert: true,
            ..flat_config()
        };
        let c = trace(&scene, &forward(), 0, &config);
        assert!((c - Vec3::new(0.8, 0.4, 0.2) * 0.1).len() < 1e-9);
    }

    #[test]
    fn lambert_facing_the_light_is_brightest() {
        let mut scene = single_sphere(Material::default());
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, 5.0)));
        let config = RenderConfig {
            lambert: true,
            ..flat_config()
        };
        let c = trace(&scene, &forward(), 0, &config);
        assert!((c - Vec3::new(0.8, 0.4, 0.2)).len() < 1e-9);
    }

    #[test]
    fn phong_supersedes_lambert_and_includes_ambient() {
        let mut scene = single_sphere(Material::plastic());
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, 5.0)));
        let both = RenderConfig {
            lambert: true,
            phong: true,
            ..flat_config()
        };
        let phong_only = RenderConfig {
            phong: true,
            ..flat_config()
        };
        let a = trace(&scene, &forward(), 0, &both);
        let b = trace(&scene, &forward(), 0, &phong_only);
        assert_eq!(a, b);
        // light, eye and normal aligned: full diffuse and full highlight
        let expected = (Vec3::splat(0.1) + Vec3::new(0.8, 0.4, 0.2) * 0.9 + Vec3::splat(0.1))
            .clamp(0.0, 1.0);
        assert!((a - expected).len() < 1e-6);
    }

    #[test]
    fn phong_on_unlit_side_is_ambient_only() {
        let mut scene = single_sphere(Material::plastic());
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, -10.0)));
        let config = RenderConfig {
            phong: true,
            ..flat_config()
        };
        let c = trace(&scene, &forward(), 0, &config);
        assert!((c - Vec3::splat(0.1)).len() < 1e-9);
    }

    #[test]
    fn occluded_point_is_darkened() {
        let mut scene = Scene::new(0.0);
        scene.add_object(SceneObject::new(
            Sphere::new(Vec3::new(0.0, 0.0, -10.0), 0.5),
            Vec3::one(),
            Material::default(),
        ));
        scene.add_light(Light::new(Vec3::new(0.0, 10.0, -10.0)));
        let config = RenderConfig {
            hard_shadows: true,
            ..flat_config()
        };
        assert_eq!(trace(&scene, &forward(), 0, &config), Vec3::one());

        // horizontal roof between the sphere and the light, out of the
        // camera's line of sight
        scene.add_object(SceneObject::new(
            Triangle::new(
                Vec3::new(-1.0, 3.0, -11.0),
                Vec3::new(1.0, 3.0, -11.0),
                Vec3::new(0.0, 3.0, -8.0),
            )
            .unwrap(),
            Vec3::one(),
            Material::default(),
        ));
        let shadowed = trace(&scene, &forward(), 0, &config);
        assert!((shadowed - Vec3::splat(0.2)).len() < 1e-9);
    }

    #[test]
    fn occluder_behind_the_light_casts_no_shadow() {
        let mut scene = single_sphere(Material::default());
        scene.add_light(Light::new(Vec3::new(0.0, 0.0, 1.0)));
        scene.add_object(SceneObject::new(
            Sphere::new(Vec3::new(0.0, 0.0, 5.0), 1.0),
            Vec3::one(),
            Material::default(),
        ));
        let config = RenderConfig {
            hard_shadows: true,
            ..flat_config()
        };
        let color = trace(&scene, &forward(), 0, &config);
        assert_eq!(color, Vec3::new(0.8, 0.4, 0.2));
    }

    #[test]
    fn perfect_mirror_shows_what_it_reflects() {
        let scene = single_sphere(Material {
            reflectivity: 1.0,
            ..Material::default()
        });
        let config = RenderConfig {
            reflection: true,
            ..flat_config()
        };
        // straight back toward the eye: nothing there but sky
        let c = trace(&scene, &forward(), 0, &config);
        let back = Ray::new(Vec3::zero(), Vec3::z_axis()).unwrap();
        assert!((c - sky_gradient(&back)).len() < 1e-9);
    }

    #[test]
    fn half_mirror_blends_linearly() {
        let scene = single_sphere(Material {
            reflectivity: 0.5,
            ..Material::default()
        });
        let config = RenderConfig {
            reflection: true,
            ..flat_config()
        };
        let c = trace(&scene, &forward(), 0, &config);
        let back = Ray::new(Vec3::zero(), Vec3::z_axis()).unwrap();
        let expected = Vec3::new(0.8, 0.4, 0.2).lerp(sky_gradient(&back), 0.5);
        assert!((c - expected).len() < 1e-9);
    }

    #[test]
    fn depth_shading_fades_with_distance() {
        let scene = single_sphere(Material::default());
        let config = RenderConfig {
            depth_shading: true,
            ..RenderConfig::default()
        };
        let c = trace(&scene, &forward(), 0, &config);
        assert!((c.x - (1.0 - 1.5 / 50.0)).abs() < 1e-9);
        assert_eq!(c.x, c.y);
        assert_eq!(c.y, c.z);
    }

    #[test]
    fn depth_shading_with_unbounded_window_stays_finite() {
        let scene = single_sphere(Material::default());
        let config = RenderConfig {
            depth_shading: true,
            hit_window: Interval::new(f64::NEG_INFINITY, f64::INFINITY),
            ..RenderConfig::default()
        };
        let c = trace(&scene, &forward(), 0, &config);
        assert!(c.is_finite());
        assert_eq!(c, Vec3::zero());
    }

    #[test]
    fn no_light_keeps_base_color() {
        let scene = single_sphere(Material::default());
        let c = trace(&scene, &forward(), 0, &RenderConfig::default());
        assert_eq!(c, Vec3::new(0.8, 0.4, 0.2));
    }
}
