//! Wireframe helpers for light visualisation.
//!
//! Point lights are drawn as four great circles of their radius; spot lights
//! as the inner and outer cone rims at their reach plus four lines from the
//! apex to the outer rim. Each circle uses `segments` line segments.

use glam::{Quat, Vec3};

use crate::resources::rendercache::DebugLine;

/// Circle in the plane spanned by the unit vectors `a` and `b`.
pub fn circle(center: Vec3, a: Vec3, b: Vec3, radius: f32, segments: u32, color: Vec3) -> Vec<DebugLine> {
    let segments = segments.max(3);
    let step = std::f32::consts::TAU / segments as f32;
    let point = |i: u32| {
        let (sin, cos) = (i as f32 * step).sin_cos();
        center + (a * cos + b * sin) * radius
    };
    (0..segments)
        .map(|i| DebugLine::new(point(i), point(i + 1), color))
        .collect()
}

pub fn point_light_sphere(center: Vec3, radius: f32, segments: u32, color: Vec3) -> Vec<DebugLine> {
    let diagonal = Quat::from_rotation_y(std::f32::consts::FRAC_PI_4) * Vec3::X;
    let mut lines = circle(center, Vec3::X, Vec3::Y, radius, segments, color);
    lines.extend(circle(center, Vec3::X, Vec3::Z, radius, segments, color));
    lines.extend(circle(center, Vec3::Y, Vec3::Z, radius, segments, color));
    lines.extend(circle(center, diagonal, Vec3::Y, radius, segments, color));
    lines
}

/// Cone opening along `rotation * -Z`. Cutoffs are half-angles in degrees.
pub fn spot_light_cone(
    apex: Vec3,
    rotation: Quat,
    distance: f32,
    inner_cutoff: f32,
    outer_cutoff: f32,
    segments: u32,
    color: Vec3,
) -> Vec<DebugLine> {
    let forward = rotation * Vec3::NEG_Z;
    let right = rotation * Vec3::X;
    let up = rotation * Vec3::Y;
    let center = apex + forward * distance;
    let inner_radius = distance * inner_cutoff.to_radians().tan();
    let outer_radius = distance * outer_cutoff.to_radians().tan();

    let mut lines = circle(center, right, up, inner_radius, segments, color * 0.5);
    lines.extend(circle(center, right, up, outer_radius, segments, color));
    for rim in [right, up, -right, -up] {
        lines.push(DebugLine::new(apex, center + rim * outer_radius, color));
    }
    lines
}
