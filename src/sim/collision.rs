//! Overlap tests between the player circle and entity shapes
//!
//! Walls need a contact normal and penetration depth so the player can be
//! pushed back out; everything else only needs a yes/no overlap.

use glam::Vec2;

use super::registry::Shape;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the obstacle surface
    pub point: Vec2,
    /// Surface normal at the contact, pointing toward the circle center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check a circle against an axis-aligned rectangle centered at `rect_center`.
///
/// Touching edges do not count as a hit, so a circle that was pushed out to
/// the boundary stays resolved.
pub fn circle_rect_collision(
    center: Vec2,
    radius: f32,
    rect_center: Vec2,
    half_extents: Vec2,
) -> CollisionResult {
    let min = rect_center - half_extents;
    let max = rect_center + half_extents;
    let closest = center.clamp(min, max);
    let offset = center - closest;
    let dist_sq = offset.length_squared();

    if dist_sq >= radius * radius {
        return CollisionResult::miss();
    }

    if dist_sq > 0.0 {
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Center is inside the rectangle: leave through the nearest face
    let to_left = center.x - min.x;
    let to_right = max.x - center.x;
    let to_bottom = center.y - min.y;
    let to_top = max.y - center.y;
    let nearest = to_left.min(to_right).min(to_bottom).min(to_top);

    let (normal, point) = if nearest == to_left {
        (Vec2::NEG_X, Vec2::new(min.x, center.y))
    } else if nearest == to_right {
        (Vec2::X, Vec2::new(max.x, center.y))
    } else if nearest == to_bottom {
        (Vec2::NEG_Y, Vec2::new(center.x, min.y))
    } else {
        (Vec2::Y, Vec2::new(center.x, max.y))
    };

    CollisionResult {
        hit: true,
        point,
        normal,
        penetration: nearest + radius,
    }
}

/// Check two circles for strict overlap
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

/// Check the player circle against any entity shape
pub fn circle_overlaps_shape(center: Vec2, radius: f32, shape: &Shape, position: Vec2) -> bool {
    match *shape {
        Shape::Circle { radius: other } => circles_overlap(center, radius, position, other),
        Shape::Rectangle { width, height } => {
            circle_rect_collision(center, radius, position, Vec2::new(width, height) / 2.0).hit
        }
    }
}

/// Remove the part of `velocity` that drives into a surface with `normal`
#[inline]
pub fn reject_into_surface(velocity: Vec2, normal: Vec2) -> Vec2 {
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity - into * normal
    } else {
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HALF: Vec2 = Vec2::new(32.0, 32.0);

    #[test]
    fn test_circle_rect_side_hit() {
        // Circle to the left of a wall, overlapping by 2
        let result = circle_rect_collision(Vec2::new(-24.0, 0.0), 14.0, Vec2::new(20.0, 0.0), HALF);
        assert!(result.hit);
        assert!((result.normal - Vec2::NEG_X).length() < 0.001);
        assert!((result.penetration - 2.0).abs() < 0.001);
        assert!((result.point - Vec2::new(-12.0, 0.0)).length() < 0.001);
    }

    #[test]
    fn test_circle_rect_corner_hit() {
        let result = circle_rect_collision(Vec2::new(40.0, 40.0), 12.0, Vec2::ZERO, HALF);
        assert!(result.hit);
        let expected = Vec2::new(1.0, 1.0).normalize();
        assert!((result.normal - expected).length() < 0.001);
    }

    #[test]
    fn test_circle_rect_touching_is_miss() {
        let result = circle_rect_collision(Vec2::new(-42.0, 0.0), 10.0, Vec2::ZERO, HALF);
        assert!(!result.hit);
    }

    #[test]
    fn test_circle_rect_center_inside() {
        let result = circle_rect_collision(Vec2::new(0.0, 30.0), 10.0, Vec2::ZERO, HALF);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 12.0).abs() < 0.001);
    }

    #[test]
    fn test_circles_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 10.0, Vec2::new(15.0, 0.0), 10.0));
        assert!(!circles_overlap(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0));
    }

    #[test]
    fn test_shape_dispatch() {
        let wall = Shape::Rectangle {
            width: 64.0,
            height: 64.0,
        };
        assert!(circle_overlaps_shape(Vec2::new(50.0, 0.0), 20.0, &wall, Vec2::ZERO));
        assert!(!circle_overlaps_shape(Vec2::new(60.0, 0.0), 20.0, &wall, Vec2::ZERO));

        let star = Shape::Circle { radius: 32.0 };
        assert!(circle_overlaps_shape(Vec2::new(50.0, 0.0), 20.0, &star, Vec2::ZERO));
    }

    #[test]
    fn test_reject_into_surface() {
        // Moving right into a surface facing left loses its x component
        let v = reject_into_surface(Vec2::new(100.0, 30.0), Vec2::NEG_X);
        assert!(v.x.abs() < 0.001);
        assert!((v.y - 30.0).abs() < 0.001);

        // Moving away is untouched
        let v = reject_into_surface(Vec2::new(-100.0, 30.0), Vec2::NEG_X);
        assert_eq!(v, Vec2::new(-100.0, 30.0));
    }
}
