use crate::Vector2;

/// Closest point to `point` on the infinite line through `origin` along `direction`.
///
/// A zero `direction` degenerates to `origin`.
pub fn nearest_point_on_line(origin: Vector2, direction: Vector2, point: Vector2) -> Vector2 {
    let len_sq = direction.norm_squared();
    if len_sq < 1e-12 {
        return origin;
    }
    let t = (point - origin).dot(&direction) / len_sq;
    origin + direction * t
}

/// Unsigned angle between two vectors, in `[0, pi]`. Zero if either vector is zero.
pub fn angle_between(a: Vector2, b: Vector2) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < 1e-12 {
        return 0.0;
    }
    (a.dot(&b) / denom).clamp(-1.0, 1.0).acos()
}

/// Time to travel `distance` along a trapezoidal velocity profile that starts and
/// ends at rest, limited by `max_speed` and `max_acc`.
///
/// Returns `f64::INFINITY` when the limits do not allow motion at all.
pub fn trapezoidal_time(distance: f64, max_speed: f64, max_acc: f64) -> f64 {
    let distance = distance.abs();
    if distance == 0.0 {
        return 0.0;
    }
    if max_speed <= 0.0 || max_acc <= 0.0 {
        return f64::INFINITY;
    }

    // Distance covered while ramping up to (and back down from) cruise speed
    let ramp_distance = max_speed * max_speed / max_acc;
    if distance >= ramp_distance {
        2.0 * max_speed / max_acc + (distance - ramp_distance) / max_speed
    } else {
        // Triangular profile, cruise speed is never reached
        2.0 * (distance / max_acc).sqrt()
    }
}
