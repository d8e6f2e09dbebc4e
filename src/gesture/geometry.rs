//! Pure 2-D geometry helpers for landmark analysis.

/// Euclidean distance between two points.
pub fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx.hypot(dy)
}

/// Angle in degrees formed at point `b` by the segments `b→a` and `b→c`.
pub fn angle_from_points(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    let ba = [a[0] - b[0], a[1] - b[1]];
    let bc = [c[0] - b[0], c[1] - b[1]];
    let dot = ba[0] * bc[0] + ba[1] * bc[1];
    let norms = ba[0].hypot(ba[1]) * bc[0].hypot(bc[1]);
    (dot / norms).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Angle of the line from `(x1, y1)` to `(x2, y2)`, normalized to 0..360
/// degrees.
pub fn line_angle_degrees(x1: i32, y1: i32, x2: i32, y2: i32) -> f64 {
    let dx = f64::from(x2 - x1);
    let dy = f64::from(y2 - y1);

    let mut angle = dy.atan2(dx).to_degrees(); // (-180, 180]
    if angle < 0.0 {
        angle += 360.0;
    }
    angle
}
