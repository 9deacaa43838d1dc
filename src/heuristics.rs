//! Distance estimates used to guide the search. Every function takes the absolute
//! differences `dx` and `dy` between a node and the goal.

/// Signature shared by all heuristics.
pub type Heuristic = fn(f64, f64) -> f64;

/// Names accepted by [by_name].
pub const NAMES: [&str; 4] = ["manhattan", "euclidean", "octile", "chebyshev"];

/// `dx + dy`, exact for 4-connected movement.
pub fn manhattan(dx: f64, dy: f64) -> f64 {
    dx + dy
}

/// Straight line distance.
pub fn euclidean(dx: f64, dy: f64) -> f64 {
    (dx * dx + dy * dy).sqrt()
}

/// Cost of taking as many diagonal steps as possible before going straight, exact for
/// 8-connected movement with diagonal cost √2.
pub fn octile(dx: f64, dy: f64) -> f64 {
    let f = std::f64::consts::SQRT_2 - 1.0;
    if dx < dy {
        f * dx + dy
    } else {
        f * dy + dx
    }
}

/// `max(dx, dy)`.
pub fn chebyshev(dx: f64, dy: f64) -> f64 {
    dx.max(dy)
}

/// Looks up a heuristic by its lowercase name.
pub fn by_name(name: &str) -> Option<Heuristic> {
    match name {
        "manhattan" => Some(manhattan),
        "euclidean" => Some(euclidean),
        "octile" => Some(octile),
        "chebyshev" => Some(chebyshev),
        _ => None,
    }
}
