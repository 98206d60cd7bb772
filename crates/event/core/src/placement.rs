//! Guard ring and proximity geometry.

use crate::types::Position;

/// Spawn request for one guard: where to place it and which way it faces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GuardSpawn {
    pub position: Position,
    /// Yaw in degrees, oriented toward the drop point.
    pub facing_deg: f32,
}

/// Places `count` guards evenly around `center` on a circle of `radius`
/// meters, each facing the center.
///
/// Guard `i` sits at angle `i * 360 / count` degrees. A zero count yields an
/// empty ring rather than dividing by zero; the caller then proceeds with an
/// empty roster.
pub fn guard_ring(center: Position, count: u32, radius: f32) -> Vec<GuardSpawn> {
    if count == 0 {
        return Vec::new();
    }

    let step = 360.0 / count as f32;
    (0..count)
        .map(|i| {
            let angle_deg = i as f32 * step;
            let angle = angle_deg.to_radians();
            let position = Position::new(
                center.x + radius * angle.cos(),
                center.y,
                center.z + radius * angle.sin(),
            );
            GuardSpawn {
                position,
                facing_deg: (angle_deg + 180.0) % 360.0,
            }
        })
        .collect()
}

/// Flat-plane membership test for the guarded area around a drop point.
///
/// Used to veto unrelated world actions (e.g. construction) near a live
/// event. The radius is fixed per event system, not per profile.
pub fn within_guarded_radius(center: &Position, position: &Position, radius: f32) -> bool {
    center.flat_distance(position) <= radius
}
