//! Closest-hit ray queries against walls and closed doors
//!
//! Pure and side-effect free, so the renderer can call these as often as it
//! likes (e.g. to clip a guard's vision cone every frame).

use glam::Vec2;

use super::geometry::{Rect, segment_intersection};
use super::state::{Agent, Level};
use crate::heading_vec;

/// Nearest hit of `start -> end` against the edges of `rect`, as a ray fraction
fn nearest_edge_hit(start: Vec2, end: Vec2, rect: &Rect) -> Option<(f32, Vec2)> {
    rect.edges()
        .iter()
        .filter_map(|&(a, b)| segment_intersection(start, end, a, b))
        .min_by(|a, b| a.0.total_cmp(&b.0))
}

/// First point where the ray `start -> end` meets a wall or closed door.
///
/// Walls are tested in their own rotated frame and the hit is mapped back to
/// world space. Returns `end` when nothing is in the way.
pub fn closest_ray_hit(start: Vec2, end: Vec2, level: &Level) -> Vec2 {
    let mut best = end;
    let mut best_dist = f32::INFINITY;

    for wall in &level.walls {
        let center = wall.rect.center();
        let rot = Vec2::from_angle(wall.rotation.to_radians());
        let inv = Vec2::from_angle(-wall.rotation.to_radians());
        let local_start = inv.rotate(start - center);
        let local_end = inv.rotate(end - center);
        if let Some((_, hit)) = nearest_edge_hit(local_start, local_end, &wall.rect.local()) {
            let world = center + rot.rotate(hit);
            let d = start.distance_squared(world);
            if d < best_dist {
                best_dist = d;
                best = world;
            }
        }
    }

    for door in level.doors.iter().filter(|d| !d.is_open) {
        if let Some((_, hit)) = nearest_edge_hit(start, end, &door.rect) {
            let d = start.distance_squared(hit);
            if d < best_dist {
                best_dist = d;
                best = hit;
            }
        }
    }

    best
}

/// Outline of what `agent` can see: its position followed by `rays` clipped
/// ray endpoints fanned across the sight cone.
///
/// Inactive agents get an empty outline.
pub fn vision_cone(agent: &Agent, level: &Level, rays: usize) -> Vec<Vec2> {
    if !agent.active || rays == 0 {
        return Vec::new();
    }

    let half = agent.sight_angle / 2.0;
    let mut points = Vec::with_capacity(rays + 1);
    points.push(agent.pos);
    for i in 0..rays {
        // A lone ray looks straight ahead
        let t = if rays == 1 {
            0.5
        } else {
            i as f32 / (rays - 1) as f32
        };
        let heading = agent.rotation - half + t * agent.sight_angle;
        let end = agent.pos + heading_vec(heading) * agent.sight_range;
        points.push(closest_ray_hit(agent.pos, end, level));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{AiKind, Door, Identity, PermissionLevel, Wall};

    #[test]
    fn test_no_obstacles_returns_end() {
        let end = Vec2::new(100.0, 0.0);
        assert_eq!(closest_ray_hit(Vec2::ZERO, end, &Level::default()), end);
    }

    #[test]
    fn test_hits_near_face() {
        let level = Level {
            walls: vec![
                Wall::new(Rect::new(60.0, -10.0, 5.0, 20.0), 0.0),
                Wall::new(Rect::new(30.0, -10.0, 5.0, 20.0), 0.0),
            ],
            ..Default::default()
        };
        let hit = closest_ray_hit(Vec2::ZERO, Vec2::new(100.0, 0.0), &level);
        assert!((hit - Vec2::new(30.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_rotated_wall_hit_in_world_space() {
        // 40x4 bar centered at (50, 0), rotated 90°: its near face is x = 48
        let level = Level {
            walls: vec![Wall::new(
                Rect::centered(Vec2::new(50.0, 0.0), Vec2::new(40.0, 4.0)),
                90.0,
            )],
            ..Default::default()
        };
        let hit = closest_ray_hit(Vec2::new(0.0, 5.0), Vec2::new(100.0, 5.0), &level);
        assert!((hit - Vec2::new(48.0, 5.0)).length() < 1e-3);
    }

    #[test]
    fn test_open_door_ignored() {
        let mut level = Level {
            doors: vec![Door::new(
                Rect::new(20.0, -10.0, 5.0, 20.0),
                PermissionLevel::Staff,
            )],
            ..Default::default()
        };
        let end = Vec2::new(100.0, 0.0);
        let hit = closest_ray_hit(Vec2::ZERO, end, &level);
        assert!((hit - Vec2::new(20.0, 0.0)).length() < 1e-3);

        level.doors[0].is_open = true;
        assert_eq!(closest_ray_hit(Vec2::ZERO, end, &level), end);
    }

    #[test]
    fn test_vision_cone_clipped() {
        let level = Level {
            walls: vec![Wall::new(Rect::new(40.0, -100.0, 5.0, 200.0), 0.0)],
            ..Default::default()
        };
        let agent = Agent::enemy(AiKind::Guardian, Vec2::ZERO, 0.0, Identity::guard())
            .with_sight(100.0, 60.0);
        let cone = vision_cone(&agent, &level, 7);
        assert_eq!(cone.len(), 8);
        assert_eq!(cone[0], Vec2::ZERO);
        for p in &cone[1..] {
            assert!((p.x - 40.0).abs() < 1e-2);
        }
    }

    #[test]
    fn test_single_ray_follows_heading() {
        let agent = Agent::enemy(AiKind::Walker, Vec2::ZERO, 90.0, Identity::guard())
            .with_sight(100.0, 60.0);
        let cone = vision_cone(&agent, &Level::default(), 1);
        assert_eq!(cone.len(), 2);
        assert!(cone[1].x.abs() < 1e-3);
        assert!((cone[1].y - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_vision_cone_inactive() {
        let mut agent = Agent::enemy(AiKind::Guardian, Vec2::ZERO, 0.0, Identity::guard());
        agent.active = false;
        assert!(vision_cone(&agent, &Level::default(), 5).is_empty());
    }
}
