//! Axis directions and world-rotation helpers.
//!
//! The world turns, gravity does not. Whichever of the six axis directions
//! currently lines up with world "down" is the direction the ball falls in.

use std::fmt;
use std::str::FromStr;

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::puzzle::Cell;

/// Gravity in world space.
pub const WORLD_DOWN: Vec3 = Vec3::NEG_Y;

/// One of the six axis-aligned unit steps through the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Down,
    Up,
    Backward,
    Forward,
}

impl Direction {
    /// All six directions in search order: x-, x+, y-, y+, z-, z+.
    ///
    /// The scorer breaks ties between equally good directions by this order.
    pub const ALL: [Direction; 6] = [
        Direction::Left,
        Direction::Right,
        Direction::Down,
        Direction::Up,
        Direction::Backward,
        Direction::Forward,
    ];

    /// Unit offset of one step in this direction.
    pub const fn offset(self) -> Cell {
        match self {
            Direction::Left => (-1, 0, 0),
            Direction::Right => (1, 0, 0),
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::Backward => (0, 0, -1),
            Direction::Forward => (0, 0, 1),
        }
    }

    /// The neighbouring cell one step along this direction.
    #[inline(always)]
    pub const fn step(self, (x, y, z): Cell) -> Cell {
        let (dx, dy, dz) = self.offset();
        (x + dx, y + dy, z + dz)
    }

    pub fn as_vec3(self) -> Vec3 {
        cell_position(self.offset())
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::Backward => "backward",
            Direction::Forward => "forward",
        }
    }

    /// Snaps a vector to the axis of its dominant component, keeping its sign.
    ///
    /// Equal magnitudes resolve toward x, then y.
    pub fn nearest(v: Vec3) -> Direction {
        let a = v.abs();
        if a.x >= a.y && a.x >= a.z {
            if v.x < 0.0 {
                Direction::Left
            } else {
                Direction::Right
            }
        } else if a.y >= a.z {
            if v.y < 0.0 {
                Direction::Down
            } else {
                Direction::Up
            }
        } else if v.z < 0.0 {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Direction::ALL
            .into_iter()
            .find(|d| d.name() == lowered)
            .ok_or_else(|| format!("unknown direction '{s}'"))
    }
}

/// Continuous position of a cell's center.
#[inline]
pub fn cell_position((x, y, z): Cell) -> Vec3 {
    Vec3::new(x as f32, y as f32, z as f32)
}

/// The cell whose center is nearest to `position`.
#[inline]
pub fn nearest_cell(position: Vec3) -> Cell {
    let rounded = position.round();
    (rounded.x as i32, rounded.y as i32, rounded.z as i32)
}

/// The puzzle-local direction the ball falls in under a world rotation.
///
/// World down is carried into puzzle space by the inverse rotation, then
/// snapped to its dominant axis.
pub fn release_direction(rotation: &Mat3) -> Direction {
    Direction::nearest(rotation.inverse() * WORLD_DOWN)
}

/// An axis-aligned world rotation under which `direction` points down.
pub fn rotation_toward(direction: Direction) -> Mat3 {
    Mat3::from_quat(Quat::from_rotation_arc(direction.as_vec3(), WORLD_DOWN))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_releases_down() {
        assert_eq!(release_direction(&Mat3::IDENTITY), Direction::Down);
    }

    #[test]
    fn test_rotation_toward_every_direction() {
        for direction in Direction::ALL {
            let rotation = rotation_toward(direction);
            assert_eq!(
                release_direction(&rotation),
                direction,
                "rotation toward {direction} released the wrong way"
            );
        }
    }

    #[test]
    fn test_quarter_turn_about_z_releases_sideways() {
        // +90 degrees about z carries local +x to world up, so local -x falls
        let rotation = Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert_eq!(release_direction(&rotation), Direction::Left);
    }

    #[test]
    fn test_nearest_takes_dominant_component() {
        assert_eq!(Direction::nearest(Vec3::new(0.2, -0.9, 0.1)), Direction::Down);
        assert_eq!(Direction::nearest(Vec3::new(-0.7, 0.3, 0.6)), Direction::Left);
        assert_eq!(Direction::nearest(Vec3::new(0.1, 0.1, 0.99)), Direction::Forward);
    }

    #[test]
    fn test_steps_are_unit_and_opposed() {
        for pair in Direction::ALL.chunks(2) {
            let (ax, ay, az) = pair[0].step((0, 0, 0));
            let (bx, by, bz) = pair[1].step((0, 0, 0));
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
            assert_eq!(ax.abs() + ay.abs() + az.abs(), 1);
        }
    }

    #[test]
    fn test_parse_direction_names() {
        assert_eq!("Down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!(" forward ".parse::<Direction>(), Ok(Direction::Forward));
        assert!("sideways".parse::<Direction>().is_err());
    }
}
