//! # Neighbors Module
//!
//! The six face directions of a voxel and the 6-connected neighbourhood they
//! define. Two cells are neighbours iff they differ by exactly one step along
//! exactly one axis; edge and corner contacts never connect.

use cgmath::{Point3, Vector3};

/// One of the six faces of a voxel.
///
/// The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum Face {
    /// The front face (facing positive Z)
    FRONT = 0,

    /// The back face (facing negative Z)
    BACK = 1,

    /// The bottom face (facing negative Y)
    BOTTOM = 2,

    /// The top face (facing positive Y)
    TOP = 3,

    /// The left face (facing negative X)
    LEFT = 4,

    /// The right face (facing positive X)
    RIGHT = 5,
}

impl Face {
    /// Returns all six faces in a consistent order.
    pub fn all() -> [Face; 6] {
        [
            Face::FRONT,
            Face::BACK,
            Face::BOTTOM,
            Face::TOP,
            Face::LEFT,
            Face::RIGHT,
        ]
    }

    /// The unit step from a voxel to the neighbour sharing this face.
    pub fn offset(self) -> Vector3<i32> {
        match self {
            Face::FRONT => Vector3::new(0, 0, 1),
            Face::BACK => Vector3::new(0, 0, -1),
            Face::BOTTOM => Vector3::new(0, -1, 0),
            Face::TOP => Vector3::new(0, 1, 0),
            Face::LEFT => Vector3::new(-1, 0, 0),
            Face::RIGHT => Vector3::new(1, 0, 0),
        }
    }
}

/// The six face-adjacent neighbours of `coord`.
///
/// Coordinates are not clamped; callers rely on the grid treating anything
/// outside its bounds as empty.
#[inline]
pub fn neighbors6(coord: Point3<i32>) -> [Point3<i32>; 6] {
    Face::all().map(|face| coord + face.offset())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_differ_on_one_axis() {
        let origin = Point3::new(3, -2, 7);
        for n in neighbors6(origin) {
            let d = n - origin;
            assert_eq!(d.x.abs() + d.y.abs() + d.z.abs(), 1);
        }
    }

    #[test]
    fn test_neighbors_are_distinct() {
        let all = neighbors6(Point3::new(0, 0, 0));
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
