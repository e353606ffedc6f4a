use crate::math::Quadrant;
use bevy::math::{DVec2, IVec2};
use bitflags::bitflags;

bitflags! {
    /// A set of [`Direction`]s, used to report which neighbours of a fill tile changed.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirectionMask: u8 {
        const WEST = 1 << 0;
        const SOUTH = 1 << 1;
        const EAST = 1 << 2;
        const NORTH = 1 << 3;
        const NORTHWEST = 1 << 4;
        const NORTHEAST = 1 << 5;
        const SOUTHWEST = 1 << 6;
        const SOUTHEAST = 1 << 7;
    }
}

/// One of the eight neighbours of a tile, seen from that tile.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Direction {
    West = 0,
    South = 1,
    East = 2,
    North = 3,
    Northwest = 4,
    Northeast = 5,
    Southwest = 6,
    Southeast = 7,
}

struct DirectionInfo {
    /// Offset of the neighbour in tile coordinates (y grows southward).
    offset: IVec2,
    opposite: Direction,
    /// The children of the neighbour that touch this tile,
    /// ordered counter-clockwise around this tile.
    facing: &'static [Quadrant],
    mask: DirectionMask,
}

const INFO: [DirectionInfo; 8] = [
    DirectionInfo {
        offset: IVec2::new(-1, 0),
        opposite: Direction::East,
        facing: &[Quadrant::NorthEast, Quadrant::SouthEast],
        mask: DirectionMask::WEST,
    },
    DirectionInfo {
        offset: IVec2::new(0, 1),
        opposite: Direction::North,
        facing: &[Quadrant::NorthWest, Quadrant::NorthEast],
        mask: DirectionMask::SOUTH,
    },
    DirectionInfo {
        offset: IVec2::new(1, 0),
        opposite: Direction::West,
        facing: &[Quadrant::SouthWest, Quadrant::NorthWest],
        mask: DirectionMask::EAST,
    },
    DirectionInfo {
        offset: IVec2::new(0, -1),
        opposite: Direction::South,
        facing: &[Quadrant::SouthEast, Quadrant::SouthWest],
        mask: DirectionMask::NORTH,
    },
    DirectionInfo {
        offset: IVec2::new(-1, -1),
        opposite: Direction::Southeast,
        facing: &[Quadrant::SouthEast],
        mask: DirectionMask::NORTHWEST,
    },
    DirectionInfo {
        offset: IVec2::new(1, -1),
        opposite: Direction::Southwest,
        facing: &[Quadrant::SouthWest],
        mask: DirectionMask::NORTHEAST,
    },
    DirectionInfo {
        offset: IVec2::new(-1, 1),
        opposite: Direction::Northeast,
        facing: &[Quadrant::NorthEast],
        mask: DirectionMask::SOUTHWEST,
    },
    DirectionInfo {
        offset: IVec2::new(1, 1),
        opposite: Direction::Northwest,
        facing: &[Quadrant::NorthWest],
        mask: DirectionMask::SOUTHEAST,
    },
];

impl Direction {
    /// All directions, edges before corners.
    pub const ALL: [Direction; 8] = [
        Direction::West,
        Direction::South,
        Direction::East,
        Direction::North,
        Direction::Northwest,
        Direction::Northeast,
        Direction::Southwest,
        Direction::Southeast,
    ];

    /// The edges in counter-clockwise order, starting in the west.
    pub const EDGES: [Direction; 4] = [
        Direction::West,
        Direction::South,
        Direction::East,
        Direction::North,
    ];

    /// The corners in the order missing corner heights are filled in.
    pub const CORNERS: [Direction; 4] = [
        Direction::Northwest,
        Direction::Southwest,
        Direction::Southeast,
        Direction::Northeast,
    ];

    fn info(self) -> &'static DirectionInfo {
        &INFO[self as usize]
    }

    pub fn offset(self) -> IVec2 {
        self.info().offset
    }

    pub fn opposite(self) -> Direction {
        self.info().opposite
    }

    pub fn mask(self) -> DirectionMask {
        self.info().mask
    }

    /// The children of a neighbour in this direction that border this tile.
    pub fn facing_quadrants(self) -> &'static [Quadrant] {
        self.info().facing
    }

    pub fn is_edge(self) -> bool {
        (self as usize) < 4
    }

    pub fn is_corner(self) -> bool {
        !self.is_edge()
    }

    /// Whether the edge runs along the u axis.
    pub(crate) fn along_u(self) -> bool {
        matches!(self, Direction::South | Direction::North)
    }

    /// The texture coordinate along the edge.
    pub(crate) fn along(self, uv: DVec2) -> f64 {
        if self.along_u() {
            uv.x
        } else {
            uv.y
        }
    }

    /// Pins the texture coordinate perpendicular to the edge onto the edge itself.
    pub(crate) fn onto_edge(self, uv: DVec2) -> DVec2 {
        match self {
            Direction::West => DVec2::new(0.0, uv.y),
            Direction::South => DVec2::new(uv.x, 0.0),
            Direction::East => DVec2::new(1.0, uv.y),
            Direction::North => DVec2::new(uv.x, 1.0),
            _ => uv,
        }
    }

    /// Whether the coordinate along the edge increases, while walking it counter-clockwise.
    pub(crate) fn is_increasing(self) -> bool {
        matches!(self, Direction::South | Direction::East)
    }

    /// The texture coordinates of the corner.
    pub(crate) fn corner_uv(self) -> DVec2 {
        match self {
            Direction::Northwest => DVec2::new(0.0, 1.0),
            Direction::Northeast => DVec2::new(1.0, 1.0),
            Direction::Southwest => DVec2::new(0.0, 0.0),
            Direction::Southeast => DVec2::new(1.0, 0.0),
            _ => DVec2::splat(0.5),
        }
    }

    /// The edges meeting at the corner as `(previous, next)`,
    /// in counter-clockwise traversal order.
    pub(crate) fn adjacent_edges(self) -> (Direction, Direction) {
        match self {
            Direction::Northwest => (Direction::North, Direction::West),
            Direction::Southwest => (Direction::West, Direction::South),
            Direction::Southeast => (Direction::South, Direction::East),
            Direction::Northeast => (Direction::East, Direction::North),
            edge => (edge, edge),
        }
    }

    /// The corners sharing an edge with this corner, followed by the opposite corner.
    pub(crate) fn related_corners(self) -> (Direction, Direction, Direction) {
        match self {
            Direction::Northwest => (
                Direction::Southwest,
                Direction::Northeast,
                Direction::Southeast,
            ),
            Direction::Southwest => (
                Direction::Northwest,
                Direction::Southeast,
                Direction::Northeast,
            ),
            Direction::Southeast => (
                Direction::Southwest,
                Direction::Northeast,
                Direction::Northwest,
            ),
            Direction::Northeast => (
                Direction::Southeast,
                Direction::Northwest,
                Direction::Southwest,
            ),
            edge => (edge, edge, edge),
        }
    }

    /// The index among [`Self::CORNERS`].
    pub(crate) fn corner_index(self) -> usize {
        match self {
            Direction::Northwest => 0,
            Direction::Southwest => 1,
            Direction::Southeast => 2,
            Direction::Northeast => 3,
            _ => unreachable!("{self:?} is not a corner"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposites_are_symmetric() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(direction.opposite().offset(), -direction.offset());
        }
    }

    #[test]
    fn corners_face_back() {
        for corner in Direction::CORNERS {
            let quadrant = corner.facing_quadrants()[0];
            // the facing child of the neighbour lies on the side pointing back at us
            assert_eq!(quadrant.offset() * 2 - 1, -corner.offset());
            assert_eq!(Direction::CORNERS[corner.corner_index()], corner);
        }
    }

    #[test]
    fn edge_children_touch_the_edge() {
        for edge in Direction::EDGES {
            for quadrant in edge.facing_quadrants() {
                let offset = quadrant.offset() * 2 - 1;
                let back = -edge.offset();
                assert!(offset.x == back.x || offset.y == back.y);
            }
        }
    }

    #[test]
    fn masks_are_distinct() {
        let all = Direction::ALL
            .into_iter()
            .fold(DirectionMask::empty(), |mask, direction| mask | direction.mask());

        assert_eq!(all, DirectionMask::all());
    }
}
