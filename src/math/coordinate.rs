use bevy::math::IVec2;
use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// One of the four children of a tile.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq)]
pub enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::NorthWest,
        Quadrant::NorthEast,
        Quadrant::SouthWest,
        Quadrant::SouthEast,
    ];

    /// The offset of the child inside its parent, in tile sizes of the child lod.
    pub fn offset(self) -> IVec2 {
        let index = self as i32;
        IVec2::new(index % 2, index / 2)
    }

    fn from_offset(x: u32, y: u32) -> Self {
        Self::ALL[(x + 2 * y) as usize]
    }
}

/// The global coordinate and identifier of a tile.
///
/// The lod 0 contains the root tiles of the tiling scheme.
/// `x` grows towards the east and `y` grows towards the south,
/// so the row `y = 0` touches the north pole.
#[derive(
    Copy, Clone, Default, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize, Display,
)]
#[display("{lod}_{x}_{y}")]
pub struct TileCoordinate {
    /// The lod of the tile, where 0 is the coarsest level of detail.
    pub lod: u32,
    /// The x position of the tile in tile sizes.
    pub x: u32,
    /// The y position of the tile in tile sizes.
    pub y: u32,
}

impl TileCoordinate {
    pub const fn new(lod: u32, x: u32, y: u32) -> Self {
        Self { lod, x, y }
    }

    /// The number of tiles per root tile along one axis at the `lod`.
    ///
    /// Only lods of coordinates accepted by [`TilingScheme::is_valid`](crate::math::TilingScheme::is_valid)
    /// are supported.
    pub fn count(lod: u32) -> u32 {
        1 << lod
    }

    pub fn xy(&self) -> IVec2 {
        IVec2::new(self.x as i32, self.y as i32)
    }

    /// The parent of the tile, or `None` for root tiles.
    pub fn parent(self) -> Option<Self> {
        (self.lod > 0).then(|| Self::new(self.lod - 1, self.x >> 1, self.y >> 1))
    }

    /// Which child of its parent this tile is.
    pub fn quadrant(self) -> Quadrant {
        Quadrant::from_offset(self.x & 1, self.y & 1)
    }

    pub fn child(self, quadrant: Quadrant) -> Self {
        let offset = quadrant.offset().as_uvec2();

        Self::new(
            self.lod + 1,
            (self.x << 1) + offset.x,
            (self.y << 1) + offset.y,
        )
    }

    pub fn children(self) -> impl Iterator<Item = Self> {
        Quadrant::ALL
            .into_iter()
            .map(move |quadrant| self.child(quadrant))
    }

    /// Whether this tile contains the `other` tile (or is the same tile).
    pub fn contains(self, other: Self) -> bool {
        other.lod >= self.lod && {
            let shift = other.lod - self.lod;
            other.x >> shift == self.x && other.y >> shift == self.y
        }
    }
}
