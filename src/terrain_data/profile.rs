//! Height profiles along the edges of a mesh, used to compare the boundaries of neighbouring meshes.

use crate::{
    fill::Direction,
    terrain_data::TerrainMesh,
    util::{equals_epsilon, inverse_mix, mix, EPSILON5},
};
use bevy::math::DVec2;
use itertools::Itertools;

impl TerrainMesh {
    /// The heights along one side of the mesh, ordered by the texture coordinate along that side.
    pub(crate) fn edge_profile(&self, side: Direction) -> HeightProfile {
        let along_u = matches!(side, Direction::South | Direction::North);

        let samples = self
            .edge_indices(side)
            .iter()
            .map(|&index| {
                let uv = self.uv(index as usize);
                let t = if along_u { uv.x } else { uv.y };
                DVec2::new(t, self.height(index as usize))
            })
            .collect();

        HeightProfile::new(samples)
    }
}

/// An ordered sequence of `(coordinate along an edge, height)` samples.
///
/// The coordinate increases monotonically and the profile always covers
/// both endpoints `0.0` and `1.0`.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct HeightProfile {
    samples: Vec<DVec2>,
}

impl HeightProfile {
    pub(crate) fn new(mut samples: Vec<DVec2>) -> Self {
        samples.sort_by(|a, b| a.x.total_cmp(&b.x));
        samples.dedup_by(|a, b| equals_epsilon(a.x, b.x));

        if let Some(&first) = samples.first() {
            if first.x > EPSILON5 {
                samples.insert(0, DVec2::new(0.0, first.y));
            }
        }
        if let Some(&last) = samples.last() {
            if last.x < 1.0 - EPSILON5 {
                samples.push(DVec2::new(1.0, last.y));
            }
        }

        Self { samples }
    }

    pub(crate) fn samples(&self) -> &[DVec2] {
        &self.samples
    }

    /// Linearly interpolates the height at the coordinate `t` along the edge.
    pub(crate) fn height_at(&self, t: f64) -> Option<f64> {
        let index = self.samples.partition_point(|sample| sample.x < t);

        if let Some(sample) = self.samples.get(index) {
            if equals_epsilon(sample.x, t) || index == 0 {
                return Some(sample.y);
            }
        }

        self.samples
            .iter()
            .tuple_windows()
            .find(|(start, end)| start.x <= t && t <= end.x)
            .map(|(start, end)| mix(start.y, end.y, inverse_mix(start.x, end.x, t)))
            .or_else(|| self.samples.last().map(|sample| sample.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates() {
        let profile = HeightProfile::new(vec![
            DVec2::new(0.5, 20.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(1.0, 40.0),
        ]);

        assert_eq!(profile.samples().len(), 3);
        assert_eq!(profile.height_at(0.0), Some(10.0));
        assert_eq!(profile.height_at(0.25), Some(15.0));
        assert_eq!(profile.height_at(0.5), Some(20.0));
        assert_eq!(profile.height_at(0.75), Some(30.0));
        assert_eq!(profile.height_at(1.0), Some(40.0));
    }

    #[test]
    fn covers_endpoints() {
        let profile = HeightProfile::new(vec![DVec2::new(0.5, 7.0)]);

        assert_eq!(
            profile.samples(),
            &[
                DVec2::new(0.0, 7.0),
                DVec2::new(0.5, 7.0),
                DVec2::new(1.0, 7.0)
            ]
        );
    }
}
