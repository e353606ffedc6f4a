use bevy::math::DVec3;
use serde::{Deserialize, Serialize};

/// The shape of the surface the terrain is wrapped around.
///
/// The y axis is the polar axis, the x axis points towards the prime meridian.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum TerrainShape {
    Sphere { radius: f64 },
    Spheroid { major_axis: f64, minor_axis: f64 },
}

impl Default for TerrainShape {
    fn default() -> Self {
        Self::WGS84
    }
}

impl TerrainShape {
    pub const WGS84: Self = TerrainShape::Spheroid {
        major_axis: 6378137.0,
        minor_axis: 6356752.314245,
    };

    pub fn radii(self) -> DVec3 {
        match self {
            TerrainShape::Sphere { radius } => DVec3::splat(radius),
            TerrainShape::Spheroid {
                major_axis,
                minor_axis,
            } => DVec3::new(major_axis, minor_axis, major_axis),
        }
    }

    pub fn maximum_radius(self) -> f64 {
        self.radii().max_element()
    }

    /// The geodetic surface normal at the longitude and latitude (in radians).
    pub fn geodetic_surface_normal(self, longitude: f64, latitude: f64) -> DVec3 {
        let (sin_longitude, cos_longitude) = longitude.sin_cos();
        let (sin_latitude, cos_latitude) = latitude.sin_cos();

        DVec3::new(
            cos_latitude * cos_longitude,
            sin_latitude,
            -cos_latitude * sin_longitude,
        )
        .normalize()
    }

    /// Converts a geodetic position into local cartesian space.
    pub fn position_from_cartographic(self, longitude: f64, latitude: f64, height: f64) -> DVec3 {
        let normal = self.geodetic_surface_normal(longitude, latitude);
        let radii = self.radii();

        let scaled = radii * radii * normal;
        let gamma = normal.dot(scaled).sqrt();
        let surface_position = scaled / gamma;

        surface_position + height * normal
    }
}
