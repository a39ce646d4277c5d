//! Geographic-to-pixel projection seam.
//!
//! The engines never project coordinates themselves: the host map supplies a
//! forward/backward transform for the current zoom level through the
//! [`Projector`] trait. The pair must be true inverses of one another at any
//! given call time; the engine does not validate this.

use crate::types::{PixelPoint, Position};

/// Bidirectional geographic-to-pixel transform at the current zoom.
pub trait Projector {
    /// Forward projection of a geographic position to pixel space.
    fn project(&self, position: Position) -> PixelPoint;

    /// Inverse projection of a pixel point back to a geographic position.
    fn unproject(&self, point: PixelPoint) -> Position;
}

/// Adapter wrapping a pair of caller-supplied closures.
///
/// # Example
///
/// ```rust
/// use gridclust::{FnProjector, PixelPoint, Position, Projector};
///
/// // A trivial equirectangular mapping.
/// let projector = FnProjector::new(
///     |pos: Position| PixelPoint::new(pos.lng, -pos.lat),
///     |point: PixelPoint| Position::new(-point.y, point.x),
/// );
/// let point = projector.project(Position::new(10.0, 20.0));
/// assert_eq!(projector.unproject(point), Position::new(10.0, 20.0));
/// ```
pub struct FnProjector<P, U>
where
    P: Fn(Position) -> PixelPoint,
    U: Fn(PixelPoint) -> Position,
{
    project: P,
    unproject: U,
}

impl<P, U> FnProjector<P, U>
where
    P: Fn(Position) -> PixelPoint,
    U: Fn(PixelPoint) -> Position,
{
    /// Wrap a forward/backward closure pair.
    pub fn new(project: P, unproject: U) -> Self {
        Self { project, unproject }
    }
}

impl<P, U> Projector for FnProjector<P, U>
where
    P: Fn(Position) -> PixelPoint,
    U: Fn(PixelPoint) -> Position,
{
    fn project(&self, position: Position) -> PixelPoint {
        (self.project)(position)
    }

    fn unproject(&self, point: PixelPoint) -> Position {
        (self.unproject)(point)
    }
}

/// Spherical web-mercator projection (EPSG:3857) with 256px tiles.
///
/// The projection used by the common slippy-map widgets. Latitude is clamped
/// to the mercator domain before projecting.
#[derive(Debug, Clone, Copy)]
pub struct SphericalMercator {
    scale: f64,
}

/// Latitude bound of the square web-mercator world.
const MAX_MERCATOR_LAT: f64 = 85.05112878;

impl SphericalMercator {
    /// Create a projector for the given integer zoom level.
    pub fn new(zoom: u8) -> Self {
        Self {
            scale: 256.0 * f64::powi(2.0, zoom as i32),
        }
    }
}

impl Projector for SphericalMercator {
    fn project(&self, position: Position) -> PixelPoint {
        let lat = position.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        let lat_rad = lat.to_radians();

        let x = (position.lng + 180.0) / 360.0 * self.scale;
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * self.scale;

        PixelPoint::new(x, y)
    }

    fn unproject(&self, point: PixelPoint) -> Position {
        let lng = point.x / self.scale * 360.0 - 180.0;
        let n = std::f64::consts::PI * (1.0 - 2.0 * point.y / self.scale);
        let lat = n.sinh().atan().to_degrees();

        Position::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_round_trip() {
        let projector = SphericalMercator::new(12);
        for &(lat, lng) in &[(0.0, 0.0), (48.8566, 2.3522), (-33.8688, 151.2093)] {
            let point = projector.project(Position::new(lat, lng));
            let back = projector.unproject(point);
            assert!((back.lat - lat).abs() < 1e-9, "lat {lat} -> {}", back.lat);
            assert!((back.lng - lng).abs() < 1e-9, "lng {lng} -> {}", back.lng);
        }
    }

    #[test]
    fn test_mercator_origin_is_top_left() {
        let projector = SphericalMercator::new(0);
        let top_left = projector.project(Position::new(MAX_MERCATOR_LAT, -180.0));
        assert!(top_left.x.abs() < 1e-6);
        assert!(top_left.y.abs() < 1e-6);

        let bottom_right = projector.project(Position::new(-MAX_MERCATOR_LAT, 180.0));
        assert!((bottom_right.x - 256.0).abs() < 1e-6);
        assert!((bottom_right.y - 256.0).abs() < 1e-6);
    }

    #[test]
    fn test_mercator_scale_doubles_per_zoom() {
        let z0 = SphericalMercator::new(0);
        let z1 = SphericalMercator::new(1);
        let position = Position::new(45.0, 45.0);
        let p0 = z0.project(position);
        let p1 = z1.project(position);
        assert!((p1.x - 2.0 * p0.x).abs() < 1e-9);
        assert!((p1.y - 2.0 * p0.y).abs() < 1e-9);
    }
}
