//! Frame conversions between geodetic, local NED and grid coordinates.
//!
//! The local frame is an equirectangular tangent plane around the home position,
//! scaled with the WGS-84 meters-per-degree series at the home latitude. Over the
//! few kilometers a mission covers this stays well below a meter of error and the
//! inverse is exact. Very close to a pole the longitude scale is clamped to one meter
//! per degree in both directions.

use crate::models::{GeodeticPosition, GridCell, LocalPosition};

/// Mean Earth radius used for great-circle distances.
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle (haversine) ground distance between two positions, ignoring altitude.
pub fn great_circle_distance(from: &GeodeticPosition, to: &GeodeticPosition) -> f64 {
    let (lat_from, lat_to) = (from.latitude.to_radians(), to.latitude.to_radians());
    let half_dlat = (to.latitude - from.latitude).to_radians() / 2.0;
    let half_dlon = (to.longitude - from.longitude).to_radians() / 2.0;
    let h = half_dlat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_dlon.sin().powi(2);
    2.0 * MEAN_EARTH_RADIUS_M * h.sqrt().asin()
}

pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// Longitude scale of the local frame. Collapses toward zero at the poles, so it is
/// floored at one meter per degree.
fn local_lon_scale(home_lat_deg: f64) -> f64 {
    meters_per_deg_lon(home_lat_deg).max(1.0)
}

/// Project a geodetic position into the NED frame anchored at `home`.
pub fn global_to_local(position: &GeodeticPosition, home: &GeodeticPosition) -> LocalPosition {
    LocalPosition {
        north: (position.latitude - home.latitude) * meters_per_deg_lat(home.latitude),
        east: (position.longitude - home.longitude) * local_lon_scale(home.latitude),
        down: -(position.altitude - home.altitude),
    }
}

/// Inverse of [`global_to_local`].
pub fn local_to_global(position: &LocalPosition, home: &GeodeticPosition) -> GeodeticPosition {
    GeodeticPosition {
        latitude: home.latitude + position.north / meters_per_deg_lat(home.latitude),
        longitude: home.longitude + position.east / local_lon_scale(home.latitude),
        altitude: home.altitude - position.down,
    }
}

pub fn grid_to_local(cell: &GridCell, north_offset: f64, east_offset: f64) -> LocalPosition {
    LocalPosition {
        north: cell.north as f64 + north_offset,
        east: cell.east as f64 + east_offset,
        down: -(cell.altitude as f64),
    }
}

/// Grid cell containing `position`. Altitude is the non-negative ceiling of the height above home.
pub fn local_to_grid(position: &LocalPosition, north_offset: f64, east_offset: f64) -> GridCell {
    GridCell {
        north: (position.north - north_offset).floor() as i64,
        east: (position.east - east_offset).floor() as i64,
        altitude: position.altitude().ceil().max(0.0) as i64,
    }
}
