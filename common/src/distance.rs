//! 距離計算（大圓距離）

use crate::types::GeoPoint;

/// 地球半徑（公里）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// haversine 公式計算兩點距離（公里）
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// 距離接近度 0.0~1.0（超過 horizon 為 0）
///
/// `1 - min(distance, horizon) / horizon`
pub fn proximity(distance_km: f64, horizon_km: f64) -> f64 {
    if !distance_km.is_finite() || horizon_km <= 0.0 {
        return 0.0;
    }
    1.0 - distance_km.max(0.0).min(horizon_km) / horizon_km
}
