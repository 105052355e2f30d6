// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Coordinates, DomainError, degrees_to_radians, distance_km, validate_radius};
use proptest::prelude::*;

#[test]
fn test_identical_points_are_zero_apart() {
    let distance: f64 = distance_km(19.076, 72.8777, 19.076, 72.8777);
    assert!(distance.abs() < f64::EPSILON);
}

#[test]
fn test_antipodal_points_are_half_circumference() {
    let distance: f64 = distance_km(0.0, 0.0, 0.0, 180.0);
    assert!((distance - 20015.09).abs() < 0.5, "got {distance}");
}

#[test]
fn test_known_city_distance() {
    // Mumbai to Pune, roughly 120 km.
    let distance: f64 = distance_km(19.076, 72.8777, 18.5204, 73.8567);
    assert!((115.0..125.0).contains(&distance), "got {distance}");
}

#[test]
fn test_distance_is_rounded_to_two_decimals() {
    let distance: f64 = distance_km(12.9716, 77.5946, 12.9352, 77.6245);
    let scaled: f64 = distance * 100.0;
    assert!((scaled - scaled.round()).abs() < 1e-6);
}

#[test]
fn test_degrees_to_radians() {
    assert!((degrees_to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
}

#[test]
fn test_coordinates_reject_out_of_range() {
    assert!(matches!(
        Coordinates::new(91.0, 0.0),
        Err(DomainError::InvalidCoordinates(_))
    ));
    assert!(matches!(
        Coordinates::new(0.0, -180.5),
        Err(DomainError::InvalidCoordinates(_))
    ));
    assert!(matches!(
        Coordinates::new(f64::NAN, 0.0),
        Err(DomainError::InvalidCoordinates(_))
    ));
}

#[test]
fn test_coordinates_from_parts_requires_both() {
    assert!(matches!(
        Coordinates::from_parts(Some(10.0), None),
        Err(DomainError::MissingCoordinates)
    ));
    let coords: Coordinates = Coordinates::from_parts(Some(10.0), Some(20.0)).unwrap();
    assert!((coords.latitude() - 10.0).abs() < f64::EPSILON);
    assert!((coords.longitude() - 20.0).abs() < f64::EPSILON);
}

#[test]
fn test_validate_radius() {
    assert!(validate_radius(25.0, 500.0).is_ok());
    assert!(matches!(
        validate_radius(0.0, 500.0),
        Err(DomainError::InvalidRadius(_))
    ));
    assert!(matches!(
        validate_radius(-5.0, 500.0),
        Err(DomainError::InvalidRadius(_))
    ));
    assert!(matches!(
        validate_radius(f64::INFINITY, 500.0),
        Err(DomainError::InvalidRadius(_))
    ));
    assert!(matches!(
        validate_radius(501.0, 500.0),
        Err(DomainError::InvalidRadius(_))
    ));
}

proptest! {
    #[test]
    fn prop_distance_is_symmetric(
        lat1 in -90.0..=90.0f64,
        lon1 in -180.0..=180.0f64,
        lat2 in -90.0..=90.0f64,
        lon2 in -180.0..=180.0f64,
    ) {
        let forward: f64 = distance_km(lat1, lon1, lat2, lon2);
        let backward: f64 = distance_km(lat2, lon2, lat1, lon1);
        prop_assert!((forward - backward).abs() <= 0.011);
    }

    #[test]
    fn prop_distance_to_self_is_zero(lat in -90.0..=90.0f64, lon in -180.0..=180.0f64) {
        prop_assert!(distance_km(lat, lon, lat, lon).abs() < f64::EPSILON);
    }

    #[test]
    fn prop_distance_is_bounded(
        lat1 in -90.0..=90.0f64,
        lon1 in -180.0..=180.0f64,
        lat2 in -90.0..=90.0f64,
        lon2 in -180.0..=180.0f64,
    ) {
        let distance: f64 = distance_km(lat1, lon1, lat2, lon2);
        prop_assert!((0.0..=20015.1).contains(&distance));
    }
}
