//! Общие заготовки для тестов

use geo::{Area, Geometry, LineString, Point, Polygon};

use crate::feature::{Feature, FeatureKind, Properties};

/// Квадрат со стороной `size` и левым нижним углом в (`x`, `y`)
pub fn square(x: f64, y: f64, size: f64) -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(
        LineString::from(vec![
            (x, y),
            (x + size, y),
            (x + size, y + size),
            (x, y + size),
            (x, y),
        ]),
        vec![],
    ))
}

pub fn point(x: f64, y: f64) -> Geometry<f64> {
    Geometry::Point(Point::new(x, y))
}

pub fn line(coords: &[(f64, f64)]) -> Geometry<f64> {
    Geometry::LineString(LineString::from(coords.to_vec()))
}

pub fn area(geometry: &Geometry<f64>) -> f64 {
    geometry.unsigned_area()
}

/// Объект с одним только именем
pub fn named(name: &str, geometry: Geometry<f64>) -> Feature {
    Feature::new(
        geometry,
        Properties {
            name: Some(name.to_owned()),
            ..Properties::default()
        },
    )
}

/// Объект с именем и типом
pub fn typed(name: &str, kind: &str, geometry: Geometry<f64>) -> Feature {
    let mut feature = named(name, geometry);
    feature.properties.kind = Some(FeatureKind::from(kind));
    feature
}
