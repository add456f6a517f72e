// src/engine.rs
//! Геометрический движок
//!
//! Сборщик не реализует геометрические алгоритмы сам: объединение по ключу,
//! буфер, булева разность и упрощение вызываются через [`GeometryEngine`].
//! [`PlanarEngine`] — реализация поверх крейта `geo` в плоских координатах источников.
//!
//! Паника внутри библиотеки булевых операций (вырожденные или самопересекающиеся
//! кольца) перехватывается на границе движка и возвращается как [`GeometryError`].

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use geo::{
    BooleanOps, Buffer, CoordsIter, Geometry, MultiPolygon, Polygon, Simplify, SimplifyVw, unary_union,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::GeometryError;
use crate::feature::{Feature, Properties, geometry_name};

/// Ключ группировки при объединении
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissolveKey<'a> {
    /// Всё в одну геометрию, независимо от свойств
    All,
    /// По значению свойства; объекты без свойства образуют общую группу
    Property(&'a str),
}

/// Внешние геометрические операции, которыми пользуется сборщик
pub trait GeometryEngine: Sync {
    /// Объединяет площадные объекты с одинаковым значением ключа.
    ///
    /// Возвращает по одному объекту на значение в порядке первого появления;
    /// из свойств остаётся только сам ключ. Дыры и несвязные части сохраняются.
    fn union_by_key(
        &self,
        features: Vec<Feature>,
        key: DissolveKey<'_>,
    ) -> Result<Vec<Feature>, GeometryError>;

    /// Область вокруг геометрии на расстоянии `radius`
    fn buffer(&self, geometry: &Geometry<f64>, radius: f64) -> Result<Geometry<f64>, GeometryError>;

    /// `a` минус `b`; `None`, если от `a` ничего не осталось
    fn difference(
        &self,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
    ) -> Result<Option<Geometry<f64>>, GeometryError>;

    /// Прореживание вершин с допуском `tolerance`
    fn simplify(
        &self,
        features: Vec<Feature>,
        tolerance: f64,
        high_quality: bool,
    ) -> Result<Vec<Feature>, GeometryError>;
}

/// Реализация на `geo` в плоской системе координат
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarEngine;

impl GeometryEngine for PlanarEngine {
    fn union_by_key(
        &self,
        features: Vec<Feature>,
        key: DissolveKey<'_>,
    ) -> Result<Vec<Feature>, GeometryError> {
        let mut groups: Vec<(Option<String>, Vec<Polygon<f64>>)> = Vec::new();
        let mut slots: HashMap<Option<String>, usize> = HashMap::new();

        for feature in features {
            ensure_finite(&feature.geometry, "union")?;
            let value = match key {
                DissolveKey::All => None,
                DissolveKey::Property(k) => feature.properties.key_value(k),
            };
            let parts = to_multi_polygon(&feature.geometry, "union")?;

            let slot = *slots.entry(value.clone()).or_insert_with(|| {
                groups.push((value, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.extend(parts.0);
        }

        groups
            .into_iter()
            .map(|(value, polygons)| {
                let merged = guarded("union", || unary_union(&polygons))?;
                let mut properties = Properties::default();
                if let (DissolveKey::Property(k), Some(v)) = (key, value) {
                    properties.set_key_value(k, v);
                }
                Ok(Feature::new(collapse(merged), properties))
            })
            .collect()
    }

    fn buffer(&self, geometry: &Geometry<f64>, radius: f64) -> Result<Geometry<f64>, GeometryError> {
        if !radius.is_finite() {
            return Err(GeometryError::InvalidRadius(radius));
        }
        ensure_finite(geometry, "buffer")?;

        let buffered = guarded("buffer", || match geometry {
            Geometry::Point(g) => Some(g.buffer(radius)),
            Geometry::LineString(g) => Some(g.buffer(radius)),
            Geometry::MultiLineString(g) => Some(g.buffer(radius)),
            Geometry::Polygon(g) => Some(g.buffer(radius)),
            Geometry::MultiPolygon(g) => Some(g.buffer(radius)),
            _ => None,
        })?
        .ok_or(GeometryError::Unsupported {
            op: "buffer",
            kind: geometry_name(geometry),
        })?;

        Ok(collapse(buffered))
    }

    fn difference(
        &self,
        a: &Geometry<f64>,
        b: &Geometry<f64>,
    ) -> Result<Option<Geometry<f64>>, GeometryError> {
        ensure_finite(a, "difference")?;
        ensure_finite(b, "difference")?;
        let a = to_multi_polygon(a, "difference")?;
        let b = to_multi_polygon(b, "difference")?;

        let rest = guarded("difference", || a.difference(&b))?;
        if rest.0.is_empty() {
            Ok(None)
        } else {
            Ok(Some(collapse(rest)))
        }
    }

    fn simplify(
        &self,
        features: Vec<Feature>,
        tolerance: f64,
        high_quality: bool,
    ) -> Result<Vec<Feature>, GeometryError> {
        #[cfg(feature = "parallel")]
        let iter = features.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = features.into_iter();

        iter.map(|mut feature| {
            feature.geometry = guarded("simplify", || {
                simplify_geometry(&feature.geometry, tolerance, high_quality)
            })?;
            Ok(feature)
        })
        .collect()
    }
}

fn simplify_geometry(geometry: &Geometry<f64>, tolerance: f64, high_quality: bool) -> Geometry<f64> {
    // Visvalingam работает с площадью треугольника, а не с расстоянием
    let area = tolerance * tolerance;
    match geometry {
        Geometry::LineString(g) if high_quality => g.simplify(tolerance).into(),
        Geometry::LineString(g) => g.simplify_vw(area).into(),
        Geometry::MultiLineString(g) if high_quality => g.simplify(tolerance).into(),
        Geometry::MultiLineString(g) => g.simplify_vw(area).into(),
        Geometry::Polygon(g) if high_quality => g.simplify(tolerance).into(),
        Geometry::Polygon(g) => g.simplify_vw(area).into(),
        Geometry::MultiPolygon(g) if high_quality => g.simplify(tolerance).into(),
        Geometry::MultiPolygon(g) => g.simplify_vw(area).into(),
        other => other.clone(),
    }
}

/// Одна часть — `Polygon`, несколько (или ни одной) — `MultiPolygon`
#[must_use]
pub fn collapse(mut multi: MultiPolygon<f64>) -> Geometry<f64> {
    if multi.0.len() == 1 {
        if let Some(polygon) = multi.0.pop() {
            return Geometry::Polygon(polygon);
        }
    }
    Geometry::MultiPolygon(multi)
}

fn to_multi_polygon(
    geometry: &Geometry<f64>,
    op: &'static str,
) -> Result<MultiPolygon<f64>, GeometryError> {
    match geometry {
        Geometry::Polygon(p) => Ok(MultiPolygon::new(vec![p.clone()])),
        Geometry::MultiPolygon(mp) => Ok(mp.clone()),
        other => Err(GeometryError::Unsupported {
            op,
            kind: geometry_name(other),
        }),
    }
}

fn ensure_finite(geometry: &Geometry<f64>, op: &'static str) -> Result<(), GeometryError> {
    if geometry
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
    {
        Ok(())
    } else {
        Err(GeometryError::NonFinite { op })
    }
}

fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T, GeometryError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_owned());
        GeometryError::Panicked { op, message }
    })
}
