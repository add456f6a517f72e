// src/fixer.rs
//! Нормализация одного слоя
//!
//! Самостоятельный инструмент для одного GeoJSON: одно слияние полигонов,
//! необязательное упрощение и возврат стиля, как у этапа слияния стран.
//! Без ключа все полигоны сливаются в одну геометрию независимо от имени.

use std::path::Path;

use tracing::info;

use crate::engine::{DissolveKey, GeometryEngine};
use crate::error::BuildError;
use crate::feature::io::{read_collection, write_collection};
use crate::feature::{Feature, partition_polygonal};
use crate::pipeline::dissolve::{StyleSnapshot, country_style};
use crate::pipeline::loader::normalize_annotation;

/// Параметры нормализации
#[derive(Debug, Clone, PartialEq)]
pub struct FixOptions {
    /// Свойство, по которому сливать; `None` — всё в одну геометрию
    pub key: Option<String>,
    /// Допуск упрощения; `None` — без упрощения
    pub simplify: Option<f64>,
    /// Douglas–Peucker вместо быстрого Visvalingam
    pub high_quality: bool,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            key: None,
            simplify: None,
            high_quality: true,
        }
    }
}

/// Нормализует слой в памяти.
///
/// Результат: слитые полигоны, затем точки и линии с нормализованным `type`.
pub fn fix_layer<E: GeometryEngine + ?Sized>(
    engine: &E,
    features: Vec<Feature>,
    options: &FixOptions,
) -> Result<Vec<Feature>, BuildError> {
    let (polygons, mut others) = partition_polygonal(features);
    for feature in &mut others {
        normalize_annotation(&mut feature.properties);
    }

    let key = options
        .key
        .as_deref()
        .map_or(DissolveKey::All, DissolveKey::Property);

    let snapshot = StyleSnapshot::capture(&polygons, key);
    let mut dissolved = engine.union_by_key(polygons, key)?;

    if let Some(tolerance) = options.simplify {
        dissolved = engine.simplify(dissolved, tolerance, options.high_quality)?;
    }

    let mut fixed = snapshot.reattach(dissolved, key, country_style);
    fixed.extend(others);
    Ok(fixed)
}

/// Нормализует файл на месте
pub fn fix_file<E: GeometryEngine + ?Sized>(
    engine: &E,
    path: &Path,
    options: &FixOptions,
) -> Result<usize, BuildError> {
    let features = read_collection(path)?;
    let before = features.len();
    let fixed = fix_layer(engine, features, options)?;
    write_collection(path, &fixed)?;

    info!(
        path = %path.display(),
        before,
        after = fixed.len(),
        "Слой нормализован"
    );
    Ok(fixed.len())
}
