//! Чтение и запись GeoJSON
//!
//! На диске объекты хранятся как `FeatureCollection`; в памяти — как `Vec<Feature>`
//! с геометрией `geo` и типизированными свойствами.

use std::fs;
use std::path::Path;

use geo::Geometry;
use geojson::{FeatureCollection, GeoJson, JsonObject, feature::Id};
use serde_json::Value;

use super::{Feature, FeatureId, Properties};
use crate::error::BuildError;

/// Читает `FeatureCollection` из файла
pub fn read_collection(path: &Path) -> Result<Vec<Feature>, BuildError> {
    let contents = fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_collection(&contents, path)
}

/// Разбирает `FeatureCollection`; `origin` используется только в сообщениях об ошибках
pub fn parse_collection(contents: &str, origin: &Path) -> Result<Vec<Feature>, BuildError> {
    let geojson: GeoJson = contents.parse().map_err(|source| BuildError::GeoJson {
        path: origin.to_path_buf(),
        source: Box::new(source),
    })?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(BuildError::NotACollection(origin.to_path_buf()));
    };

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(index, feature)| from_geojson(feature, origin, index))
        .collect()
}

fn from_geojson(
    feature: geojson::Feature,
    origin: &Path,
    index: usize,
) -> Result<Feature, BuildError> {
    let geometry = feature.geometry.ok_or_else(|| BuildError::MissingGeometry {
        path: origin.to_path_buf(),
        index,
    })?;
    let geometry = Geometry::<f64>::try_from(geometry).map_err(|source| BuildError::GeoJson {
        path: origin.to_path_buf(),
        source: Box::new(source),
    })?;

    let id = feature.id.map(|id| match id {
        Id::Number(n) => FeatureId::Number(n),
        Id::String(s) => FeatureId::String(s),
    });

    Ok(Feature {
        geometry,
        properties: feature.properties.map(Properties::from).unwrap_or_default(),
        id,
        foreign_members: feature.foreign_members,
    })
}

/// Переводит объект обратно в GeoJSON
#[must_use]
pub fn to_geojson(feature: &Feature) -> geojson::Feature {
    let properties = match serde_json::to_value(&feature.properties) {
        Ok(Value::Object(map)) => map,
        _ => JsonObject::new(),
    };

    geojson::Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&feature.geometry))),
        id: feature.id.clone().map(|id| match id {
            FeatureId::Number(n) => Id::Number(n),
            FeatureId::String(s) => Id::String(s),
        }),
        properties: Some(properties),
        foreign_members: feature.foreign_members.clone(),
    }
}

/// Собирает `FeatureCollection` в порядке списка
#[must_use]
pub fn to_collection(features: &[Feature]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: features.iter().map(to_geojson).collect(),
        foreign_members: None,
    }
}

/// Записывает коллекцию с отступом в два пробела
pub fn write_collection(path: &Path, features: &[Feature]) -> Result<(), BuildError> {
    let json = serde_json::to_string_pretty(&to_collection(features)).map_err(|source| {
        BuildError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| BuildError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(path, json).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })
}
