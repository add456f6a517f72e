//! Ошибки сборки

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Ошибки геометрического движка
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Библиотека булевых операций упала на вырожденной геометрии.
    #[error("{op} failed on degenerate geometry: {message}")]
    Panicked { op: &'static str, message: String },

    /// Координаты содержат NaN или бесконечность.
    #[error("{op}: geometry has non-finite coordinates")]
    NonFinite { op: &'static str },

    /// Операция не определена для этого типа геометрии.
    #[error("{op} is not supported for {kind}")]
    Unsupported {
        op: &'static str,
        kind: &'static str,
    },

    /// Недопустимый радиус буфера.
    #[error("invalid buffer radius {0}")]
    InvalidRadius(f64),
}

/// Фатальные ошибки сборки: прогон прерывается целиком
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        source: Box<geojson::Error>,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid geojson in {0}, expected FeatureCollection")]
    NotACollection(PathBuf),

    #[error("Feature #{index} in {path} has no geometry")]
    MissingGeometry { path: PathBuf, index: usize },

    /// Авторская конвенция: в исходниках стран только простые полигоны.
    #[error("MultiPolygons are not allowed: country '{country}' ({path})")]
    MultiPolygonSource { country: String, path: PathBuf },

    #[error("Country '{0}' is listed in layers but has no entry in the properties table")]
    UnknownCountry(String),

    #[error("Road width table has no entry for '{sub_type}' and no fallback '{fallback}'")]
    MissingRoadWidth {
        sub_type: String,
        fallback: &'static str,
    },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
