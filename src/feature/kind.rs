// src/feature/kind.rs
//! Типы объектов карты
//!
//! Свойство `type` в исходных файлах — строка. Здесь оно разбирается в закрытое
//! перечисление: природные слои и дороги несут собственные константы стиля,
//! типы стран задаются авторами проекта и остаются строками (`Other`).

use std::fmt;

use serde::{Deserialize, Serialize};

/// Стиль заливки объекта карты
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub fill_opacity: f64,
}

/// Природный слой (фон, не участвует в разрешении перекрытий)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Terrain {
    Water,
    Sand,
    Grass,
}

impl Terrain {
    /// Порядок, в котором слои попадают в общий пул компонентов
    pub const ALL: [Terrain; 3] = [Terrain::Water, Terrain::Sand, Terrain::Grass];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Terrain::Water => "water",
            Terrain::Sand => "sand",
            Terrain::Grass => "grass",
        }
    }

    #[must_use]
    pub fn style(self) -> Style {
        let color = match self {
            Terrain::Water => "#75cff0",
            Terrain::Sand => "#efe9e1",
            Terrain::Grass => "#d1e6be",
        };
        Style {
            fill: color,
            stroke: color,
            fill_opacity: 1.0,
        }
    }

    /// Имя исходного файла в каталоге `nature/`
    #[must_use]
    pub fn source_file(self) -> String {
        format!("{}.geojson", self.as_str())
    }
}

/// Класс дороги
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoadClass {
    White,
    Yellow,
    Orange,
}

impl RoadClass {
    /// Порядок, в котором дороги попадают в общий пул компонентов
    pub const ALL: [RoadClass; 3] = [RoadClass::White, RoadClass::Yellow, RoadClass::Orange];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::White => "white_road",
            RoadClass::Yellow => "yellow_road",
            RoadClass::Orange => "orange_road",
        }
    }

    #[must_use]
    pub fn style(self) -> Style {
        let color = match self {
            RoadClass::White => "#fff",
            RoadClass::Yellow => "#ffc107",
            RoadClass::Orange => "#fd7e14",
        };
        Style {
            fill: color,
            stroke: color,
            fill_opacity: 1.0,
        }
    }

    /// Запись таблицы ширин, используемая, если подтипа дороги в таблице нет
    #[must_use]
    pub fn fallback_width(self) -> &'static str {
        match self {
            RoadClass::White | RoadClass::Yellow => "middle",
            RoadClass::Orange => "big",
        }
    }

    /// Имя исходного файла в каталоге `roads/`
    #[must_use]
    pub fn source_file(self) -> &'static str {
        match self {
            RoadClass::White => "white.geojson",
            RoadClass::Yellow => "yellow.geojson",
            RoadClass::Orange => "orange.geojson",
        }
    }
}

/// Значение свойства `type`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeatureKind {
    City,
    /// `landmark-N`
    Landmark(u8),
    Terrain(Terrain),
    Road(RoadClass),
    /// Типы, заданные в таблице свойств стран, и неизвестные подтипы
    Other(String),
}

impl FeatureKind {
    #[must_use]
    pub fn is_terrain(&self) -> bool {
        matches!(self, FeatureKind::Terrain(_))
    }

    /// Собственный стиль типа, если он зашит в сборщик
    #[must_use]
    pub fn style(&self) -> Option<Style> {
        match self {
            FeatureKind::Terrain(t) => Some(t.style()),
            FeatureKind::Road(r) => Some(r.style()),
            _ => None,
        }
    }
}

impl From<String> for FeatureKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "city" => return FeatureKind::City,
            "water" => return FeatureKind::Terrain(Terrain::Water),
            "sand" => return FeatureKind::Terrain(Terrain::Sand),
            "grass" => return FeatureKind::Terrain(Terrain::Grass),
            "white_road" => return FeatureKind::Road(RoadClass::White),
            "yellow_road" => return FeatureKind::Road(RoadClass::Yellow),
            "orange_road" => return FeatureKind::Road(RoadClass::Orange),
            _ => {}
        }

        // голый "landmark" остаётся строкой: его переписывает загрузчик
        // только каноническая запись: "landmark-01" остаётся строкой как есть
        if let Some(level) = value
            .strip_prefix("landmark-")
            .and_then(|l| l.parse::<u8>().ok().filter(|n| n.to_string() == l))
        {
            return FeatureKind::Landmark(level);
        }

        FeatureKind::Other(value)
    }
}

impl From<&str> for FeatureKind {
    fn from(value: &str) -> Self {
        FeatureKind::from(value.to_owned())
    }
}

impl From<FeatureKind> for String {
    fn from(kind: FeatureKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::City => f.write_str("city"),
            FeatureKind::Landmark(level) => write!(f, "landmark-{level}"),
            FeatureKind::Terrain(t) => f.write_str(t.as_str()),
            FeatureKind::Road(r) => f.write_str(r.as_str()),
            FeatureKind::Other(s) => f.write_str(s),
        }
    }
}
