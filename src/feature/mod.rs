pub mod io;
pub mod kind;

use geo::Geometry;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Number, Value};

pub use kind::{FeatureKind, RoadClass, Style, Terrain};

/// Свойства объекта карты
///
/// Распознаваемые ключи вынесены в поля, всё остальное (например, `title` у городов)
/// сохраняется в `extra` в исходном порядке. Разбор не бывает строгим: значение
/// неожиданного типа (скажем, числовой `name`) остаётся в `extra` как есть.
/// При записи поле имеет приоритет над одноимённым ключом из `extra`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    pub name: Option<String>,
    /// Ключ `type`
    pub kind: Option<FeatureKind>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    /// Ключ `fill-opacity`
    pub fill_opacity: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub extra: Map<String, Value>,
}

impl Properties {
    /// Набор, который пишется ровно в том виде и порядке, в каком задан
    #[must_use]
    pub fn verbatim(extra: Map<String, Value>) -> Self {
        Self {
            extra,
            ..Self::default()
        }
    }

    /// Непустое имя (пустая строка считается отсутствием имени)
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Есть ли имя вообще: строковое или любое другое непустое значение `name`
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.name().is_some() || self.extra.get("name").is_some_and(is_truthy)
    }

    /// Задан ли `type`, в том числе значением нестрокового типа
    #[must_use]
    pub fn has_kind(&self) -> bool {
        self.kind.is_some() || self.extra.get("type").is_some_and(is_truthy)
    }

    /// Накладывает зашитый стиль типа
    pub fn apply_style(&mut self, style: Style) {
        self.fill = Some(style.fill.to_owned());
        self.stroke = Some(style.stroke.to_owned());
        self.fill_opacity = Some(style.fill_opacity);
    }

    /// Значение свойства как ключ группировки
    #[must_use]
    pub fn key_value(&self, key: &str) -> Option<String> {
        let typed = match key {
            "name" => self.name.clone(),
            "type" => self.kind.as_ref().map(ToString::to_string),
            "fill" => self.fill.clone(),
            "stroke" => self.stroke.clone(),
            _ => None,
        };
        typed.or_else(|| match self.extra.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
    }

    /// Обратная операция к [`Properties::key_value`]
    pub fn set_key_value(&mut self, key: &str, value: String) {
        match key {
            "name" => self.name = Some(value),
            "type" => self.kind = Some(FeatureKind::from(value)),
            "fill" => self.fill = Some(value),
            "stroke" => self.stroke = Some(value),
            _ => {
                self.extra.insert(key.to_owned(), Value::String(value));
            }
        }
    }

    /// Есть ли у объекта хотя бы один тег из списка
    #[must_use]
    pub fn has_any_tag(&self, allowed: &[String]) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| allowed.contains(t)))
    }

    fn shadows(&self, key: &str) -> bool {
        match key {
            "name" => self.name.is_some(),
            "type" => self.kind.is_some(),
            "fill" => self.fill.is_some(),
            "stroke" => self.stroke.is_some(),
            "fill-opacity" => self.fill_opacity.is_some(),
            "tags" => self.tags.is_some(),
            _ => false,
        }
    }
}

impl From<Map<String, Value>> for Properties {
    fn from(mut extra: Map<String, Value>) -> Self {
        let name = take(&mut extra, "name", string);
        let kind = take(&mut extra, "type", string).map(FeatureKind::from);
        let fill = take(&mut extra, "fill", string);
        let stroke = take(&mut extra, "stroke", string);
        let fill_opacity = take(&mut extra, "fill-opacity", Value::as_f64);
        let tags = take(&mut extra, "tags", string_list);

        Self {
            name,
            kind,
            fill,
            stroke,
            fill_opacity,
            tags,
            extra,
        }
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::<String, Value>::deserialize(deserializer).map(Self::from)
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(name) = &self.name {
            map.serialize_entry("name", name)?;
        }
        if let Some(kind) = &self.kind {
            map.serialize_entry("type", &kind.to_string())?;
        }
        if let Some(fill) = &self.fill {
            map.serialize_entry("fill", fill)?;
        }
        if let Some(stroke) = &self.stroke {
            map.serialize_entry("stroke", stroke)?;
        }
        if let Some(opacity) = &self.fill_opacity {
            map.serialize_entry("fill-opacity", opacity)?;
        }
        if let Some(tags) = &self.tags {
            map.serialize_entry("tags", tags)?;
        }
        for (key, value) in &self.extra {
            if !self.shadows(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

/// Забирает ключ в поле, только если значение подходящего типа
fn take<T>(
    map: &mut Map<String, Value>,
    key: &str,
    read: impl FnOnce(&Value) -> Option<T>,
) -> Option<T> {
    let value = map.get(key).and_then(read)?;
    map.shift_remove(key);
    Some(value)
}

fn string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    value.as_array()?.iter().map(string).collect()
}

/// Истинность значения в духе авторских файлов: `null`, `false`, `0` и `""` — ложь
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Идентификатор объекта GeoJSON: число или строка
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureId {
    Number(Number),
    String(String),
}

impl From<u64> for FeatureId {
    fn from(id: u64) -> Self {
        FeatureId::Number(id.into())
    }
}

/// Объект карты: геометрия, свойства и номер, выдаваемый на последнем этапе
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: Properties,
    pub id: Option<FeatureId>,
    /// Прочие ключи верхнего уровня объекта, переносятся без изменений
    pub foreign_members: Option<Map<String, Value>>,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry<f64>>, properties: Properties) -> Self {
        Self {
            geometry: geometry.into(),
            properties,
            id: None,
            foreign_members: None,
        }
    }

    /// Площадной объект: `Polygon` или `MultiPolygon`
    #[must_use]
    pub fn is_polygonal(&self) -> bool {
        is_polygonal(&self.geometry)
    }

    #[must_use]
    pub fn is_terrain(&self) -> bool {
        self.properties
            .kind
            .as_ref()
            .is_some_and(FeatureKind::is_terrain)
    }

    #[must_use]
    pub fn geometry_name(&self) -> &'static str {
        geometry_name(&self.geometry)
    }
}

#[must_use]
pub fn is_polygonal(geometry: &Geometry<f64>) -> bool {
    matches!(geometry, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
}

/// Имя типа геометрии в терминах GeoJSON
#[must_use]
pub fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) | Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) | Geometry::Rect(_) | Geometry::Triangle(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Делит список на площадные и прочие объекты, сохраняя порядок внутри каждой части
#[must_use]
pub fn partition_polygonal(features: Vec<Feature>) -> (Vec<Feature>, Vec<Feature>) {
    features.into_iter().partition(Feature::is_polygonal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{point, square};

    #[test]
    fn extra_keys_survive_roundtrip_through_json() {
        let json = serde_json::json!({
            "title": "Capital",
            "type": "city",
            "tags": ["north"],
            "population": 12,
        });
        let props: Properties = serde_json::from_value(json).unwrap();
        assert_eq!(props.kind, Some(FeatureKind::City));
        assert_eq!(props.extra["title"], "Capital");

        let back = serde_json::to_value(&props).unwrap();
        assert_eq!(back["population"], 12);
        assert_eq!(back["type"], "city");
        assert!(back.get("name").is_none());
    }

    #[test]
    fn mistyped_known_keys_stay_in_extra() {
        let json = serde_json::json!({
            "name": 2024,
            "tags": "all",
            "fill": "#abc",
            "type": 1,
        });
        let props: Properties = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(props.name, None);
        assert_eq!(props.tags, None);
        assert_eq!(props.kind, None);
        assert_eq!(props.fill.as_deref(), Some("#abc"));
        assert!(props.is_named());
        assert!(props.has_kind());
        assert_eq!(props.key_value("name").as_deref(), Some("2024"));

        assert_eq!(serde_json::to_value(&props).unwrap(), json);
    }

    #[test]
    fn typed_field_wins_over_extra_on_write() {
        let mut props: Properties =
            serde_json::from_value(serde_json::json!({ "fill": 5, "title": "x" })).unwrap();
        props.apply_style(Terrain::Water.style());

        let back = serde_json::to_value(&props).unwrap();
        assert_eq!(back["fill"], "#75cff0");
        assert_eq!(back["title"], "x");
        assert_eq!(back.as_object().unwrap().len(), 4);
    }

    #[test]
    fn verbatim_bundle_keeps_key_order() {
        let bundle: Map<String, Value> =
            serde_json::from_str(r##"{"tags": "all", "type": 1, "fill": "#000"}"##).unwrap();
        let text = serde_json::to_string(&Properties::verbatim(bundle)).unwrap();
        assert_eq!(text, r##"{"tags":"all","type":1,"fill":"#000"}"##);
    }

    #[test]
    fn falsy_names_do_not_count() {
        for value in [
            serde_json::json!(null),
            serde_json::json!(0),
            serde_json::json!(false),
            serde_json::json!(""),
        ] {
            let props: Properties =
                serde_json::from_value(serde_json::json!({ "name": value.clone() })).unwrap();
            assert!(!props.is_named(), "{value}");
        }
    }

    #[test]
    fn empty_properties_serialize_to_empty_object() {
        let value = serde_json::to_value(Properties::default()).unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[test]
    fn empty_name_is_no_name() {
        let props = Properties {
            name: Some(String::new()),
            ..Properties::default()
        };
        assert_eq!(props.name(), None);
    }

    #[test]
    fn key_values_cover_known_and_extra_keys() {
        let mut props = Properties::default();
        props.set_key_value("type", "sand".to_owned());
        props.set_key_value("region", "west".to_owned());
        assert_eq!(props.kind, Some(FeatureKind::Terrain(Terrain::Sand)));
        assert_eq!(props.key_value("type").as_deref(), Some("sand"));
        assert_eq!(props.key_value("region").as_deref(), Some("west"));
        assert_eq!(props.key_value("missing"), None);
    }

    #[test]
    fn tag_intersection() {
        let props = Properties {
            tags: Some(vec!["region_x".to_owned()]),
            ..Properties::default()
        };
        assert!(props.has_any_tag(&["region_x".to_owned()]));
        assert!(!props.has_any_tag(&["region_y".to_owned()]));
        assert!(!Properties::default().has_any_tag(&["region_x".to_owned()]));
    }

    #[test]
    fn polygonal_classification() {
        assert!(Feature::new(square(0.0, 0.0, 1.0), Properties::default()).is_polygonal());
        let city = Feature::new(point(1.0, 1.0), Properties::default());
        assert!(!city.is_polygonal());
        assert_eq!(city.geometry_name(), "Point");
    }
}
