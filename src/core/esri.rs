use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value as GeoValue};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Columns never exported to CSV.
pub const DROPPED_COLUMNS: &[&str] = &["ObjectID_1"];

/// GeoJSON 座標一律要求 WGS84 輸出
pub const WGS84_WKID: i64 = 4326;

type Ring = Vec<Vec<f64>>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EsriFeatureSet {
    #[serde(default)]
    pub features: Vec<EsriFeature>,
    /// Set when the server stopped at its `maxRecordCount` and more pages follow.
    #[serde(default, rename = "exceededTransferLimit")]
    pub exceeded_transfer_limit: bool,
    #[serde(default, rename = "spatialReference")]
    pub spatial_reference: Option<SpatialReference>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SpatialReference {
    pub wkid: Option<i64>,
    #[serde(rename = "latestWkid")]
    pub latest_wkid: Option<i64>,
}

impl SpatialReference {
    pub fn is_wgs84(&self) -> bool {
        self.latest_wkid.or(self.wkid) == Some(WGS84_WKID)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsriFeature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<Value>,
}

impl EsriFeature {
    pub fn to_geometry(&self) -> Option<Geometry> {
        self.geometry.as_ref().and_then(esri_geometry).map(Geometry::new)
    }

    /// 只有 Point 有 lon/lat
    pub fn point_coordinates(&self) -> Option<(f64, f64)> {
        let geometry = self.geometry.as_ref()?;
        Some((geometry.get("x")?.as_f64()?, geometry.get("y")?.as_f64()?))
    }
}

fn position(value: &Value) -> Option<Vec<f64>> {
    let coords = value.as_array()?;
    // ESRI 座標可能帶 z/m，只保留前兩個
    let xy: Vec<f64> = coords.iter().take(2).filter_map(Value::as_f64).collect();
    (xy.len() == 2).then_some(xy)
}

fn positions(value: &Value) -> Option<Vec<Vec<f64>>> {
    value.as_array()?.iter().map(position).collect()
}

fn esri_geometry(geometry: &Value) -> Option<GeoValue> {
    if let (Some(x), Some(y)) = (
        geometry.get("x").and_then(Value::as_f64),
        geometry.get("y").and_then(Value::as_f64),
    ) {
        return Some(GeoValue::Point(vec![x, y]));
    }

    if let Some(points) = geometry.get("points") {
        return positions(points).map(GeoValue::MultiPoint);
    }

    if let Some(paths) = geometry.get("paths") {
        let mut lines: Vec<Vec<Vec<f64>>> =
            paths.as_array()?.iter().map(positions).collect::<Option<_>>()?;
        return match lines.len() {
            0 => None,
            1 => lines.pop().map(GeoValue::LineString),
            _ => Some(GeoValue::MultiLineString(lines)),
        };
    }

    if let Some(rings) = geometry.get("rings") {
        let rings: Vec<Ring> = rings.as_array()?.iter().map(positions).collect::<Option<_>>()?;
        return group_rings(rings);
    }

    None
}

/// 鞋帶公式；順時針為負
fn signed_area(ring: &[Vec<f64>]) -> f64 {
    ring.iter()
        .zip(ring.iter().cycle().skip(1))
        .map(|(a, b)| a[0] * b[1] - b[0] * a[1])
        .sum::<f64>()
        / 2.0
}

/// Even-odd ray casting test of `point` against `ring`.
fn ring_contains(ring: &[Vec<f64>], point: &[f64]) -> bool {
    let (x, y) = (point[0], point[1]);
    let mut inside = false;
    for (i, a) in ring.iter().enumerate() {
        let b = &ring[(i + ring.len() - 1) % ring.len()];
        if (a[1] > y) != (b[1] > y) && x < (b[0] - a[0]) * (y - a[1]) / (b[1] - a[1]) + a[0] {
            inside = !inside;
        }
    }
    inside
}

/// ESRI 的 rings 是扁平的：順時針為外環，逆時針為洞。
/// 每個洞掛到包含它的外環底下，多個外環輸出 MultiPolygon。
/// 輸出依 RFC 7946 改為外環逆時針、洞順時針。
fn group_rings(rings: Vec<Ring>) -> Option<GeoValue> {
    let (mut outers, mut holes): (Vec<Ring>, Vec<Ring>) = rings
        .into_iter()
        .filter(|ring| !ring.is_empty())
        .partition(|ring| signed_area(ring) < 0.0);

    // 繞向全反的資料：每個環各自當外環
    if outers.is_empty() {
        outers = std::mem::take(&mut holes);
    }

    let mut polygons: Vec<Vec<Ring>> = outers
        .into_iter()
        .map(|mut outer| {
            if signed_area(&outer) < 0.0 {
                outer.reverse();
            }
            vec![outer]
        })
        .collect();

    for mut hole in holes {
        let Some(last) = polygons.len().checked_sub(1) else {
            break;
        };
        let owner = polygons
            .iter()
            .position(|polygon| ring_contains(&polygon[0], &hole[0]))
            .unwrap_or(last);
        if signed_area(&hole) > 0.0 {
            hole.reverse();
        }
        polygons[owner].push(hole);
    }

    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(GeoValue::Polygon),
        _ => Some(GeoValue::MultiPolygon(polygons)),
    }
}

/// 整數座標保留小數點，`121` 寫成 `121.0`
fn format_coordinate(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

pub fn to_feature_collection(feature_set: &EsriFeatureSet) -> FeatureCollection {
    let features = feature_set
        .features
        .iter()
        .map(|feature| {
            let properties: JsonObject = feature.attributes.clone();
            Feature {
                bbox: None,
                geometry: feature.to_geometry(),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// CSV 欄位與資料列：保留所有列，null 轉空字串，最後附加 lon/lat
pub fn to_csv_rows(feature_set: &EsriFeatureSet) -> (Vec<String>, Vec<Vec<String>>) {
    let mut headers: Vec<String> = feature_set
        .features
        .first()
        .map(|feature| {
            feature
                .attributes
                .keys()
                .filter(|key| !DROPPED_COLUMNS.contains(&key.as_str()))
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    let attribute_columns = headers.len();
    headers.push("lon".to_string());
    headers.push("lat".to_string());

    let rows = feature_set
        .features
        .iter()
        .map(|feature| {
            let mut row: Vec<String> = headers[..attribute_columns]
                .iter()
                .map(|column| cell(feature.attributes.get(column)))
                .collect();

            match feature.point_coordinates() {
                Some((lon, lat)) => {
                    row.push(format_coordinate(lon));
                    row.push(format_coordinate(lat));
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
            row
        })
        .collect();

    (headers, rows)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
