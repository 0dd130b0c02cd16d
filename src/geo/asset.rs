//! Region Geometry Asset
//! Named polygon features loaded once from GeoJSON, projected and triangulated up front.

use super::projection::{mercator, point_in_ring, Bounds};
use super::tessellate::triangulate;
use geojson::{GeoJson, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Feature property holding the region name.
pub const NAME_PROPERTY: &str = "name";

#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Failed to read geometry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("Expected a FeatureCollection")]
    NotAFeatureCollection,
    #[error("No named polygon feature found")]
    NoFeatures,
}

/// One outer ring in projected coordinates with its fill triangles.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPolygon {
    pub ring: Vec<[f64; 2]>,
    pub triangles: Vec<[usize; 3]>,
}

/// A region's outline. Holes are not kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionShape {
    pub name: String,
    pub polygons: Vec<ProjectedPolygon>,
    pub bounds: Bounds,
}

impl RegionShape {
    pub fn contains(&self, p: [f64; 2]) -> bool {
        self.bounds.contains(p) && self.polygons.iter().any(|poly| point_in_ring(p, &poly.ring))
    }
}

/// Table names matched or not against the geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct JoinReport {
    pub matched: Vec<String>,
    pub unmatched: Vec<String>,
}

/// Read-only region boundaries, keyed by the `name` property.
#[derive(Debug, Clone)]
pub struct GeometryAsset {
    shapes: Vec<RegionShape>,
    index: HashMap<String, usize>,
}

impl GeometryAsset {
    pub fn load(path: &Path) -> Result<Self, GeometryError> {
        let contents = fs::read_to_string(path).map_err(|source| GeometryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let asset = Self::from_geojson_str(&contents)?;
        log::info!(
            "Loaded {} region shapes from {}",
            asset.len(),
            path.display()
        );
        Ok(asset)
    }

    pub fn from_geojson_str(contents: &str) -> Result<Self, GeometryError> {
        let geojson: GeoJson = contents.parse()?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(GeometryError::NotAFeatureCollection);
        };

        let mut shapes: Vec<RegionShape> = Vec::new();
        let mut index = HashMap::new();

        for (i, feature) in collection.features.iter().enumerate() {
            let Some(name) = feature
                .property(NAME_PROPERTY)
                .and_then(|v| v.as_str())
                .map(str::to_string)
            else {
                log::warn!("Feature #{} has no '{}' property, skipped", i, NAME_PROPERTY);
                continue;
            };

            let rings: Vec<Vec<[f64; 2]>> = match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::Polygon(polygon)) => {
                    polygon.first().map(|ring| project_ring(ring)).into_iter().collect()
                }
                Some(Value::MultiPolygon(polygons)) => polygons
                    .iter()
                    .filter_map(|polygon| polygon.first().map(|ring| project_ring(ring)))
                    .collect(),
                _ => {
                    log::warn!("Feature '{}' is not a polygon, skipped", name);
                    continue;
                }
            };

            let polygons: Vec<ProjectedPolygon> = rings
                .into_iter()
                .filter(|ring| ring.len() >= 3)
                .map(|ring| ProjectedPolygon {
                    triangles: triangulate(&ring),
                    ring,
                })
                .collect();
            let Some(bounds) = polygons
                .iter()
                .filter_map(|p| Bounds::of_points(&p.ring))
                .reduce(Bounds::union)
            else {
                log::warn!("Feature '{}' has an empty geometry, skipped", name);
                continue;
            };

            if index.contains_key(&name) {
                log::warn!("Duplicate feature '{}', keeping the first", name);
                continue;
            }
            index.insert(name.clone(), shapes.len());
            shapes.push(RegionShape {
                name,
                polygons,
                bounds,
            });
        }

        if shapes.is_empty() {
            return Err(GeometryError::NoFeatures);
        }
        Ok(Self { shapes, index })
    }

    pub fn shape(&self, name: &str) -> Option<&RegionShape> {
        self.index.get(name).map(|&i| &self.shapes[i])
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// Exact-name join of table regions against the features.
    pub fn join(&self, regions: &[String]) -> JoinReport {
        let (matched, unmatched): (Vec<String>, Vec<String>) = regions
            .iter()
            .cloned()
            .partition(|name| self.index.contains_key(name));
        JoinReport { matched, unmatched }
    }

    /// Bounds of the named regions that exist in the asset.
    pub fn bounds_of<'a>(&self, names: impl IntoIterator<Item = &'a String>) -> Option<Bounds> {
        names
            .into_iter()
            .filter_map(|name| self.shape(name))
            .map(|shape| shape.bounds)
            .reduce(Bounds::union)
    }
}

fn project_ring(ring: &[Vec<f64>]) -> Vec<[f64; 2]> {
    ring.iter()
        .filter(|pos| pos.len() >= 2)
        .map(|pos| mercator([pos[0], pos[1]]))
        .collect()
}
