//! Scene assembly: the planet body, hazard-split marker groups and the
//! symmetric axis bounds shared by all three axes.

use serde::{Deserialize, Serialize};

use crate::units::{sphere_angles, EARTH_RADIUS_AU};
use crate::PlotPoint;

/// Floor for the axis limit when the config zeroes out every other bound.
pub const MIN_AXIS_LIMIT: f64 = EARTH_RADIUS_AU;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Multiple of the physical Earth radius used as the smallest visual radius.
    pub body_scale: f64,
    /// Visual radius as a fraction of the farthest point, when that is larger.
    pub body_fraction_of_range: f64,
    /// Marker pixels per km of diameter.
    pub marker_scale: f64,
    pub min_marker_px: f64,
    pub axis_padding: f64,
    /// The axis limit is never below this many visual radii.
    pub body_limit_multiple: f64,
    pub body_resolution: usize,
    pub show_body_label: bool,
    pub camera_eye: [f64; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            body_scale: 50.0,
            body_fraction_of_range: 0.05,
            marker_scale: 50.0,
            min_marker_px: 3.0,
            axis_padding: 1.25,
            body_limit_multiple: 6.0,
            body_resolution: 160,
            show_body_label: true,
            camera_eye: [2.2, 0.0, 0.5],
        }
    }
}

impl SceneConfig {
    pub fn with_body_resolution(mut self, body_resolution: usize) -> Self {
        self.body_resolution = body_resolution;
        self
    }

    pub fn min_visual_radius(&self) -> f64 {
        EARTH_RADIUS_AU * self.body_scale
    }

    /// Presentation-only sizing; the diameter itself is never altered.
    pub fn marker_size_px(&self, diameter_km: f64) -> f64 {
        (diameter_km * self.marker_scale).max(self.min_marker_px)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HazardClass {
    NonHazardous,
    Hazardous,
}

impl HazardClass {
    pub fn of(point: &PlotPoint) -> Self {
        if point.hazardous {
            HazardClass::Hazardous
        } else {
            HazardClass::NonHazardous
        }
    }

    pub fn legend(self) -> &'static str {
        match self {
            HazardClass::NonHazardous => "Asteroids (non-hazardous)",
            HazardClass::Hazardous => "Asteroids (hazardous)",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            HazardClass::NonHazardous => "deepskyblue",
            HazardClass::Hazardous => "crimson",
        }
    }

    pub fn opacity(self) -> f64 {
        match self {
            HazardClass::NonHazardous => 0.8,
            HazardClass::Hazardous => 0.95,
        }
    }
}

/// Parallel per-marker arrays for one hazard class.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MarkerGroup {
    pub class: HazardClass,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    pub sizes: Vec<f64>,
    pub labels: Vec<String>,
}

impl MarkerGroup {
    fn new(class: HazardClass) -> Self {
        MarkerGroup {
            class,
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            sizes: Vec::new(),
            labels: Vec::new(),
        }
    }

    fn push(&mut self, point: PlotPoint, size_px: f64) {
        let [x, y, z] = point.pos;
        self.x.push(x);
        self.y.push(y);
        self.z.push(z);
        self.sizes.push(size_px);
        self.labels.push(point.label);
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Sphere centred on the origin; `radius` is visual, not physical.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BodyMesh {
    pub radius: f64,
    pub resolution: usize,
}

/// Row-major `resolution x resolution` grids for a surface trace.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceGrid {
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
    /// Normalized latitude `z / r` in [-1, 1], drives the colorscale.
    pub color: Vec<Vec<f64>>,
}

impl BodyMesh {
    pub fn surface(&self) -> SurfaceGrid {
        let (u, v) = sphere_angles(self.resolution);
        let r = self.radius;
        let mut grid = SurfaceGrid {
            x: Vec::with_capacity(u.len()),
            y: Vec::with_capacity(u.len()),
            z: Vec::with_capacity(u.len()),
            color: Vec::with_capacity(u.len()),
        };
        for &lon in &u {
            let (sin_u, cos_u) = lon.sin_cos();
            grid.x.push(v.iter().map(|lat| r * cos_u * lat.sin()).collect());
            grid.y.push(v.iter().map(|lat| r * sin_u * lat.sin()).collect());
            grid.z.push(v.iter().map(|lat| r * lat.cos()).collect());
            grid.color.push(v.iter().map(|lat| lat.cos()).collect());
        }
        grid
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Scene {
    pub body: BodyMesh,
    /// Non-empty groups only, non-hazardous first.
    pub markers: Vec<MarkerGroup>,
    /// Every axis spans `[-limit, limit]`.
    pub limit: f64,
    pub camera_eye: [f64; 3],
    pub show_body_label: bool,
}

impl Scene {
    pub fn point_count(&self) -> usize {
        self.markers.iter().map(MarkerGroup::len).sum()
    }

    pub fn group(&self, class: HazardClass) -> Option<&MarkerGroup> {
        self.markers.iter().find(|g| g.class == class)
    }
}

pub fn build_scene(points: Vec<PlotPoint>, config: &SceneConfig) -> Scene {
    let max_distance = points.iter().map(PlotPoint::distance_au).fold(0.0_f64, f64::max);
    let max_coord = points.iter().map(PlotPoint::max_abs_coord).fold(0.0_f64, f64::max);

    let radius = config
        .min_visual_radius()
        .max(config.body_fraction_of_range * max_distance);
    let limit = (max_coord * config.axis_padding)
        .max(radius * config.body_limit_multiple)
        .max(MIN_AXIS_LIMIT);

    let mut safe = MarkerGroup::new(HazardClass::NonHazardous);
    let mut hazard = MarkerGroup::new(HazardClass::Hazardous);
    for point in points {
        let size = config.marker_size_px(point.diameter_km);
        match HazardClass::of(&point) {
            HazardClass::NonHazardous => safe.push(point, size),
            HazardClass::Hazardous => hazard.push(point, size),
        }
    }

    Scene {
        body: BodyMesh {
            radius,
            resolution: config.body_resolution,
        },
        markers: [safe, hazard].into_iter().filter(|g| !g.is_empty()).collect(),
        limit,
        camera_eye: config.camera_eye,
        show_body_label: config.show_body_label,
    }
}
