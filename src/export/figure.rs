use serde_json::{json, Value};

use crate::scene::{MarkerGroup, Scene};

/// Ice at the poles, oceans, land, snow; indexed by normalized latitude.
const EARTH_COLORSCALE: [(f64, &str); 9] = [
    (0.00, "rgb(220, 235, 245)"),
    (0.07, "rgb(0, 40, 100)"),
    (0.20, "rgb(0, 70, 150)"),
    (0.35, "rgb(0, 120, 220)"),
    (0.50, "rgb(34, 139, 34)"),
    (0.65, "rgb(60, 170, 60)"),
    (0.80, "rgb(189, 183, 107)"),
    (0.93, "rgb(230, 230, 230)"),
    (1.00, "rgb(255, 255, 255)"),
];

pub const AXIS_TITLES: [&str; 3] = ["X (AU)", "Y (AU)", "Z (AU)"];

/// Plotly `{data, layout}` for a scene.
pub fn figure_json(scene: &Scene, title: &str, height_px: u32) -> Value {
    let mut data = vec![body_trace(scene)];
    if scene.show_body_label {
        data.push(body_label_trace());
    }
    data.extend(scene.markers.iter().map(marker_trace));

    json!({
        "data": data,
        "layout": layout(scene, title, height_px),
    })
}

fn body_trace(scene: &Scene) -> Value {
    let grid = scene.body.surface();
    let colorscale: Vec<Value> = EARTH_COLORSCALE
        .iter()
        .map(|(stop, color)| json!([stop, color]))
        .collect();
    json!({
        "type": "surface",
        "name": "Earth",
        "x": grid.x,
        "y": grid.y,
        "z": grid.z,
        "surfacecolor": grid.color,
        "cmin": -1,
        "cmax": 1,
        "colorscale": colorscale,
        "showscale": false,
        "opacity": 1.0,
        "hoverinfo": "name",
        "lighting": {"ambient": 0.4, "diffuse": 0.8, "specular": 0.2, "roughness": 0.6, "fresnel": 0.2},
        "lightposition": {"x": 1.2, "y": 1.2, "z": 0.5},
    })
}

fn body_label_trace() -> Value {
    json!({
        "type": "scatter3d",
        "name": "Earth center",
        "x": [0],
        "y": [0],
        "z": [0],
        "mode": "markers+text",
        "marker": {"size": 10, "color": "white"},
        "text": ["Earth"],
        "textposition": "top center",
        "hoverinfo": "skip",
    })
}

fn marker_trace(group: &MarkerGroup) -> Value {
    json!({
        "type": "scatter3d",
        "name": group.class.legend(),
        "x": group.x,
        "y": group.y,
        "z": group.z,
        "mode": "markers",
        "marker": {
            "size": group.sizes,
            "color": group.class.color(),
            "opacity": group.class.opacity(),
            "line": {"width": 0},
        },
        "text": group.labels,
        "hoverinfo": "text",
    })
}

fn axis(title: &str, limit: f64) -> Value {
    json!({
        "title": {"text": title},
        "range": [-limit, limit],
        "showgrid": true,
        "gridcolor": "gray",
        "backgroundcolor": "black",
        "showbackground": true,
        "color": "white",
    })
}

fn layout(scene: &Scene, title: &str, height_px: u32) -> Value {
    let [x, y, z] = scene.camera_eye;
    let [x_title, y_title, z_title] = AXIS_TITLES;
    json!({
        "title": {"text": title},
        "scene": {
            "xaxis": axis(x_title, scene.limit),
            "yaxis": axis(y_title, scene.limit),
            "zaxis": axis(z_title, scene.limit),
            "aspectmode": "cube",
            "bgcolor": "black",
            "camera": {"eye": {"x": x, "y": y, "z": z}},
        },
        "height": height_px,
        "margin": {"l": 0, "r": 0, "b": 0, "t": 40},
        "showlegend": true,
        "legend": {"x": 0.02, "y": 0.98, "bgcolor": "rgba(0,0,0,0.4)", "font": {"color": "white"}},
        "paper_bgcolor": "black",
        "font": {"color": "white"},
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{build_scene, SceneConfig};
    use crate::PlotPoint;

    fn point(hazardous: bool) -> PlotPoint {
        PlotPoint {
            name: "p".into(),
            pos: [0.01, 0.02, -0.03],
            diameter_km: 0.2,
            hazardous,
            distance_km: 0.0,
            velocity_kps: 0.0,
            label: "hover".into(),
        }
    }

    fn small_config() -> SceneConfig {
        SceneConfig::default().with_body_resolution(8)
    }

    #[test]
    fn empty_scene_has_only_body_traces() {
        let scene = build_scene(Vec::new(), &small_config());
        let fig = figure_json(&scene, "Empty", 720);
        let data = fig["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["type"], "surface");
        assert_eq!(data[1]["name"], "Earth center");
    }

    #[test]
    fn marker_traces_follow_groups() {
        let scene = build_scene(vec![point(false), point(true)], &small_config());
        let fig = figure_json(&scene, "Both", 720);
        let names: Vec<&str> = fig["data"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Earth", "Earth center", "Asteroids (non-hazardous)", "Asteroids (hazardous)"]
        );
        assert_eq!(fig["data"][3]["marker"]["color"], "crimson");
        assert_eq!(fig["data"][2]["text"][0], "hover");
    }

    #[test]
    fn layout_is_symmetric_and_dark() {
        let scene = build_scene(vec![point(true)], &small_config());
        let fig = figure_json(&scene, "Title", 600);
        let layout = &fig["layout"];
        assert_eq!(layout["title"]["text"], "Title");
        assert_eq!(layout["paper_bgcolor"], "black");
        assert_eq!(layout["font"]["color"], "white");
        assert_eq!(layout["scene"]["aspectmode"], "cube");
        for (key, title) in ["xaxis", "yaxis", "zaxis"].iter().zip(AXIS_TITLES) {
            let axis = &layout["scene"][key];
            assert_eq!(axis["title"]["text"], title);
            assert_eq!(axis["range"][0].as_f64().unwrap(), -scene.limit);
            assert_eq!(axis["range"][1].as_f64().unwrap(), scene.limit);
            assert_eq!(axis["gridcolor"], "gray");
        }
        assert_eq!(layout["height"], 600);
    }

    #[test]
    fn label_trace_can_be_hidden() {
        let mut config = small_config();
        config.show_body_label = false;
        let scene = build_scene(Vec::new(), &config);
        let fig = figure_json(&scene, "t", 720);
        assert_eq!(fig["data"].as_array().unwrap().len(), 1);
    }
}
