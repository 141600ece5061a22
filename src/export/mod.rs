pub mod figure;
pub mod rotation;

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scene::Scene;

pub use figure::figure_json;
pub use rotation::{
    rotation_script, Clock, ManualClock, RotationConfig, RotationPhase, RotationState,
    INTERACTION_GRACE_MS,
};

pub const DEFAULT_OUT_PATH: &str = "site/index.html";
pub const DEFAULT_DIV_ID: &str = "plotly-div";
pub const DEFAULT_PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize figure: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub out_path: PathBuf,
    pub div_id: String,
    pub plotly_cdn: String,
    pub height_px: u32,
    pub rotation: RotationConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            out_path: PathBuf::from(DEFAULT_OUT_PATH),
            div_id: DEFAULT_DIV_ID.to_string(),
            plotly_cdn: DEFAULT_PLOTLY_CDN.to_string(),
            height_px: 720,
            rotation: RotationConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn with_out_path<P: Into<PathBuf>>(mut self, out_path: P) -> Self {
        self.out_path = out_path.into();
        self
    }

    pub fn with_div_id(mut self, div_id: impl Into<String>) -> Self {
        self.div_id = div_id.into();
        self
    }

    pub fn with_rotation(mut self, rotation: RotationConfig) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Renders a standalone page; only the Plotly bundle is fetched at view time.
pub fn render_page(scene: &Scene, title: &str, config: &ExportConfig) -> Result<String, ExportError> {
    let figure = figure_json(scene, title, config.height_px);
    let data = script_safe(&serde_json::to_string(&figure["data"])?);
    let layout = script_safe(&serde_json::to_string(&figure["layout"])?);
    let div_literal = script_safe(&serde_json::to_string(&config.div_id)?);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
<style>
  html, body {{ margin:0; padding:0; background:black; color:white; height:100%; }}
  #{div_css} {{ width:100%; height:100vh; }}
</style>
</head>
<body>
<div id="{div_attr}"></div>
<script>
Plotly.newPlot(document.getElementById({div_literal}), {data}, {layout}, {{"displaylogo": false, "responsive": true}});
</script>
{spin}</body>
</html>
"#,
        title = escape_html(title),
        cdn = escape_html(&config.plotly_cdn),
        div_css = css_ident(&config.div_id),
        div_attr = escape_html(&config.div_id),
        spin = rotation_script(&config.div_id, &config.rotation),
    ))
}

/// Renders the page and writes it to `config.out_path`, creating parent
/// directories as needed.
pub fn write_page(scene: &Scene, title: &str, config: &ExportConfig) -> Result<PathBuf, ExportError> {
    let html = render_page(scene, title, config)?;
    let path = config.out_path.clone();
    ensure_parent(&path)?;
    fs::write(&path, html).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;
    info!(
        "Wrote {} ({} markers, axis limit {:.5} AU)",
        path.display(),
        scene.point_count(),
        scene.limit
    );
    Ok(path)
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Keeps feed-supplied strings from closing the surrounding `<script>`.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escapes an element id for use in a `#id` selector. A digit may not start
/// an identifier (or follow a leading `-`), so it becomes a hex escape.
fn css_ident(s: &str) -> String {
    let leading_dash = s.starts_with('-');
    s.chars()
        .enumerate()
        .map(|(i, c)| {
            let at_start = i == 0 || (i == 1 && leading_dash);
            if c.is_ascii_digit() && at_start {
                format!("\\{:x} ", c as u32)
            } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c.to_string()
            } else {
                format!("\\{c}")
            }
        })
        .collect()
}
