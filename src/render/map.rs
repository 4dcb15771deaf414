//! Plotly scattergeo document with one animation frame per map layer.

use anyhow::{Result, bail};
use serde_json::{Value, json};

use super::{html_escape, script_json};
use crate::multimap::MapFrame;
use crate::theme::{
    BACKGROUND, ColorScale, DIMMED_OPACITY, FONT_COLOR, FONT_FAMILY, MARKER_OPACITY,
    MENU_BACKGROUND, TITLE_FONT_FAMILY, TITLE_FONT_SIZE,
};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";
const PLOT_ID: &str = "ipeds-map";

fn colorscale(scale: ColorScale) -> Value {
    Value::Array(scale.iter().map(|(stop, color)| json!([stop, color])).collect())
}

fn trace(frame: &MapFrame) -> Value {
    let tickvals: Vec<f64> = frame.ticks.iter().map(|t| t.value).collect();
    let ticktext: Vec<&str> = frame.ticks.iter().map(|t| t.label.as_str()).collect();
    json!({
        "type": "scattergeo",
        "locationmode": "USA-states",
        "lat": frame.lat,
        "lon": frame.lon,
        "text": frame.text,
        "customdata": frame.ids,
        "hovertemplate": "%{text}<extra></extra>",
        "marker": {
            "size": frame.sizes,
            "sizemode": "diameter",
            "color": frame.colors,
            "colorscale": colorscale(frame.scale),
            "cmin": 0,
            "cmax": 100,
            "opacity": MARKER_OPACITY,
            "line": {"color": "black"},
            "colorbar": {
                "title": {"text": frame.name},
                "tickmode": "array",
                "tickvals": tickvals,
                "ticktext": ticktext,
                "ticklen": 5,
                "len": 0.6,
                "x": 1,
                "y": 0.9,
                "xanchor": "left",
                "yanchor": "top"
            }
        }
    })
}

fn frame_layout(frame: &MapFrame) -> Value {
    json!({
        "title": {"subtitle": {"text": frame.subtitle()}},
        "hoverlabel": {
            "bgcolor": BACKGROUND,
            "align": "left",
            "bordercolor": "black",
            "font": {"color": FONT_COLOR}
        },
        "showlegend": false,
        "margin": {"pad": 0, "l": 0, "r": 0, "t": 95, "b": 0}
    })
}

fn theme_layout() -> Value {
    json!({
        "font": {"color": FONT_COLOR, "family": FONT_FAMILY},
        "title": {
            "font": {"family": TITLE_FONT_FAMILY, "size": TITLE_FONT_SIZE, "weight": "bold"},
            "x": 0.2
        },
        "geo": {
            "scope": "usa",
            "bgcolor": BACKGROUND,
            "landcolor": BACKGROUND,
            "subunitcolor": FONT_COLOR
        },
        "plot_bgcolor": BACKGROUND,
        "paper_bgcolor": BACKGROUND
    })
}

/// Recursively merges object `patch` into `base`; other values replace.
fn merge(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                merge(base.entry(key).or_insert(Value::Null), value);
            }
        }
        (base, patch) => *base = patch,
    }
}

/// Builds the Plotly figure: the first frame's data, every frame, and a
/// dropdown that animates between them.
pub fn figure(frames: &[MapFrame], title: &str, notes: &str) -> Result<Value> {
    let Some(first) = frames.first() else {
        bail!("a map needs at least one frame");
    };

    let buttons: Vec<Value> = frames
        .iter()
        .map(|f| {
            json!({
                "method": "animate",
                "label": f.name,
                "args": [
                    [f.name],
                    {
                        "mode": "immediate",
                        "frame": {"duration": 0, "redraw": true},
                        "transition": {"duration": 0}
                    }
                ]
            })
        })
        .collect();

    let mut layout = theme_layout();
    merge(&mut layout, frame_layout(first));
    merge(
        &mut layout,
        json!({
            "title": {"text": title},
            "updatemenus": [{
                "buttons": buttons,
                "x": 0.99,
                "y": 0.95,
                "xanchor": "left",
                "yanchor": "top",
                "showactive": true,
                "bgcolor": MENU_BACKGROUND,
                "bordercolor": FONT_COLOR,
                "font": {"color": FONT_COLOR}
            }],
            "annotations": [{
                "text": notes,
                "showarrow": false,
                "align": "right",
                "xref": "paper",
                "yref": "paper",
                "x": 1,
                "xanchor": "left",
                "y": 0.29,
                "yanchor": "top"
            }]
        }),
    );

    let frames: Vec<Value> = frames
        .iter()
        .map(|f| json!({"name": f.name, "data": [trace(f)], "layout": frame_layout(f)}))
        .collect();

    Ok(json!({
        "data": [trace(first)],
        "layout": layout,
        "frames": frames
    }))
}

fn search_box() -> &'static str {
    r#"<div style="position:absolute; top:100px; right:23.5px; z-index:1000;">
    <input type="text" id="searchBox" placeholder="Search a school, then zoom in" style="padding:5px; width:200px;">
</div>"#
}

fn search_script() -> String {
    format!(
        r#"<script>
const input = document.getElementById("searchBox");
const plotEl = document.getElementById("{PLOT_ID}");
input.addEventListener("input", function() {{
    const q = this.value.toLowerCase();
    plotEl.data.forEach((trace, i) => {{
        if (!trace.text) return;
        const opacity = trace.text.map(txt =>
            txt.toLowerCase().includes(q) ? {MARKER_OPACITY} : {DIMMED_OPACITY}
        );
        Plotly.restyle(plotEl, {{"marker.opacity": [opacity]}}, [i]);
    }});
}});
</script>"#
    )
}

/// Renders the full map document.
pub fn render_map(frames: &[MapFrame], title: &str, notes: &str, search: bool) -> Result<String> {
    let figure = script_json(&figure(frames, title, notes)?)?;
    let (search_box, search_script) = if search {
        (search_box(), search_script())
    } else {
        ("", String::new())
    };

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{page_title}</title>
    <script src="{PLOTLY_CDN}" charset="utf-8"></script>
    <style>html, body {{ margin: 0; height: 100%; }} #{PLOT_ID} {{ width: 100%; height: 100vh; }}</style>
</head>
<body>
{search_box}
<div id="{PLOT_ID}" class="plotly-graph-div"></div>
<script>
const figure = {figure};
Plotly.newPlot("{PLOT_ID}", figure.data, figure.layout, {{responsive: true}})
    .then(gd => Plotly.addFrames(gd, figure.frames));
</script>
{search_script}
</body>
</html>
"#,
        page_title = html_escape(title),
    ))
}
