use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::figures::{BACKGROUND, Dashboard, FONT_COLOR};

pub const DEFAULT_PLOTLY_SRC: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

// Two charts per row, in figure order.
const CHARTS_PER_ROW: usize = 2;

pub fn render_page(dashboard: &Dashboard, plotly_src: &str) -> Result<String> {
    let mut html = String::with_capacity(64 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str(&format!("<title>{}</title>\n", esc(&dashboard.title)));
    html.push_str(&format!("<script src=\"{}\"></script>\n", esc(plotly_src)));
    html.push_str(&format!(
        "<style>\n\
         body {{ margin: 0; padding: 16px; background-color: {BACKGROUND}; font-family: sans-serif; }}\n\
         h1 {{ text-align: center; color: {FONT_COLOR}; }}\n\
         .row {{ background-color: {BACKGROUND}; }}\n\
         .chart {{ width: 48%; display: inline-block; vertical-align: top; }}\n\
         </style>\n"
    ));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", esc(&dashboard.title)));

    for row in dashboard.figures.chunks(CHARTS_PER_ROW) {
        html.push_str("<div class=\"row\">\n");
        for (id, _) in row {
            html.push_str(&format!(
                "<div class=\"chart\" id=\"{}\"></div>\n",
                chart_dom_id(id)
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("<script>\n");
    for (id, figure) in &dashboard.figures {
        let json = serde_json::to_string(figure)
            .with_context(|| format!("serialize figure {id}"))?;
        let json = script_json(&json);
        let dom_id = chart_dom_id(id);
        html.push_str(&format!("(function () {{\n  var fig = {json};\n"));
        html.push_str(&format!(
            "  Plotly.newPlot(\"{dom_id}\", fig.data, fig.layout, {{responsive: true}})"
        ));
        if figure.frames.is_empty() {
            html.push_str(";\n");
        } else {
            html.push_str(&format!(
                ".then(function () {{ return Plotly.addFrames(\"{dom_id}\", fig.frames); }});\n"
            ));
        }
        html.push_str("})();\n");
    }
    html.push_str("</script>\n</body>\n</html>\n");
    Ok(html)
}

pub fn chart_dom_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    format!("chart-{cleaned}")
}

/// JSON embedded in a `<script>` block must never contain a closing tag.
pub fn script_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub fn esc(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn write_page(path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    let tmp = path.with_extension("html.tmp");
    fs::write(&tmp, html).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    info!(path = %path.display(), bytes = html.len(), "wrote dashboard page");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_json_breaks_closing_tags() {
        assert_eq!(script_json(r#"{"a":"</script>"}"#), r#"{"a":"<\/script>"}"#);
    }

    #[test]
    fn esc_handles_markup() {
        assert_eq!(esc("Côte <d'Ivoire> & \"co\""), "Côte &lt;d&#39;Ivoire&gt; &amp; &quot;co&quot;");
    }

    #[test]
    fn chart_dom_id_is_css_safe() {
        assert_eq!(chart_dom_id("scatter3d"), "chart-scatter3d");
        assert_eq!(chart_dom_id("a b/c"), "chart-a-b-c");
    }
}
