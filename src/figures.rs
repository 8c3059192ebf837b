use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Value, json};

use crate::dataset::{MatchRow, MatchSide, unique_dates};
use crate::metrics::{CategoryMetrics, MetricsTable, distinct_teams};

pub const DASHBOARD_TITLE: &str = "FIFA World Cup Match Analysis Dashboard";

pub const BACKGROUND: &str = "rgb(50, 50, 50)";
pub const FONT_COLOR: &str = "white";
pub const UNKNOWN_TEAM_COLOR: &str = "#000000";

pub const OFFENSE_COLORS: [&str; 4] = ["#1F77B4", "#FF7F0E", "#2CA02C", "#D62728"];
pub const OFFENSE_SERIES: [&str; 4] = ["Total Attempts", "On-Target %", "Goals", "Assists"];

/// Axes of the parallel-coordinates chart, labelled by column name.
pub const PARALLEL_DIMENSIONS: [(&str, fn(&MatchRow) -> f64); 6] = [
    ("possession_team1", |r| r.possession_team1),
    ("possession_team2", |r| r.possession_team2),
    ("number_of_goals_team1", |r| f64::from(r.number_of_goals_team1)),
    ("number_of_goals_team2", |r| f64::from(r.number_of_goals_team2)),
    ("total_attempts_team1", |r| f64::from(r.total_attempts_team1)),
    ("total_attempts_team2", |r| f64::from(r.total_attempts_team2)),
];

// Title font size on the charts that set one; Plotly's default applies elsewhere.
const TITLE_FONT_SIZE: u32 = 18;

// Largest rendered bubble diameter in px for each side of the bubble chart.
const TEAM1_BUBBLE_PX: f64 = 20.0;
const TEAM2_BUBBLE_PX: f64 = 40.0;
const BUBBLE_MIN_PX: u32 = 4;

const PLAY_FRAME_MS: u32 = 2000;
const PLAY_TRANSITION_MS: u32 = 500;
const STEP_MS: u32 = 300;

const TEAM_PALETTE: [(&str, &str); 32] = [
    ("Australia", "#1f77b4"),
    ("Iran", "#ff7f0e"),
    ("Japan", "#2ca02c"),
    ("Qatar", "#d62728"),
    ("Saudi Arabia", "#9467bd"),
    ("South Korea", "#8c564b"),
    ("Cameroon", "#e377c2"),
    ("Ghana", "#7f7f7f"),
    ("Morocco", "#bcbd22"),
    ("Senegal", "#17becf"),
    ("Tunisia", "#1f77b4"),
    ("Canada", "#ff7f0e"),
    ("Costa Rica", "#2ca02c"),
    ("Mexico", "#d62728"),
    ("United States", "#9467bd"),
    ("Argentina", "#8c564b"),
    ("Brazil", "#e377c2"),
    ("Ecuador", "#7f7f7f"),
    ("Uruguay", "#bcbd22"),
    ("Belgium", "#17becf"),
    ("Croatia", "#1f77b4"),
    ("Denmark", "#ff7f0e"),
    ("England", "#2ca02c"),
    ("France", "#d62728"),
    ("Germany", "#9467bd"),
    ("Netherlands", "#8c564b"),
    ("Poland", "#e377c2"),
    ("Portugal", "#7f7f7f"),
    ("Serbia", "#bcbd22"),
    ("Spain", "#17becf"),
    ("Switzerland", "#1f77b4"),
    ("Wales", "#ff7f0e"),
];

// Keyed by lower-case name: the published match table spells teams in capitals.
static TEAM_COLORS: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    TEAM_PALETTE
        .iter()
        .map(|(team, color)| (team.to_lowercase(), *color))
        .collect()
});

pub fn team_color(team: &str) -> &'static str {
    TEAM_COLORS
        .get(&team.trim().to_lowercase())
        .copied()
        .unwrap_or(UNKNOWN_TEAM_COLOR)
}

/// A Plotly figure: `data`, `layout` and optional animation `frames`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Value>,
    pub layout: Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub figures: Vec<(String, Figure)>,
}

impl Dashboard {
    pub fn figure(&self, id: &str) -> Option<&Figure> {
        self.figures.iter().find(|(fid, _)| fid == id).map(|(_, f)| f)
    }

    pub fn figures_json(&self) -> serde_json::Result<Value> {
        let mut map = serde_json::Map::new();
        for (id, fig) in &self.figures {
            map.insert(id.clone(), serde_json::to_value(fig)?);
        }
        Ok(Value::Object(map))
    }
}

pub fn build_dashboard(rows: &[MatchRow], metrics: &MetricsTable) -> Dashboard {
    Dashboard {
        title: DASHBOARD_TITLE.to_string(),
        figures: vec![
            ("parallel".to_string(), parallel_coordinates(rows)),
            ("scatter3d".to_string(), scatter_3d(rows)),
            ("bubble".to_string(), goals_bubble(rows)),
            ("offense".to_string(), offensive_efficiency(metrics)),
        ],
    }
}

fn dark_layout(title: &str, title_size: Option<u32>, plot_bg: &str) -> Value {
    let title = match title_size {
        Some(size) => json!({ "text": title, "font": { "size": size } }),
        None => json!({ "text": title }),
    };
    json!({
        "title": title,
        "plot_bgcolor": plot_bg,
        "paper_bgcolor": BACKGROUND,
        "font": { "color": FONT_COLOR },
    })
}

fn merge(base: &mut Value, extra: Value) {
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
}

fn column(rows: &[MatchRow], value: fn(&MatchRow) -> f64) -> Vec<f64> {
    rows.iter().map(value).collect()
}

pub fn parallel_coordinates(rows: &[MatchRow]) -> Figure {
    let dimensions: Vec<Value> = PARALLEL_DIMENSIONS
        .iter()
        .map(|(label, value)| json!({ "label": label, "values": column(rows, *value) }))
        .collect();

    let data = if rows.is_empty() {
        Vec::new()
    } else {
        vec![json!({
            "type": "parcoords",
            "dimensions": dimensions,
            "line": {
                "color": column(rows, |r| f64::from(r.number_of_goals_team1)),
                "colorscale": "Viridis",
                "showscale": true,
                "colorbar": { "title": { "text": "number_of_goals_team1" } },
            },
        })]
    };

    Figure {
        data,
        layout: dark_layout(
            "Parallel Coordinates for Match Performance",
            Some(TITLE_FONT_SIZE),
            "black",
        ),
        frames: Vec::new(),
    }
}

fn scatter_trace(row: &MatchRow, side: MatchSide) -> Value {
    let team = row.team(side);
    let hover = format!(
        "Team: {team}<br>Total Attempts: {}<br>Possession: {}%<br>Goals: {}<br>On Target Attempts: {}<br>",
        row.attempts(side),
        row.possession(side),
        row.goals(side),
        row.on_target(side),
    );
    json!({
        "type": "scatter3d",
        "x": [row.attempts(side)],
        "y": [row.possession(side)],
        "z": [row.goals(side)],
        "mode": "markers",
        "marker": { "size": row.on_target(side), "opacity": 0.8 },
        "name": format!("{} vs {} ({})", row.team1, row.team2, row.date),
        "text": format!("{team} ({})", row.date),
        "hovertemplate": hover,
        "visible": side == MatchSide::Team1,
    })
}

/// Visibility mask selecting one side's half of the scatter traces.
pub fn side_visibility(matches: usize, side: MatchSide) -> Vec<bool> {
    (0..matches * 2)
        .map(|i| match side {
            MatchSide::Team1 => i < matches,
            MatchSide::Team2 => i >= matches,
        })
        .collect()
}

pub fn scatter_3d(rows: &[MatchRow]) -> Figure {
    let data: Vec<Value> = MatchSide::BOTH
        .iter()
        .flat_map(|side| rows.iter().map(move |row| scatter_trace(row, *side)))
        .collect();

    let buttons: Vec<Value> = MatchSide::BOTH
        .iter()
        .map(|side| {
            json!({
                "args": [{ "visible": side_visibility(rows.len(), *side) }],
                "label": side.label(),
                "method": "update",
            })
        })
        .collect();

    let mut layout = dark_layout(
        "3D Scatter: Match-wise Attempts vs Possession vs Goals",
        None,
        "black",
    );
    merge(
        &mut layout,
        json!({
            "updatemenus": [{ "buttons": buttons, "direction": "down", "showactive": true }],
            "scene": {
                "xaxis": { "title": { "text": "Attempts" } },
                "yaxis": { "title": { "text": "Possession (%)" } },
                "zaxis": { "title": { "text": "Goals" } },
            },
        }),
    );

    Figure {
        data,
        layout,
        frames: Vec::new(),
    }
}

pub fn bubble_sizeref(max_size: u32, max_px: f64) -> f64 {
    if max_size == 0 {
        return 1.0;
    }
    2.0 * f64::from(max_size) / (max_px * max_px)
}

fn frame_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn bubble_traces(rows: &[&MatchRow], sizeref1: f64, sizeref2: f64) -> [Value; 2] {
    let pick = |side: MatchSide| {
        let teams: Vec<&str> = rows.iter().map(|r| r.team(side)).collect();
        let goals: Vec<u32> = rows.iter().map(|r| r.goals(side)).collect();
        let sizes: Vec<u32> = rows.iter().map(|r| r.attempts(side)).collect();
        let colors: Vec<&str> = teams.iter().map(|t| team_color(t)).collect();
        (teams, goals, sizes, colors)
    };

    let (teams1, goals1, sizes1, colors1) = pick(MatchSide::Team1);
    let (teams2, goals2, sizes2, colors2) = pick(MatchSide::Team2);

    let customdata: Vec<Value> = rows
        .iter()
        .map(|r| {
            json!([
                r.team1,
                r.number_of_goals_team1,
                r.total_attempts_team1,
                frame_name(r.ts)
            ])
        })
        .collect();

    let team1 = json!({
        "type": "scatter",
        "x": teams1,
        "y": goals1,
        "mode": "markers",
        "name": "Team 1 Goals",
        "marker": {
            "size": sizes1,
            "sizemode": "area",
            "sizeref": sizeref1,
            "sizemin": BUBBLE_MIN_PX,
            "color": colors1,
        },
        "text": teams1,
        "hovertemplate": "<b>%{text}</b><br>Goals: %{y}<br>Total Attempts: %{marker.size}<extra></extra>",
    });

    let team2 = json!({
        "type": "scatter",
        "x": teams2,
        "y": goals2,
        "mode": "markers",
        "name": "Team 2 Goals",
        "marker": {
            "size": sizes2,
            "sizemode": "area",
            "sizeref": sizeref2,
            "sizemin": BUBBLE_MIN_PX,
            "color": colors2,
            "showscale": false,
        },
        "customdata": customdata,
        "hovertemplate": concat!(
            "<b>Match Details</b><br>",
            "Team 1: %{customdata[0]}<br>",
            "Team 2: %{x}<br>",
            "Team 1 Goals: %{customdata[1]}<br>",
            "Team 2 Goals: %{y}<br>",
            "Team 1 Attempts: %{customdata[2]}<br>",
            "Team 2 Attempts: %{marker.size}<br>",
            "Date: %{customdata[3]}<extra></extra>"
        ),
    });

    [team1, team2]
}

pub fn goals_bubble(rows: &[MatchRow]) -> Figure {
    let max_attempts1 = rows.iter().map(|r| r.total_attempts_team1).max().unwrap_or(0);
    let max_attempts2 = rows.iter().map(|r| r.total_attempts_team2).max().unwrap_or(0);
    let max_goals1 = rows.iter().map(|r| r.number_of_goals_team1).max().unwrap_or(0);
    let sizeref1 = bubble_sizeref(max_attempts1, TEAM1_BUBBLE_PX);
    let sizeref2 = bubble_sizeref(max_attempts2, TEAM2_BUBBLE_PX);

    let dates = unique_dates(rows);
    let frames: Vec<Value> = dates
        .iter()
        .map(|date| {
            let day: Vec<&MatchRow> = rows.iter().filter(|r| r.ts == *date).collect();
            json!({
                "name": frame_name(*date),
                "data": bubble_traces(&day, sizeref1, sizeref2),
            })
        })
        .collect();

    let data = frames
        .first()
        .and_then(|f| f.get("data"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let steps: Vec<Value> = dates
        .iter()
        .map(|date| {
            let name = frame_name(*date);
            json!({
                "method": "animate",
                "args": [[name], {
                    "mode": "immediate",
                    "transition": { "duration": STEP_MS },
                    "frame": { "duration": STEP_MS, "redraw": true },
                }],
                "label": name,
            })
        })
        .collect();

    let mut layout = dark_layout(
        "Goals Over Time: Team Performance",
        Some(TITLE_FONT_SIZE),
        BACKGROUND,
    );
    merge(
        &mut layout,
        json!({
            "height": 600,
            "showlegend": false,
            "xaxis": {
                "title": { "text": "Teams" },
                "type": "category",
                "categoryorder": "array",
                "categoryarray": distinct_teams(rows),
            },
            "yaxis": {
                "title": { "text": "Number of Goals" },
                "range": [0, max_goals1 + 2],
            },
            "updatemenus": [{
                "buttons": [
                    {
                        "args": [null, {
                            "frame": { "duration": PLAY_FRAME_MS, "redraw": true },
                            "fromcurrent": true,
                            "transition": { "duration": PLAY_TRANSITION_MS, "easing": "quadratic-in-out" },
                        }],
                        "label": "Play",
                        "method": "animate",
                    },
                    {
                        "args": [[null], {
                            "frame": { "duration": 0, "redraw": false },
                            "mode": "immediate",
                            "transition": { "duration": 0 },
                        }],
                        "label": "Pause",
                        "method": "animate",
                    },
                ],
                "direction": "left",
                "pad": { "r": 10, "t": 87 },
                "showactive": false,
                "type": "buttons",
                "x": 0.1,
                "xanchor": "right",
                "y": 0,
                "yanchor": "top",
            }],
            "sliders": [{
                "active": 0,
                "currentvalue": {
                    "font": { "size": 20, "color": FONT_COLOR },
                    "prefix": "Date: ",
                    "visible": true,
                    "xanchor": "right",
                },
                "transition": { "duration": STEP_MS, "easing": "cubic-in-out" },
                "pad": { "b": 10, "t": 50 },
                "len": 0.9,
                "x": 0.1,
                "xanchor": "left",
                "y": 0,
                "yanchor": "top",
                "bgcolor": "rgba(100, 100, 100, 0.2)",
                "bordercolor": "rgba(200, 200, 200, 0.5)",
                "borderwidth": 1,
                "steps": steps,
            }],
        }),
    );

    Figure {
        data,
        layout,
        frames,
    }
}

fn offense_series(block: &CategoryMetrics) -> [Vec<f64>; 4] {
    let teams = &block.teams;
    [
        teams.iter().map(|m| m.total_attempts).collect(),
        teams.iter().map(|m| m.on_target_pct).collect(),
        teams.iter().map(|m| m.goals).collect(),
        teams.iter().map(|m| m.assists).collect(),
    ]
}

fn labels(values: &[f64]) -> Vec<String> {
    values.iter().map(|v| format!("{v:.2}")).collect()
}

/// Arguments of a Plotly `update` call swapping all four bar series to `block`.
pub fn offense_update_args(block: &CategoryMetrics) -> Value {
    let teams: Vec<&str> = block.teams.iter().map(|m| m.team.as_str()).collect();
    let series = offense_series(block);
    let text: Vec<Vec<String>> = series.iter().map(|s| labels(s)).collect();
    json!({
        "x": vec![teams; OFFENSE_SERIES.len()],
        "y": series,
        "text": text,
    })
}

pub fn offensive_efficiency(metrics: &MetricsTable) -> Figure {
    let data: Vec<Value> = match metrics.default_category() {
        Some(block) => {
            let teams: Vec<&str> = block.teams.iter().map(|m| m.team.as_str()).collect();
            offense_series(block)
                .iter()
                .zip(OFFENSE_SERIES)
                .zip(OFFENSE_COLORS)
                .map(|((values, name), color)| {
                    json!({
                        "type": "bar",
                        "x": teams,
                        "y": values,
                        "name": name,
                        "marker": { "color": color, "line": { "width": 0 } },
                        "hoverinfo": "x+y+text",
                        "text": labels(values),
                    })
                })
                .collect()
        }
        None => Vec::new(),
    };

    let buttons: Vec<Value> = metrics
        .blocks
        .iter()
        .map(|block| {
            json!({
                "args": [offense_update_args(block)],
                "label": block.category,
                "method": "update",
            })
        })
        .collect();

    let mut layout = dark_layout("Stacked Bar Chart: Offensive Efficiency", None, BACKGROUND);
    merge(
        &mut layout,
        json!({
            "barmode": "stack",
            "xaxis": { "title": { "text": "Teams" }, "showgrid": false, "zeroline": false },
            "yaxis": { "title": { "text": "Offensive Metrics" }, "showgrid": false, "zeroline": false },
            "updatemenus": [{
                "buttons": buttons,
                "direction": "down",
                "showactive": true,
                "x": 0.5,
                "xanchor": "left",
                "y": 1.15,
                "yanchor": "top",
            }],
        }),
    );

    Figure {
        data,
        layout,
        frames: Vec::new(),
    }
}
