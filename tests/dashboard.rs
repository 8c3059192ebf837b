use std::path::PathBuf;

use serde_json::Value;

use wc22_dashboard::dataset::{MatchRow, MatchSide, load_matches};
use wc22_dashboard::figures::{
    OFFENSE_SERIES, UNKNOWN_TEAM_COLOR, bubble_sizeref, build_dashboard, goals_bubble,
    offensive_efficiency, parallel_coordinates, scatter_3d, side_visibility, team_color,
};
use wc22_dashboard::metrics::compute_metrics;
use wc22_dashboard::page::render_page;

fn fixture_rows() -> Vec<MatchRow> {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("matches_small.csv");
    load_matches(&path).expect("fixture should load")
}

fn strings(v: &Value) -> Vec<&str> {
    v.as_array()
        .expect("array")
        .iter()
        .map(|s| s.as_str().expect("string"))
        .collect()
}

#[test]
fn parallel_coordinates_has_six_dimensions() {
    let rows = fixture_rows();
    let fig = parallel_coordinates(&rows);
    assert_eq!(fig.data.len(), 1);
    let trace = &fig.data[0];
    assert_eq!(trace["type"], "parcoords");
    let dims = trace["dimensions"].as_array().unwrap();
    assert_eq!(dims.len(), 6);
    assert_eq!(dims[0]["label"], "possession_team1");
    assert_eq!(dims[0]["values"].as_array().unwrap().len(), rows.len());
    assert_eq!(trace["line"]["colorscale"], "Viridis");
    assert_eq!(fig.layout["plot_bgcolor"], "black");
}

#[test]
fn parallel_dimensions_carry_their_own_columns() {
    let rows = fixture_rows();
    let fig = parallel_coordinates(&rows);
    let dims = fig.data[0]["dimensions"].as_array().unwrap();
    let values = |i: usize| -> Vec<f64> {
        dims[i]["values"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_f64().unwrap())
            .collect()
    };

    assert_eq!(dims[2]["label"], "number_of_goals_team1");
    let goals: Vec<f64> = rows.iter().map(|r| f64::from(r.number_of_goals_team1)).collect();
    assert_eq!(values(2), goals);
    assert_eq!(fig.data[0]["line"]["color"], serde_json::json!(goals));

    assert_eq!(dims[5]["label"], "total_attempts_team2");
    let attempts: Vec<f64> = rows.iter().map(|r| f64::from(r.total_attempts_team2)).collect();
    assert_eq!(values(5), attempts);
    assert!(values(1).iter().all(|v| *v > 0.0));
}

#[test]
fn title_font_size_only_on_parallel_and_bubble() {
    let rows = fixture_rows();
    let metrics = compute_metrics(&rows);
    let dashboard = build_dashboard(&rows, &metrics);
    let title = |id: &str| dashboard.figure(id).unwrap().layout["title"].clone();

    assert_eq!(title("parallel")["font"]["size"], 18);
    assert_eq!(title("bubble")["font"]["size"], 18);
    assert!(title("scatter3d").get("font").is_none());
    assert!(title("offense").get("font").is_none());
    assert_eq!(title("offense")["text"], "Stacked Bar Chart: Offensive Efficiency");
}

#[test]
fn scatter_3d_dropdown_toggles_sides() {
    let rows = fixture_rows();
    let fig = scatter_3d(&rows);
    assert_eq!(fig.data.len(), rows.len() * 2);
    assert_eq!(fig.data[0]["visible"], true);
    assert_eq!(fig.data[rows.len()]["visible"], false);
    assert_eq!(fig.data[0]["name"], "Qatar vs Ecuador (20 NOV 2022)");
    assert_eq!(fig.data[rows.len()]["text"], "Ecuador (20 NOV 2022)");
    assert_eq!(fig.data[0]["marker"]["size"], 0);

    let buttons = fig.layout["updatemenus"][0]["buttons"].as_array().unwrap();
    assert_eq!(buttons.len(), 2);
    assert_eq!(buttons[0]["label"], "Team 1");
    assert_eq!(buttons[1]["label"], "Team 2");
    let team2_mask = buttons[1]["args"][0]["visible"].as_array().unwrap();
    assert_eq!(team2_mask.len(), rows.len() * 2);
    assert_eq!(team2_mask[0], false);
    assert_eq!(team2_mask[rows.len()], true);
}

#[test]
fn side_visibility_splits_in_half() {
    assert_eq!(side_visibility(2, MatchSide::Team1), vec![true, true, false, false]);
    assert_eq!(side_visibility(2, MatchSide::Team2), vec![false, false, true, true]);
    assert!(side_visibility(0, MatchSide::Team1).is_empty());
}

#[test]
fn bubble_chart_has_one_frame_per_match_day() {
    let rows = fixture_rows();
    let fig = goals_bubble(&rows);
    assert_eq!(fig.frames.len(), 4);
    assert_eq!(fig.frames[0]["name"], "2022-11-20");
    assert_eq!(fig.frames[1]["name"], "2022-11-21");

    let day_two = fig.frames[1]["data"].as_array().unwrap();
    assert_eq!(day_two.len(), 2);
    assert_eq!(strings(&day_two[0]["x"]), vec!["England", "Senegal"]);
    assert_eq!(strings(&day_two[1]["x"]), vec!["Iran", "Netherlands"]);
    assert_eq!(day_two[1]["customdata"][0][0], "England");

    // Initial traces are the first frame.
    assert_eq!(fig.data.len(), 2);
    assert_eq!(strings(&fig.data[0]["x"]), vec!["Qatar"]);

    let steps = fig.layout["sliders"][0]["steps"].as_array().unwrap();
    assert_eq!(steps.len(), 4);
    assert_eq!(steps[3]["args"][0][0], "2022-12-04");
    assert_eq!(fig.layout["sliders"][0]["currentvalue"]["prefix"], "Date: ");

    let buttons = fig.layout["updatemenus"][0]["buttons"].as_array().unwrap();
    assert_eq!(buttons[0]["label"], "Play");
    assert_eq!(buttons[0]["args"][1]["frame"]["duration"], 2000);
    assert_eq!(buttons[1]["label"], "Pause");

    assert_eq!(fig.layout["yaxis"]["range"][1], 8);
}

#[test]
fn bubble_sizes_scale_to_largest_attempts() {
    assert_eq!(bubble_sizeref(14, 40.0), 2.0 * 14.0 / 1600.0);
    assert_eq!(bubble_sizeref(0, 40.0), 1.0);

    let fig = goals_bubble(&fixture_rows());
    assert_eq!(fig.frames[0]["data"][1]["marker"]["sizeref"], 2.0 * 14.0 / 1600.0);
    assert_eq!(fig.frames[0]["data"][1]["marker"]["sizemin"], 4);
}

#[test]
fn team_colors_ignore_case() {
    assert_eq!(team_color("Qatar"), "#d62728");
    assert_eq!(team_color("QATAR"), "#d62728");
    assert_eq!(team_color("Atlantis"), UNKNOWN_TEAM_COLOR);
}

#[test]
fn offense_chart_stacks_default_category_with_dropdown() {
    let rows = fixture_rows();
    let metrics = compute_metrics(&rows);
    let fig = offensive_efficiency(&metrics);

    assert_eq!(fig.data.len(), OFFENSE_SERIES.len());
    assert_eq!(fig.layout["barmode"], "stack");
    let names: Vec<&str> = fig.data.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, OFFENSE_SERIES.to_vec());
    assert_eq!(fig.data[0]["x"].as_array().unwrap().len(), metrics.teams.len());
    // Group A, Qatar.
    assert_eq!(fig.data[0]["y"][0], 31.0);
    assert_eq!(fig.data[1]["text"][0], "29.03");

    let buttons = fig.layout["updatemenus"][0]["buttons"].as_array().unwrap();
    assert_eq!(buttons.len(), 3);
    assert_eq!(buttons[1]["label"], "Group B");
    let update = &buttons[1]["args"][0];
    assert_eq!(update["y"].as_array().unwrap().len(), 4);
    // Group B, England is the second team.
    assert_eq!(update["y"][2][1], 8.0);
    assert_eq!(update["x"][3][1], "England");
}

#[test]
fn empty_input_still_builds_layouts() {
    let metrics = compute_metrics(&[]);
    let dashboard = build_dashboard(&[], &metrics);
    assert_eq!(dashboard.figures.len(), 4);
    for (_, fig) in &dashboard.figures {
        assert!(fig.data.is_empty());
        assert!(fig.frames.is_empty());
        assert!(fig.layout.is_object());
    }
}

#[test]
fn page_embeds_every_figure() {
    let rows = fixture_rows();
    let metrics = compute_metrics(&rows);
    let dashboard = build_dashboard(&rows, &metrics);
    let html = render_page(&dashboard, "https://cdn.example/plotly.js").unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<h1>FIFA World Cup Match Analysis Dashboard</h1>"));
    assert!(html.contains("<script src=\"https://cdn.example/plotly.js\"></script>"));
    for id in ["parallel", "scatter3d", "bubble", "offense"] {
        assert!(html.contains(&format!("id=\"chart-{id}\"")), "missing {id}");
        assert!(dashboard.figure(id).is_some());
    }
    assert_eq!(html.matches("Plotly.newPlot(").count(), 4);
    assert_eq!(html.matches("Plotly.addFrames(").count(), 1);
    assert_eq!(html.matches("class=\"row\"").count(), 2);
}

#[test]
fn figures_json_is_keyed_by_id() {
    let rows = fixture_rows();
    let metrics = compute_metrics(&rows);
    let json = build_dashboard(&rows, &metrics).figures_json().unwrap();
    assert_eq!(json.as_object().unwrap().len(), 4);
    assert!(json["bubble"]["frames"].is_array());
    assert!(json["offense"].get("frames").is_none());
}

#[test]
fn figures_json_serializes_every_figure() {
    let rows = fixture_rows();
    let metrics = compute_metrics(&rows);
    let dashboard = build_dashboard(&rows, &metrics);
    let json = dashboard.figures_json().expect("figures should serialize");
    for (id, fig) in &dashboard.figures {
        assert_eq!(json[id.as_str()], serde_json::to_value(fig).unwrap(), "{id}");
        assert!(!json[id.as_str()]["layout"].is_null());
    }

    let empty = build_dashboard(&[], &compute_metrics(&[]));
    let html = render_page(&empty, "/plotly.js").expect("empty dashboard should render");
    assert_eq!(html.matches("var fig = {").count(), 4);
}
