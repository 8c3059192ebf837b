use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::dataset::MatchRow;

/// Offensive totals for one team within one match category.
///
/// The sums cover both sides of every match the team played in that
/// category, so `goals` is the total scored in those matches, not only the
/// team's own goals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCategoryMetrics {
    pub team: String,
    pub category: String,
    pub total_attempts: f64,
    pub on_target_pct: f64,
    pub goals: f64,
    pub assists: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub teams: Vec<TeamCategoryMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsTable {
    pub teams: Vec<String>,
    pub categories: Vec<String>,
    pub blocks: Vec<CategoryMetrics>,
}

impl MetricsTable {
    pub fn category(&self, name: &str) -> Option<&CategoryMetrics> {
        self.blocks.iter().find(|b| b.category == name)
    }

    pub fn default_category(&self) -> Option<&CategoryMetrics> {
        self.blocks.first()
    }

    pub fn records(&self) -> impl Iterator<Item = &TeamCategoryMetrics> + '_ {
        self.blocks.iter().flat_map(|b| b.teams.iter())
    }

    pub fn get(&self, team: &str, category: &str) -> Option<&TeamCategoryMetrics> {
        self.category(category)?
            .teams
            .iter()
            .find(|m| m.team == team)
    }
}

/// Every team1 value in row order, then every team2 value, deduplicated.
pub fn distinct_teams(rows: &[MatchRow]) -> Vec<String> {
    let names = rows
        .iter()
        .map(|r| r.team1.as_str())
        .chain(rows.iter().map(|r| r.team2.as_str()));
    first_appearance(names)
}

pub fn distinct_categories(rows: &[MatchRow]) -> Vec<String> {
    first_appearance(rows.iter().map(|r| r.category.as_str()))
}

fn first_appearance<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

pub fn team_category_metrics(rows: &[MatchRow], team: &str, category: &str) -> TeamCategoryMetrics {
    let matches = rows.iter().filter(|r| r.category == category);
    aggregate(team, category, matches)
}

fn aggregate<'a>(
    team: &str,
    category: &str,
    matches: impl Iterator<Item = &'a MatchRow>,
) -> TeamCategoryMetrics {
    let mut attempts = 0u64;
    let mut on_target = 0u64;
    let mut goals = 0u64;
    let mut assists = 0u64;

    for m in matches.filter(|m| m.involves(team)) {
        attempts += u64::from(m.total_attempts_team1) + u64::from(m.total_attempts_team2);
        on_target += u64::from(m.on_target_attempts_team1) + u64::from(m.on_target_attempts_team2);
        goals += u64::from(m.number_of_goals_team1) + u64::from(m.number_of_goals_team2);
        assists += u64::from(m.assists_team1) + u64::from(m.assists_team2);
    }

    let on_target_pct = if attempts == 0 {
        0.0
    } else {
        round2(100.0 * on_target as f64 / attempts as f64)
    };

    TeamCategoryMetrics {
        team: team.to_string(),
        category: category.to_string(),
        total_attempts: round2(attempts as f64),
        on_target_pct,
        goals: round2(goals as f64),
        assists: round2(assists as f64),
    }
}

pub fn compute_metrics(rows: &[MatchRow]) -> MetricsTable {
    let teams = distinct_teams(rows);
    let categories = distinct_categories(rows);

    let blocks: Vec<CategoryMetrics> = categories
        .par_iter()
        .map(|category| {
            let in_category: Vec<&MatchRow> =
                rows.iter().filter(|r| &r.category == category).collect();
            let teams = teams
                .iter()
                .map(|team| aggregate(team, category, in_category.iter().copied()))
                .collect();
            CategoryMetrics {
                category: category.clone(),
                teams,
            }
        })
        .collect();

    debug!(
        teams = teams.len(),
        categories = categories.len(),
        "computed offensive metrics"
    );

    MetricsTable {
        teams,
        categories,
        blocks,
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
