pub mod cache;
pub mod client;
pub mod freshness;
pub mod league;
pub mod season;

pub use client::{ApiError, ApiResult, BglApi, ErrorKind};
pub use league::{Cached, LeagueClient};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Resources: the `endpoint` query parameter understood by the league API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Standings,
    Weekly,
    Teams,
    Stats,
}

impl Resource {
    pub const ALL: [Resource; 4] = [
        Resource::Standings,
        Resource::Weekly,
        Resource::Teams,
        Resource::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Standings => "standings",
            Resource::Weekly => "weekly",
            Resource::Teams => "teams",
            Resource::Stats => "stats",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Resource::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ApiError::Config(format!("unknown endpoint {s:?}")))
    }
}

/// Query parameters sent alongside `endpoint`. Sorted, so two maps with the
/// same pairs always produce the same cache key.
pub type Params = BTreeMap<String, String>;

/// Build a parameter map from literal pairs.
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect()
}

// ---------------------------------------------------------------------------
// Payload types: the JSON shapes returned by each endpoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Standings {
    pub standings: Vec<StandingRow>,
    /// Cumulative standings as they stood after each completed week.
    pub standings_by_week: Option<BTreeMap<u32, Vec<StandingRow>>>,
    pub current_week: Option<u32>,
    pub total_weeks: Option<u32>,
    pub last_updated: Option<String>,
}

impl Standings {
    /// The server's own "last updated" stamp, if it sent a parseable one.
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_updated.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Rows for the "after week N" view. Empty when that week has no data.
    pub fn after_week(&self, week: u32) -> &[StandingRow] {
        self.standings_by_week
            .as_ref()
            .and_then(|by_week| by_week.get(&week))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StandingRow {
    pub rank: u32,
    pub team_number: u32,
    pub player1: String,
    pub player2: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyResults {
    pub results: Vec<WeeklyRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeeklyRow {
    pub rank: u32,
    pub team_number: u32,
    pub player1: String,
    pub player2: String,
    pub raw_position_sum: f64,
    pub bonus_points: f64, // negative bonus lowers (improves) the final score
    pub final_score: f64,
    pub cumulative_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeamRoster {
    pub teams: Vec<Team>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub team_number: u32,
    pub player1: Player,
    pub player2: Player,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Player {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueStats {
    pub total_teams: u32,
    pub total_players: u32,
    pub current_week: Option<u32>,
    pub leader_team: Option<LeaderTeam>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaderTeam {
    pub team_number: u32,
}

/// Scores arrive as JSON numbers; whole values print without a decimal point.
pub fn format_score(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_payload_deserializes_with_week_keys() {
        let raw = r#"{
            "standings": [
                {"rank": 1, "teamNumber": 7, "player1": "Ava", "player2": "Ben", "score": 42}
            ],
            "standingsByWeek": {
                "1": [{"rank": 1, "teamNumber": 3, "player1": "Cy", "player2": "Di", "score": 11}]
            },
            "currentWeek": 2,
            "totalWeeks": 4,
            "lastUpdated": "2026-02-03T10:00:00Z"
        }"#;
        let standings: Standings = serde_json::from_str(raw).unwrap();
        assert_eq!(standings.standings[0].team_number, 7);
        assert_eq!(standings.after_week(1)[0].team_number, 3);
        assert!(standings.after_week(2).is_empty());
        assert_eq!(standings.current_week, Some(2));
        assert!(standings.last_updated_at().is_some());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let stats: LeagueStats = serde_json::from_str(r#"{"totalTeams": 12}"#).unwrap();
        assert_eq!(stats.total_teams, 12);
        assert_eq!(stats.total_players, 0);
        assert!(stats.leader_team.is_none());

        let standings: Standings = serde_json::from_str("{}").unwrap();
        assert!(standings.standings_by_week.is_none());
        assert!(standings.last_updated_at().is_none());
    }

    #[test]
    fn roster_reads_nested_player_names() {
        let raw = r#"{"teams": [{"teamNumber": 4, "player1": {"name": "Eve"}, "player2": {"name": "Fox"}}]}"#;
        let roster: TeamRoster = serde_json::from_str(raw).unwrap();
        assert_eq!(roster.teams[0].player1.name, "Eve");
        assert_eq!(roster.teams[0].player2.name, "Fox");
    }

    #[test]
    fn resource_names_round_trip_through_from_str() {
        for resource in Resource::ALL {
            assert_eq!(resource.as_str().parse::<Resource>().unwrap(), resource);
        }
        assert!("scores".parse::<Resource>().is_err());
    }

    #[test]
    fn scores_print_without_trailing_zeroes() {
        assert_eq!(format_score(42.0), "42");
        assert_eq!(format_score(-3.0), "-3");
        assert_eq!(format_score(12.5), "12.5");
    }
}
