//! Presentation rules shared by the terminal panels and `--print`.

use crate::state::view::StandingsWeek;
use bgl_api::freshness::last_updated_label;
use bgl_api::{Cached, LeagueStats, StandingRow, Standings, Team, WeeklyResults, WeeklyRow};
use chrono::{DateTime, Utc};

pub const NO_DATA: &str = "No data available";
pub const NO_DATA_FOR_WEEK: &str = "No data for this week";
pub const NO_RESULTS_YET: &str = "No results for this week yet";
pub const NO_TEAMS: &str = "No teams found";
pub const NO_STATS: &str = "No stats available";

/// Rows to show for the chosen standings week, or the empty-state message.
pub fn standings_rows(
    standings: &Standings,
    selection: StandingsWeek,
) -> Result<&[StandingRow], &'static str> {
    if standings.standings_by_week.is_none() {
        return Err(NO_DATA);
    }
    let rows = match selection {
        StandingsWeek::Current => standings.standings.as_slice(),
        StandingsWeek::After(week) => standings.after_week(week),
    };
    if rows.is_empty() { Err(NO_DATA_FOR_WEEK) } else { Ok(rows) }
}

pub fn standings_subtitle(selection: StandingsWeek) -> String {
    match selection {
        StandingsWeek::Current => "Cumulative scores across all competition weeks".to_string(),
        StandingsWeek::After(week) => format!("Cumulative scores through Week {week}"),
    }
}

/// Server stamp when it sent one, otherwise when we fetched the payload.
pub fn standings_updated(standings: &Cached<Standings>, now: DateTime<Utc>) -> String {
    let then = standings.data.last_updated_at().unwrap_or(standings.fetched_at);
    last_updated_label(Some(then), now)
}

pub fn weekly_rows(results: &WeeklyResults) -> Result<&[WeeklyRow], &'static str> {
    if results.results.is_empty() {
        Err(NO_RESULTS_YET)
    } else {
        Ok(&results.results)
    }
}

pub fn team_cards(teams: &[Team]) -> Result<&[Team], &'static str> {
    if teams.is_empty() { Err(NO_TEAMS) } else { Ok(teams) }
}

pub fn stat_cards(stats: &LeagueStats) -> [(&'static str, String); 4] {
    [
        ("Total Teams", stats.total_teams.to_string()),
        ("Total Players", stats.total_players.to_string()),
        ("Current Week", week_or_dash(stats.current_week)),
        (
            "Leading Team",
            stats
                .leader_team
                .as_ref()
                .map(|t| format!("Team {}", t.team_number))
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}

pub fn week_or_dash(week: Option<u32>) -> String {
    week.map(|w| w.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn team_label(team_number: u32) -> String {
    format!("Team {team_number}")
}

pub fn pair_label(player1: &str, player2: &str) -> String {
    format!("{player1} & {player2}")
}
