use crate::state::view::{Renderer, StandingsWeek, ViewContent, ViewController};
use bgl_api::season::{Phase, Schedule, current_phase};
use bgl_api::{Cached, LeagueStats, Standings, TeamRoster, WeeklyResults};
use chrono::NaiveDateTime;

// ---------------------------------------------------------------------------
// Panel contents: the last successfully loaded data for each view
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Panels {
    pub standings: Option<(Cached<Standings>, StandingsWeek)>,
    pub weekly: Option<(u32, Cached<WeeklyResults>)>,
    pub teams: Option<Cached<TeamRoster>>,
    pub stats: Option<Cached<LeagueStats>>,
}

impl Renderer for Panels {
    fn render(&mut self, content: ViewContent) {
        match content {
            ViewContent::Standings { standings, selection } => {
                self.standings = Some((standings, selection));
            }
            ViewContent::Weekly { week, results } => self.weekly = Some((week, results)),
            ViewContent::Teams(teams) => self.teams = Some(teams),
            ViewContent::Stats(stats) => self.stats = Some(stats),
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub views: ViewController,
    pub panels: Panels,
    pub schedule: Schedule,
    pub phase: Phase,
    pub show_help: bool,
    pub show_logs: bool,
}

impl AppState {
    pub fn new(total_weeks: u32, schedule: Schedule, now: NaiveDateTime) -> Self {
        let phase = current_phase(now, &schedule);
        Self {
            views: ViewController::new(total_weeks),
            panels: Panels::default(),
            schedule,
            phase,
            show_help: false,
            show_logs: false,
        }
    }

    /// Re-derive the season phase. Never cached beyond this evaluation.
    pub fn refresh_phase(&mut self, now: NaiveDateTime) {
        self.phase = current_phase(now, &self.schedule);
    }

    pub fn phase_label(&self) -> String {
        self.phase.label(&self.schedule.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn phase_follows_the_clock() {
        let mut state = AppState::new(4, Schedule::season_one(), at(2026, 1, 20));
        assert_eq!(state.phase_label(), "Qualifier Seeds Open");

        state.refresh_phase(at(2026, 2, 3));
        assert_eq!(state.phase_label(), "Competition Week 1 - LIVE");

        state.refresh_phase(at(2026, 4, 1));
        assert_eq!(state.phase_label(), "Season 1 Complete");
    }

    #[test]
    fn rendering_replaces_only_the_matching_panel() {
        let mut panels = Panels::default();
        panels.render(ViewContent::Weekly {
            week: 1,
            results: Cached { data: WeeklyResults::default(), fetched_at: Utc::now() },
        });
        panels.render(ViewContent::Weekly {
            week: 2,
            results: Cached { data: WeeklyResults::default(), fetched_at: Utc::now() },
        });

        assert_eq!(panels.weekly.as_ref().map(|(week, _)| *week), Some(2));
        assert!(panels.standings.is_none());
        assert!(panels.teams.is_none());
    }
}
