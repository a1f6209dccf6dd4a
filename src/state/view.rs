//! View-state controller: which panel is active, what its selectors say,
//! and which in-flight load is allowed to update the display.
//!
//! Navigation happens in two halves. A `begin_*` call mutates the view state
//! and hands back a [`LoadRequest`] stamped with a fresh generation; once the
//! data arrives, [`ViewController::complete`] applies it only if no newer
//! navigation happened in the meantime. The async `switch_view` and
//! `on_selector_change` helpers run both halves inline.

use bgl_api::league::weekly_params;
use bgl_api::{
    ApiResult, Cached, LeagueClient, LeagueStats, Params, Resource, Standings, TeamRoster,
    WeeklyResults,
};
use log::{debug, error};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("unknown view {0:?} (expected one of standings, weekly, teams, stats)")]
    UnknownView(String),

    #[error("unknown selector {0:?} (expected week or standings-week)")]
    UnknownSelector(String),

    #[error("invalid value {value:?} for {selector}")]
    InvalidSelection { selector: Selector, value: String },
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Standings,
    Weekly,
    Teams,
    Stats,
}

impl View {
    pub const ALL: [View; 4] = [View::Standings, View::Weekly, View::Teams, View::Stats];

    pub fn name(&self) -> &'static str {
        self.resource().as_str()
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Standings => "Standings",
            View::Weekly => "Weekly Results",
            View::Teams => "Teams",
            View::Stats => "Stats",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            View::Standings => Resource::Standings,
            View::Weekly => Resource::Weekly,
            View::Teams => Resource::Teams,
            View::Stats => Resource::Stats,
        }
    }

    /// Banner text shown when this view fails to load.
    pub fn failure_message(&self) -> &'static str {
        match self {
            View::Standings => "Failed to load standings",
            View::Weekly => "Failed to load weekly results",
            View::Teams => "Failed to load teams",
            View::Stats => "Failed to load stats",
        }
    }

    /// The dropdown that parameterises this view, if any.
    pub fn selector(&self) -> Option<Selector> {
        match self {
            View::Weekly => Some(Selector::Week),
            View::Standings => Some(Selector::StandingsWeek),
            View::Teams | View::Stats => None,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Standings => 0,
            View::Weekly => 1,
            View::Teams => 2,
            View::Stats => 3,
        }
    }

    pub fn next(self) -> Self {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn prev(self) -> Self {
        View::ALL[(self.index() + View::ALL.len() - 1) % View::ALL.len()]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for View {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ViewError::UnknownView(s.to_string()))
    }
}

/// Dropdown-style inputs that parameterise a view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Selector {
    /// Week shown by the weekly results view.
    Week,
    /// "current" or the week the standings are frozen after.
    StandingsWeek,
}

impl Selector {
    pub fn name(&self) -> &'static str {
        match self {
            Selector::Week => "week",
            Selector::StandingsWeek => "standings-week",
        }
    }

    pub fn view(&self) -> View {
        match self {
            Selector::Week => View::Weekly,
            Selector::StandingsWeek => View::Standings,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Selector {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Selector::Week),
            "standings-week" => Ok(Selector::StandingsWeek),
            other => Err(ViewError::UnknownSelector(other.to_string())),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StandingsWeek {
    #[default]
    Current,
    After(u32),
}

impl StandingsWeek {
    /// Position in the selector list: current first, then week 1, 2, ...
    pub fn position(&self) -> u32 {
        match self {
            StandingsWeek::Current => 0,
            StandingsWeek::After(week) => *week,
        }
    }

    pub fn from_position(position: u32) -> Self {
        match position {
            0 => StandingsWeek::Current,
            week => StandingsWeek::After(week),
        }
    }

    pub fn label(&self) -> String {
        match self {
            StandingsWeek::Current => "Current (All Weeks)".to_string(),
            StandingsWeek::After(week) => format!("After Week {week}"),
        }
    }
}

impl fmt::Display for StandingsWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StandingsWeek::Current => f.write_str("current"),
            StandingsWeek::After(week) => write!(f, "{week}"),
        }
    }
}

/// Everything needed to fetch one view, frozen at the moment of navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub view: View,
    pub generation: u64,
    pub week: u32,
    pub standings_week: StandingsWeek,
    /// Bypass the cache for this load.
    pub refresh: bool,
}

impl LoadRequest {
    pub fn params(&self) -> Params {
        match self.view {
            View::Weekly => weekly_params(self.week),
            _ => Params::new(),
        }
    }
}

/// Data ready to be shown in one panel.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewContent {
    Standings {
        standings: Cached<Standings>,
        selection: StandingsWeek,
    },
    Weekly {
        week: u32,
        results: Cached<WeeklyResults>,
    },
    Teams(Cached<TeamRoster>),
    Stats(Cached<LeagueStats>),
}

impl ViewContent {
    pub fn view(&self) -> View {
        match self {
            ViewContent::Standings { .. } => View::Standings,
            ViewContent::Weekly { .. } => View::Weekly,
            ViewContent::Teams(_) => View::Teams,
            ViewContent::Stats(_) => View::Stats,
        }
    }
}

/// Receives loaded content. Implementations replace whatever the view showed
/// before in one step.
pub trait Renderer {
    fn render(&mut self, content: ViewContent);
}

/// Fetch the data behind `request` through the cache.
pub async fn fetch_view(client: &mut LeagueClient, request: &LoadRequest) -> ApiResult<ViewContent> {
    if request.refresh {
        client.invalidate(request.view.resource(), &request.params());
    }
    let content = match request.view {
        View::Standings => ViewContent::Standings {
            standings: client.standings().await?,
            selection: request.standings_week,
        },
        View::Weekly => ViewContent::Weekly {
            week: request.week,
            results: client.weekly(request.week).await?,
        },
        View::Teams => ViewContent::Teams(client.teams().await?),
        View::Stats => ViewContent::Stats(client.stats().await?),
    };
    Ok(content)
}

/// What `complete` did with a load result.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Rendered,
    Failed,
    /// A newer navigation superseded this load; nothing was touched.
    Superseded,
}

#[derive(Debug)]
pub struct ViewController {
    active: View,
    generation: u64,
    total_weeks: u32,
    /// Week count reported by the last standings payload, when it had one.
    standings_weeks: Option<u32>,
    week: u32,
    standings_week: StandingsWeek,
    error: Option<String>,
    loading: bool,
}

impl ViewController {
    pub fn new(total_weeks: u32) -> Self {
        Self {
            active: View::default(),
            generation: 0,
            total_weeks: total_weeks.max(1),
            standings_weeks: None,
            week: 1,
            standings_week: StandingsWeek::Current,
            error: None,
            loading: false,
        }
    }

    pub fn active(&self) -> View {
        self.active
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total_weeks(&self) -> u32 {
        self.total_weeks
    }

    /// Highest week the standings selector offers: the standings payload's
    /// own count once one has loaded, the configured count before that.
    pub fn standings_week_limit(&self) -> u32 {
        self.standings_weeks.unwrap_or(self.total_weeks)
    }

    pub fn week(&self) -> u32 {
        self.week
    }

    pub fn standings_week(&self) -> StandingsWeek {
        self.standings_week
    }

    /// Validate `name` and make it the active view. Unknown names change
    /// nothing.
    pub fn begin_switch(&mut self, name: &str) -> Result<LoadRequest, ViewError> {
        let view = name.parse::<View>()?;
        Ok(self.begin_switch_to(view))
    }

    pub fn begin_switch_to(&mut self, view: View) -> LoadRequest {
        debug!("switching to {view} view");
        self.active = view;
        self.error = None;
        self.next_request(false)
    }

    /// Record a selector value without loading anything.
    pub fn set_selector(&mut self, selector: &str, value: &str) -> Result<Selector, ViewError> {
        let selector = selector.parse::<Selector>()?;
        let invalid = || ViewError::InvalidSelection {
            selector,
            value: value.to_string(),
        };
        let value = value.trim();

        match selector {
            Selector::Week => {
                let week = value.parse::<u32>().map_err(|_| invalid())?;
                if !(1..=self.total_weeks).contains(&week) {
                    return Err(invalid());
                }
                self.week = week;
            }
            Selector::StandingsWeek => {
                let position = if value == "current" {
                    0
                } else {
                    value.parse::<u32>().ok().filter(|w| *w >= 1).ok_or_else(|| invalid())?
                };
                if position > self.standings_week_limit() {
                    return Err(invalid());
                }
                self.standings_week = StandingsWeek::from_position(position);
            }
        }
        Ok(selector)
    }

    /// Record a selector value; if it parameterises the active view, start
    /// reloading that view with it.
    pub fn begin_selector_change(
        &mut self,
        selector: &str,
        value: &str,
    ) -> Result<Option<LoadRequest>, ViewError> {
        let selector = self.set_selector(selector, value)?;
        if selector.view() != self.active {
            return Ok(None);
        }
        self.error = None;
        Ok(Some(self.next_request(false)))
    }

    /// Move the active view's selector by `delta` steps, clamped to the
    /// available weeks. `None` when the view has no selector or it is
    /// already at the edge.
    pub fn step_selector(&mut self, delta: i64) -> Option<LoadRequest> {
        let (selector, current, min, max) = match self.active {
            View::Weekly => (Selector::Week, self.week, 1, self.total_weeks),
            View::Standings => (
                Selector::StandingsWeek,
                self.standings_week.position(),
                0,
                self.standings_week_limit(),
            ),
            View::Teams | View::Stats => return None,
        };
        let target = (i64::from(current) + delta).clamp(i64::from(min), i64::from(max));
        if target == i64::from(current) {
            return None;
        }
        let value = match selector {
            Selector::Week => target.to_string(),
            Selector::StandingsWeek => StandingsWeek::from_position(target as u32).to_string(),
        };
        self.begin_selector_change(selector.name(), &value)
            .ok()
            .flatten()
    }

    /// Reload the active view, skipping the cache.
    pub fn begin_reload(&mut self) -> LoadRequest {
        self.error = None;
        self.next_request(true)
    }

    /// Apply a finished load. Results from superseded requests are dropped
    /// without touching the display or the error banner.
    pub fn complete<R: Renderer>(
        &mut self,
        request: &LoadRequest,
        result: ApiResult<ViewContent>,
        renderer: &mut R,
    ) -> Completion {
        if request.generation != self.generation || request.view != self.active {
            debug!(
                "discarding {} load from generation {} (now {})",
                request.view, request.generation, self.generation
            );
            return Completion::Superseded;
        }

        self.loading = false;
        match result {
            Ok(content) => {
                self.error = None;
                if let ViewContent::Standings { standings, .. } = &content
                    && let Some(weeks) = standings.data.total_weeks.filter(|w| *w > 0)
                {
                    self.standings_weeks = Some(weeks);
                }
                renderer.render(content);
                Completion::Rendered
            }
            Err(e) => {
                error!("error loading {} view: {e}", request.view);
                self.error = Some(request.view.failure_message().to_string());
                Completion::Failed
            }
        }
    }

    pub async fn switch_view<R: Renderer>(
        &mut self,
        name: &str,
        client: &mut LeagueClient,
        renderer: &mut R,
    ) -> Result<Completion, ViewError> {
        let request = self.begin_switch(name)?;
        let result = fetch_view(client, &request).await;
        Ok(self.complete(&request, result, renderer))
    }

    pub async fn on_selector_change<R: Renderer>(
        &mut self,
        selector: &str,
        value: &str,
        client: &mut LeagueClient,
        renderer: &mut R,
    ) -> Result<Option<Completion>, ViewError> {
        let Some(request) = self.begin_selector_change(selector, value)? else {
            return Ok(None);
        };
        let result = fetch_view(client, &request).await;
        Ok(Some(self.complete(&request, result, renderer)))
    }

    fn next_request(&mut self, refresh: bool) -> LoadRequest {
        self.generation += 1;
        self.loading = true;
        LoadRequest {
            view: self.active,
            generation: self.generation,
            week: self.week,
            standings_week: self.standings_week,
            refresh,
        }
    }
}
