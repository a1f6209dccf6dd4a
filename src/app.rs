use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::view::{Completion, LoadRequest, View, ViewContent};
use bgl_api::ApiResult;
use bgl_api::season::Schedule;
use chrono::{Local, NaiveDateTime};

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self::with_clock(settings, Local::now().naive_local())
    }

    pub fn with_clock(settings: AppSettings, now: NaiveDateTime) -> Self {
        let app = Self {
            state: AppState::new(settings.total_weeks, Schedule::season_one(), now),
            settings,
        };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_view_loaded(
        &mut self,
        request: &LoadRequest,
        result: ApiResult<ViewContent>,
    ) -> Completion {
        let AppState { views, panels, .. } = &mut self.state;
        views.complete(request, result, panels)
    }

    pub fn on_phase_tick(&mut self, now: NaiveDateTime) {
        self.state.refresh_phase(now);
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: View) -> LoadRequest {
        self.state.show_help = false;
        self.state.views.begin_switch_to(next)
    }

    pub fn next_view(&mut self) -> LoadRequest {
        let next = self.state.views.active().next();
        self.update_tab(next)
    }

    pub fn prev_view(&mut self) -> LoadRequest {
        let prev = self.state.views.active().prev();
        self.update_tab(prev)
    }

    /// Move the week dropdown of the active view.
    pub fn step_selector(&mut self, delta: i64) -> Option<LoadRequest> {
        self.state.views.step_selector(delta)
    }

    pub fn reload(&mut self) -> LoadRequest {
        self.state.views.begin_reload()
    }

    pub fn toggle_help(&mut self) {
        self.state.show_help = !self.state.show_help;
    }

    pub fn exit_help(&mut self) {
        self.state.show_help = false;
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}
