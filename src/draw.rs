use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::view::View;
use crate::ui::layout::LayoutAreas;
use crate::ui::panels;
use bgl_api::freshness::last_updated_label;
use bgl_api::season::Phase;
use bgl_api::{Cached, LeagueStats, Standings, TeamRoster, format_score};
use chrono::Utc;
use log::error;

static TABS: &[&str; 4] = &["Standings", "Weekly Results", "Teams", "Stats"];

const TEAM_CARD_WIDTH: u16 = 28;
const TEAM_CARD_HEIGHT: u16 = 5;

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        let main = draw_error_banner(f, layout.main, app);
        match app.state.views.active() {
            View::Standings => draw_standings(f, main, app),
            View::Weekly => draw_weekly(f, main, app),
            View::Teams => draw_teams(f, main, app),
            View::Stats => draw_stats(f, main, app),
        }

        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        if app.state.show_help {
            draw_help(f, f.area());
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
    if let Err(e) = result {
        error!("failed to draw frame: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(app.state.views.active().index())
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn phase_color(phase: &Phase) -> Color {
    match phase {
        Phase::Qualifiers { .. } => Color::Cyan,
        Phase::Prep { .. } => Color::Yellow,
        Phase::Comp { .. } => Color::Green,
        Phase::Ended { .. } => Color::Magenta,
        Phase::Upcoming { .. } => Color::Gray,
    }
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let phase = &app.state.phase;
    let color = phase_color(phase);
    let block = default_border(color);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let line = Line::from(vec![
        Span::styled(
            app.state.phase_label(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(phase.description(), Style::default().fg(Color::Gray)),
    ]);
    f.render_widget(Paragraph::new(line), inner);
}

/// Draws the banner above `area` when the controller holds an error and
/// returns what is left for the panel.
fn draw_error_banner(f: &mut Frame, area: Rect, app: &App) -> Rect {
    let Some(message) = app.state.views.error() else {
        return area;
    };
    let [banner, rest] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(area);
    f.render_widget(
        Paragraph::new(format!(" {message} (r to retry)"))
            .style(Style::default().fg(Color::White).bg(Color::Red)),
        banner,
    );
    rest
}

fn rank_style(rank: u32) -> Style {
    match rank {
        1 => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        2 => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        3 => Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::DarkGray),
    }
}

fn header_row<'a>(titles: &[&'a str]) -> Row<'a> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD))
        .bottom_margin(1)
}

fn draw_message(f: &mut Frame, area: Rect, msg: &str) {
    f.render_widget(
        Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center),
        area,
    );
}

/// Message for a panel that has never been filled.
fn empty_panel_message(app: &App, empty: &'static str) -> &'static str {
    if app.state.views.is_loading() { "Loading..." } else { empty }
}

fn draw_standings(f: &mut Frame, area: Rect, app: &App) {
    let selection = app.state.views.standings_week();
    let block = default_border(Color::White)
        .title(" Standings ")
        .title_bottom(Line::from(format!(" Week: {} (h/l) ", selection.label())).right_aligned());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some((standings, shown)) = app.state.panels.standings.as_ref() else {
        draw_message(f, inner, empty_panel_message(app, panels::NO_DATA));
        return;
    };

    let [header, subtitle, content] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Fill(1),
    ])
    .areas(inner);

    draw_standings_header(f, header, standings);
    f.render_widget(
        Paragraph::new(panels::standings_subtitle(*shown)).style(Style::default().fg(Color::Gray)),
        subtitle,
    );

    let rows = match panels::standings_rows(&standings.data, *shown) {
        Ok(rows) => rows,
        Err(msg) => {
            draw_message(f, content, msg);
            return;
        }
    };

    let rows = rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(Span::styled(row.rank.to_string(), rank_style(row.rank))),
            Cell::from(panels::team_label(row.team_number)),
            Cell::from(panels::pair_label(&row.player1, &row.player2)),
            Cell::from(Span::styled(
                format_score(row.score),
                Style::default().add_modifier(Modifier::BOLD),
            )),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["Rank", "Team", "Players", "Score"]));
    f.render_widget(table, content);
}

fn draw_standings_header(f: &mut Frame, area: Rect, standings: &Cached<Standings>) {
    let line = Line::from(vec![
        Span::styled("Current week: ", Style::default().fg(Color::Gray)),
        Span::raw(panels::week_or_dash(standings.data.current_week)),
        Span::styled("   Last updated: ", Style::default().fg(Color::Gray)),
        Span::raw(panels::standings_updated(standings, Utc::now())),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_weekly(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White)
        .title(" Weekly Results ")
        .title_bottom(
            Line::from(format!(" Week {} of {} (h/l) ", app.state.views.week(), app.state.views.total_weeks()))
                .right_aligned(),
        );
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some((week, results)) = app.state.panels.weekly.as_ref() else {
        draw_message(f, inner, empty_panel_message(app, panels::NO_RESULTS_YET));
        return;
    };

    let [header, content] =
        Layout::vertical([Constraint::Length(2), Constraint::Fill(1)]).areas(inner);
    draw_fetched_header(f, header, &format!("Week {week}"), results);

    let rows = match panels::weekly_rows(&results.data) {
        Ok(rows) => rows,
        Err(msg) => {
            draw_message(f, content, msg);
            return;
        }
    };

    let rows = rows.iter().map(|row| {
        // A negative bonus improves the final score.
        let bonus_style = if row.bonus_points < 0.0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(Span::styled(row.rank.to_string(), rank_style(row.rank))),
            Cell::from(panels::team_label(row.team_number)),
            Cell::from(panels::pair_label(&row.player1, &row.player2)),
            Cell::from(format_score(row.raw_position_sum)),
            Cell::from(Span::styled(format_score(row.bonus_points), bonus_style)),
            Cell::from(Span::styled(
                format_score(row.final_score),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Cell::from(format_score(row.cumulative_score)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Fill(1),
            Constraint::Length(6),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(11),
        ],
    )
    .header(header_row(&["Rank", "Team", "Players", "Raw", "Bonus", "Final", "Cumulative"]));
    f.render_widget(table, content);
}

fn draw_fetched_header<T>(f: &mut Frame, area: Rect, title: &str, cached: &Cached<T>) {
    let line = Line::from(vec![
        Span::styled(title.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled("   Fetched: ", Style::default().fg(Color::Gray)),
        Span::raw(last_updated_label(Some(cached.fetched_at), Utc::now())),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_teams(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Teams ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(roster) = app.state.panels.teams.as_ref() else {
        draw_message(f, inner, empty_panel_message(app, panels::NO_TEAMS));
        return;
    };
    draw_team_grid(f, inner, roster);
}

fn draw_team_grid(f: &mut Frame, area: Rect, roster: &Cached<TeamRoster>) {
    let teams = match panels::team_cards(&roster.data.teams) {
        Ok(teams) => teams,
        Err(msg) => {
            draw_message(f, area, msg);
            return;
        }
    };

    let columns = (area.width / TEAM_CARD_WIDTH).max(1);
    let visible_rows = (area.height / TEAM_CARD_HEIGHT).max(1);

    for (i, team) in teams.iter().enumerate() {
        let (row, col) = (i as u16 / columns, i as u16 % columns);
        if row >= visible_rows {
            break;
        }
        let card = Rect::new(
            area.x + col * TEAM_CARD_WIDTH,
            area.y + row * TEAM_CARD_HEIGHT,
            TEAM_CARD_WIDTH.min(area.width),
            TEAM_CARD_HEIGHT,
        );
        let block = default_border(Color::DarkGray).title(Span::styled(
            format!(" {} ", panels::team_label(team.team_number)),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        let lines = vec![
            Line::from(format!("  {}", team.player1.name)),
            Line::from(format!("  {}", team.player2.name)),
        ];
        f.render_widget(Paragraph::new(lines).block(block), card);
    }
}

fn draw_stats(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Stats ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(stats) = app.state.panels.stats.as_ref() else {
        draw_message(f, inner, empty_panel_message(app, panels::NO_STATS));
        return;
    };
    draw_stat_cards(f, inner, &stats.data);
}

fn draw_stat_cards(f: &mut Frame, area: Rect, stats: &LeagueStats) {
    let [cards_area, _] =
        Layout::vertical([Constraint::Length(5), Constraint::Fill(1)]).areas(area);
    let slots: [Rect; 4] = Layout::horizontal([Constraint::Ratio(1, 4); 4]).areas(cards_area);

    for ((label, value), slot) in panels::stat_cards(stats).into_iter().zip(slots) {
        let lines = vec![
            Line::from(Span::styled(
                value,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(label, Style::default().fg(Color::Gray))),
        ];
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(default_border(Color::DarkGray)),
            slot,
        );
    }
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Cyan))
        .style_debug(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from("1-4      switch view"),
        Line::from("Tab      next view (Shift-Tab previous)"),
        Line::from("h/l ←/→  change week"),
        Line::from("r        reload, skipping the cache"),
        Line::from("\"        toggle logs"),
        Line::from("f        full screen"),
        Line::from("Esc      close help"),
        Line::from("q        quit"),
    ];
    let width = 46.min(area.width);
    let height = (lines.len() as u16 + 2).min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(default_border(Color::White).title(" Help ")),
        popup,
    );
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::AppSettings;
    use crate::state::view::StandingsWeek;
    use bgl_api::{StandingRow, WeeklyResults};
    use chrono::NaiveDate;
    use std::collections::BTreeMap;
    use tui::backend::TestBackend;

    fn app() -> App {
        let now = NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        App::with_clock(AppSettings::default(), now)
    }

    fn screen(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        draw(&mut terminal, app, LoadingState::default());
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn standings_panel_lists_teams_and_phase() {
        let mut app = app();
        let row = StandingRow {
            rank: 1,
            team_number: 4,
            player1: "Ava".into(),
            player2: "Ben".into(),
            score: 12.0,
        };
        let standings = Standings {
            standings: vec![row],
            standings_by_week: Some(BTreeMap::new()),
            current_week: Some(1),
            ..Default::default()
        };
        app.state.panels.standings = Some((
            Cached { data: standings, fetched_at: Utc::now() },
            StandingsWeek::Current,
        ));

        let text = screen(&mut app);
        assert!(text.contains("Qualifier Seeds Open"));
        assert!(text.contains("Team 4"));
        assert!(text.contains("Ava & Ben"));
        assert!(text.contains("Cumulative scores across all competition weeks"));
    }

    #[test]
    fn error_banner_is_drawn_over_the_panel() {
        let mut app = app();
        let request = app.update_tab(View::Stats);
        app.on_view_loaded(&request, Err(bgl_api::ApiError::Config("down".into())));

        let text = screen(&mut app);
        assert!(text.contains("Failed to load stats"));
        assert!(text.contains(panels::NO_STATS));
    }

    #[test]
    fn weekly_panel_shows_empty_state() {
        let mut app = app();
        let request = app.update_tab(View::Weekly);
        let content = crate::state::view::ViewContent::Weekly {
            week: 1,
            results: Cached { data: WeeklyResults::default(), fetched_at: Utc::now() },
        };
        app.on_view_loaded(&request, Ok(content));

        assert!(screen(&mut app).contains(panels::NO_RESULTS_YET));
    }
}
