//! `--print <view> [week]`: one load through the view controller, written to
//! stdout as plain text instead of the terminal UI.

use crate::state::view::{Completion, Renderer, View, ViewContent, ViewController, fetch_view};
use crate::ui::panels;
use anyhow::{Context, anyhow, bail};
use bgl_api::{LeagueClient, format_score};
use chrono::Utc;
use std::fmt::Write;

#[derive(Default)]
struct TextRenderer {
    out: String,
}

impl Renderer for TextRenderer {
    fn render(&mut self, content: ViewContent) {
        self.out = render_text(&content);
    }
}

pub async fn print_view(
    client: &mut LeagueClient,
    total_weeks: u32,
    view: &str,
    week: Option<&str>,
) -> anyhow::Result<String> {
    let mut views = ViewController::new(total_weeks);
    let parsed: View = view.parse()?;

    if let Some(week) = week {
        let selector = parsed
            .selector()
            .ok_or_else(|| anyhow!("the {parsed} view has no week selector"))?;
        views.set_selector(selector.name(), week)?;
    }

    let request = views
        .begin_switch(view)
        .with_context(|| format!("could not show {view}"))?;
    // No logger runs in this mode, so the detailed cause travels with the error.
    let content = fetch_view(client, &request)
        .await
        .context(parsed.failure_message())?;

    let mut renderer = TextRenderer::default();
    match views.complete(&request, Ok(content), &mut renderer) {
        Completion::Rendered => Ok(renderer.out),
        Completion::Failed | Completion::Superseded => {
            bail!("{}", views.error().unwrap_or(parsed.failure_message()))
        }
    }
}

fn render_text(content: &ViewContent) -> String {
    let mut out = String::new();
    match content {
        ViewContent::Standings { standings, selection } => {
            let _ = writeln!(out, "Standings ({})", selection.label());
            let _ = writeln!(out, "{}", panels::standings_subtitle(*selection));
            let _ = writeln!(
                out,
                "Current week: {}   Last updated: {}\n",
                panels::week_or_dash(standings.data.current_week),
                panels::standings_updated(standings, Utc::now())
            );
            match panels::standings_rows(&standings.data, *selection) {
                Ok(rows) => {
                    let _ = writeln!(out, "{:<6}{:<10}{:<32}{}", "Rank", "Team", "Players", "Score");
                    for row in rows {
                        let _ = writeln!(
                            out,
                            "{:<6}{:<10}{:<32}{}",
                            row.rank,
                            panels::team_label(row.team_number),
                            panels::pair_label(&row.player1, &row.player2),
                            format_score(row.score)
                        );
                    }
                }
                Err(msg) => out.push_str(msg),
            }
        }
        ViewContent::Weekly { week, results } => {
            let _ = writeln!(out, "Weekly Results (Week {week})\n");
            match panels::weekly_rows(&results.data) {
                Ok(rows) => {
                    let _ = writeln!(
                        out,
                        "{:<6}{:<10}{:<32}{:<7}{:<7}{:<7}{}",
                        "Rank", "Team", "Players", "Raw", "Bonus", "Final", "Cumulative"
                    );
                    for row in rows {
                        let _ = writeln!(
                            out,
                            "{:<6}{:<10}{:<32}{:<7}{:<7}{:<7}{}",
                            row.rank,
                            panels::team_label(row.team_number),
                            panels::pair_label(&row.player1, &row.player2),
                            format_score(row.raw_position_sum),
                            format_score(row.bonus_points),
                            format_score(row.final_score),
                            format_score(row.cumulative_score)
                        );
                    }
                }
                Err(msg) => out.push_str(msg),
            }
        }
        ViewContent::Teams(roster) => {
            let _ = writeln!(out, "Teams\n");
            match panels::team_cards(&roster.data.teams) {
                Ok(teams) => {
                    for team in teams {
                        let _ = writeln!(
                            out,
                            "{:<10}{}",
                            panels::team_label(team.team_number),
                            panels::pair_label(&team.player1.name, &team.player2.name)
                        );
                    }
                }
                Err(msg) => out.push_str(msg),
            }
        }
        ViewContent::Stats(stats) => {
            let _ = writeln!(out, "Stats\n");
            for (label, value) in panels::stat_cards(&stats.data) {
                let _ = writeln!(out, "{label:<15}{value}");
            }
        }
    }
    out.trim_end().to_string()
}
