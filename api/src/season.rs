//! Season calendar and the phase lookup driving the status banner.
//!
//! All instants are local wall-clock times, matching how the league
//! announces its schedule.

use chrono::{NaiveDate, NaiveDateTime};

/// One competition week: a prep window followed by the competition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub week: u32,
    pub prep_start: NaiveDateTime,
    pub comp_start: NaiveDateTime,
    pub comp_end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub name: String,
    pub qualifiers_open: NaiveDateTime,
    pub qualifiers_close: NaiveDateTime,
    /// Ascending by `week`.
    pub weeks: Vec<WeekWindow>,
}

impl Schedule {
    /// Season 1 of the league.
    pub fn season_one() -> Self {
        Self {
            name: "Season 1".into(),
            qualifiers_open: at(2026, 1, 18, 0, 0, 0),
            qualifiers_close: at(2026, 1, 24, 23, 59, 59),
            weeks: vec![
                week(1, (2026, 1, 25), (2026, 2, 1), (2026, 2, 7)),
                week(2, (2026, 2, 8), (2026, 2, 15), (2026, 2, 21)),
                week(3, (2026, 2, 22), (2026, 3, 1), (2026, 3, 7)),
                week(4, (2026, 3, 8), (2026, 3, 15), (2026, 3, 21)),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Qualifiers { closes: NaiveDateTime },
    Prep { week: u32, comp_start: NaiveDateTime },
    Comp { week: u32, comp_end: NaiveDateTime },
    Ended { last_comp_end: NaiveDateTime },
    Upcoming { qualifiers_open: NaiveDateTime },
}

impl Phase {
    pub fn kind(&self) -> &'static str {
        match self {
            Phase::Qualifiers { .. } => "qualifiers",
            Phase::Prep { .. } => "prep",
            Phase::Comp { .. } => "comp",
            Phase::Ended { .. } => "ended",
            Phase::Upcoming { .. } => "upcoming",
        }
    }

    /// The schedule instant this phase is described against.
    pub fn boundary(&self) -> NaiveDateTime {
        match *self {
            Phase::Qualifiers { closes } => closes,
            Phase::Prep { comp_start, .. } => comp_start,
            Phase::Comp { comp_end, .. } => comp_end,
            Phase::Ended { last_comp_end } => last_comp_end,
            Phase::Upcoming { qualifiers_open } => qualifiers_open,
        }
    }

    pub fn label(&self, season: &str) -> String {
        match self {
            Phase::Qualifiers { .. } => "Qualifier Seeds Open".to_string(),
            Phase::Prep { week, .. } => format!("Prep Week {week}"),
            Phase::Comp { week, .. } => format!("Competition Week {week} - LIVE"),
            Phase::Ended { .. } => format!("{season} Complete"),
            Phase::Upcoming { .. } => "Season Starting Soon".to_string(),
        }
    }

    pub fn description(&self) -> String {
        let date = short_date(self.boundary());
        match self {
            Phase::Qualifiers { .. } => format!("Play qualifier seeds until {date}"),
            Phase::Prep { .. } => format!("Competition starts {date}"),
            Phase::Comp { .. } => format!("Ends {date}"),
            Phase::Ended { .. } => "Thanks for participating!".to_string(),
            Phase::Upcoming { .. } => format!("Qualifiers open {date}"),
        }
    }
}

/// Which phase of `schedule` contains `now`. First match wins: qualifier
/// window, then each week's prep and competition windows in order, then
/// "ended" past the final week, otherwise "upcoming".
pub fn current_phase(now: NaiveDateTime, schedule: &Schedule) -> Phase {
    if now >= schedule.qualifiers_open && now <= schedule.qualifiers_close {
        return Phase::Qualifiers {
            closes: schedule.qualifiers_close,
        };
    }

    for window in &schedule.weeks {
        if now >= window.prep_start && now < window.comp_start {
            return Phase::Prep {
                week: window.week,
                comp_start: window.comp_start,
            };
        }
        if now >= window.comp_start && now <= window.comp_end {
            return Phase::Comp {
                week: window.week,
                comp_end: window.comp_end,
            };
        }
    }

    if let Some(last) = schedule.weeks.last()
        && now > last.comp_end
    {
        return Phase::Ended {
            last_comp_end: last.comp_end,
        };
    }

    Phase::Upcoming {
        qualifiers_open: schedule.qualifiers_open,
    }
}

/// `m/d/yyyy`, no zero padding.
pub fn short_date(dt: NaiveDateTime) -> String {
    dt.format("%-m/%-d/%Y").to_string()
}

fn at(y: i32, m: u32, d: u32, hh: u32, mm: u32, ss: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(hh, mm, ss))
        .unwrap_or_default()
}

fn week(
    week: u32,
    prep: (i32, u32, u32),
    comp: (i32, u32, u32),
    end: (i32, u32, u32),
) -> WeekWindow {
    WeekWindow {
        week,
        prep_start: at(prep.0, prep.1, prep.2, 0, 0, 0),
        comp_start: at(comp.0, comp.1, comp.2, 0, 0, 0),
        comp_end: at(end.0, end.1, end.2, 23, 59, 59),
    }
}
