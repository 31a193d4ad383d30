//! Weekly opening hours and the "open now" status line.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};

/// Opening interval in minutes since midnight, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub open: u32,
    pub close: u32,
}

const fn hm(h: u32, m: u32) -> u32 {
    h * 60 + m
}

const WEEKDAY: &[Interval] = &[
    Interval { open: hm(7, 0), close: hm(13, 0) },
    Interval { open: hm(16, 0), close: hm(22, 0) },
];
const SATURDAY: &[Interval] = &[Interval { open: hm(7, 0), close: hm(22, 0) }];
const SUNDAY: &[Interval] = &[Interval { open: hm(10, 0), close: hm(22, 0) }];

/// Store schedule, Monday first.
#[derive(Debug, Clone)]
pub struct WeeklyHours {
    days: [&'static [Interval]; 7],
}

impl Default for WeeklyHours {
    fn default() -> Self {
        Self {
            days: [WEEKDAY, WEEKDAY, WEEKDAY, WEEKDAY, WEEKDAY, SATURDAY, SUNDAY],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub is_open: bool,
    pub message: String,
}

impl WeeklyHours {
    pub fn intervals(&self, day: Weekday) -> &[Interval] {
        self.days[day.num_days_from_monday() as usize]
    }

    /// One display row per day: `("Monday", "07:00 - 13:00 | 16:00 - 22:00")`.
    pub fn rows(&self) -> Vec<(String, String)> {
        let mut day = Weekday::Mon;
        let mut out = Vec::with_capacity(7);
        for _ in 0..7 {
            let spans: Vec<String> = self
                .intervals(day)
                .iter()
                .map(|i| format!("{} - {}", clock_24(i.open), clock_24(i.close)))
                .collect();
            let time = if spans.is_empty() {
                "Closed".to_string()
            } else {
                spans.join(" | ")
            };
            out.push((day_name(day).to_string(), time));
            day = day.succ();
        }
        out
    }

    pub fn status_at(&self, now: NaiveDateTime) -> StoreStatus {
        let day = now.weekday();
        let minute = now.hour() * 60 + now.minute();

        if self
            .intervals(day)
            .iter()
            .any(|i| (i.open..=i.close).contains(&minute))
        {
            return StoreStatus {
                is_open: true,
                message: "Open now".into(),
            };
        }

        // Later today?
        if let Some(next) = self.intervals(day).iter().find(|i| i.open > minute) {
            return StoreStatus {
                is_open: false,
                message: format!("Opens at {}", clock_12(next.open)),
            };
        }

        // First opening on a following day.
        let mut next_day = day.succ();
        for _ in 0..7 {
            if let Some(first) = self.intervals(next_day).first() {
                return StoreStatus {
                    is_open: false,
                    message: format!("Opens {} at {}", day_name(next_day), clock_12(first.open)),
                };
            }
            next_day = next_day.succ();
        }

        StoreStatus {
            is_open: false,
            message: "Closed".into(),
        }
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn clock_24(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn clock_12(minutes: u32) -> String {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
        .map(|t| t.format("%-I:%M %p").to_string())
        .unwrap_or_else(|| clock_24(minutes))
}
