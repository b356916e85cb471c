//! Lazy download planning.
//!
//! A request for `(granularity, [from, to))` maps to a sequence of remote
//! files: hourly tick files, or daily / monthly / yearly candle files. The
//! remote only publishes an aggregate file once its covering period has
//! closed, so a plan whose last unit covers the wall clock "now" descends
//! one file level for that remainder instead (year file -> month of hour
//! bars -> day of minute bars). [`Plan`] iterates units lazily; enormous
//! ranges never materialize in memory.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};

use crate::Granularity;

/// A single download unit produced by the planner.
///
/// The fetch granularity of a unit may be finer than the requested
/// granularity when the current-period fallback applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchUnit {
    /// One hour of ticks.
    TickHour {
        /// Start of the covered hour (UTC).
        hour: DateTime<Utc>,
    },
    /// One day of 1-minute bars.
    MinuteBars {
        /// The covered day (UTC).
        day: NaiveDate,
    },
    /// One month of 1-hour bars.
    HourBars {
        /// First day of the covered month.
        month: NaiveDate,
    },
    /// One year of daily bars.
    DayBars {
        /// The covered year.
        year: i32,
    },
}

impl FetchUnit {
    /// Start of the period this unit covers.
    ///
    /// This is also the timebase the decoder measures record deltas from.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        match *self {
            Self::TickHour { hour } => hour,
            Self::MinuteBars { day } => midnight(day),
            Self::HourBars { month } => midnight(month),
            Self::DayBars { year } => midnight(NaiveDate::from_ymd_opt(year, 1, 1).unwrap()),
        }
    }

    /// End of the period this unit covers (exclusive).
    #[must_use]
    pub fn end(&self) -> DateTime<Utc> {
        match *self {
            Self::TickHour { hour } => hour + chrono::TimeDelta::hours(1),
            Self::MinuteBars { day } => midnight(day.succ_opt().unwrap()),
            Self::HourBars { month } => midnight(next_month(month)),
            Self::DayBars { year } => midnight(NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()),
        }
    }

    /// Period of the bars contained in this unit, or `None` for ticks.
    #[must_use]
    pub fn bar_period(&self) -> Option<chrono::TimeDelta> {
        match self {
            Self::TickHour { .. } => None,
            Self::MinuteBars { .. } => Some(chrono::TimeDelta::minutes(1)),
            Self::HourBars { .. } => Some(chrono::TimeDelta::hours(1)),
            Self::DayBars { .. } => Some(chrono::TimeDelta::days(1)),
        }
    }
}

impl std::fmt::Display for FetchUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::TickHour { hour } => write!(f, "ticks {}", hour.format("%Y-%m-%d %Hh")),
            Self::MinuteBars { day } => write!(f, "minute bars {day}"),
            Self::HourBars { month } => write!(f, "hour bars {}", month.format("%Y-%m")),
            Self::DayBars { year } => write!(f, "day bars {year}"),
        }
    }
}

/// File level the planner is currently emitting at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    TickHour,
    MinuteDay,
    HourMonth,
    DayYear,
}

impl Level {
    const fn for_granularity(granularity: Granularity) -> Self {
        match granularity {
            Granularity::Ticks => Self::TickHour,
            Granularity::M1 => Self::MinuteDay,
            Granularity::H1 => Self::HourMonth,
            Granularity::D1 => Self::DayYear,
        }
    }

    /// The next level down for the current-period fallback.
    ///
    /// Minute-bar day files are the finest bar source; ticks are never
    /// substituted for bars.
    const fn finer(self) -> Option<Self> {
        match self {
            Self::DayYear => Some(Self::HourMonth),
            Self::HourMonth => Some(Self::MinuteDay),
            Self::MinuteDay | Self::TickHour => None,
        }
    }

    /// Aligns an instant down to the start of its covering period.
    fn align_down(self, instant: DateTime<Utc>) -> DateTime<Utc> {
        let date = instant.date_naive();
        match self {
            Self::TickHour => Utc
                .with_ymd_and_hms(date.year(), date.month(), date.day(), instant.hour(), 0, 0)
                .unwrap(),
            Self::MinuteDay => midnight(date),
            Self::HourMonth => midnight(date.with_day(1).unwrap()),
            Self::DayYear => midnight(NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap()),
        }
    }

    /// End of the period starting at the (aligned) cursor.
    fn period_end(self, cursor: DateTime<Utc>) -> DateTime<Utc> {
        self.unit_at(cursor).end()
    }

    /// The unit covering the period starting at the (aligned) cursor.
    fn unit_at(self, cursor: DateTime<Utc>) -> FetchUnit {
        match self {
            Self::TickHour => FetchUnit::TickHour { hour: cursor },
            Self::MinuteDay => FetchUnit::MinuteBars {
                day: cursor.date_naive(),
            },
            Self::HourMonth => FetchUnit::HourBars {
                month: cursor.date_naive(),
            },
            Self::DayYear => FetchUnit::DayBars {
                year: cursor.year(),
            },
        }
    }
}

/// Lazy iterator over the download units covering `[from, to)`.
///
/// `now` pins the current-period fallback to an explicit wall clock so
/// planning is deterministic; callers pass `Utc::now()`.
#[derive(Debug, Clone)]
pub struct Plan {
    level: Level,
    cursor: DateTime<Utc>,
    to: DateTime<Utc>,
    now: DateTime<Utc>,
}

impl Plan {
    /// Plans the downloads for `granularity` over `[from, to)`.
    ///
    /// An empty range (`from >= to`) yields an empty plan.
    #[must_use]
    pub fn new(
        granularity: Granularity,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let level = Level::for_granularity(granularity);
        // Aligning `from` down must not resurrect an empty range.
        let cursor = if from < to { level.align_down(from) } else { to };
        Self {
            level,
            cursor,
            to,
            now,
        }
    }
}

impl Iterator for Plan {
    type Item = FetchUnit;

    fn next(&mut self) -> Option<FetchUnit> {
        loop {
            if self.cursor >= self.to {
                return None;
            }
            let end = self.level.period_end(self.cursor);
            // The last unit of a bar plan whose period is still in progress
            // has no aggregate file yet; replan the remainder one level
            // finer. Cascades until the minute-day level.
            if self.cursor <= self.now && self.now < end && end >= self.to {
                if let Some(finer) = self.level.finer() {
                    self.level = finer;
                    continue;
                }
            }
            let unit = self.level.unit_at(self.cursor);
            self.cursor = end;
            return Some(unit);
        }
    }
}

/// Lifts a bare date to UTC midnight.
fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
}

/// First day of the month after the one containing `month`.
fn next_month(month: NaiveDate) -> NaiveDate {
    let (year, m) = if month.month() == 12 {
        (month.year() + 1, 1)
    } else {
        (month.year(), month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, m, 1).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    // A fixed wall clock far from every fully-past fixture range.
    fn past_now() -> DateTime<Utc> {
        utc(2025, 8, 15, 12)
    }

    #[test]
    fn test_empty_range() {
        let plan = Plan::new(Granularity::Ticks, utc(2019, 2, 4, 0), utc(2019, 2, 4, 0), past_now());
        assert_eq!(plan.count(), 0);

        let plan = Plan::new(Granularity::D1, utc(2020, 1, 1, 0), utc(2019, 1, 1, 0), past_now());
        assert_eq!(plan.count(), 0);

        // An instant strictly inside a period must not round down into a
        // non-empty plan.
        let instant = Utc.with_ymd_and_hms(2019, 2, 4, 0, 30, 0).unwrap();
        let plan = Plan::new(Granularity::Ticks, instant, instant, past_now());
        assert_eq!(plan.count(), 0);
    }

    #[test]
    fn test_ticks_one_unit_per_hour() {
        let plan = Plan::new(Granularity::Ticks, utc(2019, 2, 4, 0), utc(2019, 2, 4, 5), past_now());
        let units: Vec<_> = plan.collect();

        assert_eq!(units.len(), 5);
        assert_eq!(units[0], FetchUnit::TickHour { hour: utc(2019, 2, 4, 0) });
        assert_eq!(units[4], FetchUnit::TickHour { hour: utc(2019, 2, 4, 4) });
    }

    #[test]
    fn test_ticks_aligns_from_down_to_hour() {
        let from = Utc.with_ymd_and_hms(2019, 2, 4, 10, 30, 0).unwrap();
        let units: Vec<_> =
            Plan::new(Granularity::Ticks, from, utc(2019, 2, 4, 12), past_now()).collect();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0], FetchUnit::TickHour { hour: utc(2019, 2, 4, 10) });
    }

    #[test]
    fn test_minute_one_unit_per_day() {
        let units: Vec<_> =
            Plan::new(Granularity::M1, utc(2019, 1, 4, 0), utc(2019, 1, 5, 0), past_now()).collect();

        assert_eq!(
            units,
            vec![FetchUnit::MinuteBars { day: NaiveDate::from_ymd_opt(2019, 1, 4).unwrap() }]
        );
    }

    #[test]
    fn test_hour_one_unit_per_month() {
        let units: Vec<_> =
            Plan::new(Granularity::H1, utc(2019, 1, 1, 0), utc(2019, 1, 31, 0), past_now())
                .collect();

        assert_eq!(
            units,
            vec![FetchUnit::HourBars { month: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap() }]
        );
    }

    #[test]
    fn test_day_one_unit_per_year() {
        let units: Vec<_> =
            Plan::new(Granularity::D1, utc(2019, 1, 1, 0), utc(2019, 12, 31, 0), past_now())
                .collect();

        assert_eq!(units, vec![FetchUnit::DayBars { year: 2019 }]);
    }

    #[test]
    fn test_day_spanning_years() {
        let units: Vec<_> =
            Plan::new(Granularity::D1, utc(2017, 6, 1, 0), utc(2019, 6, 1, 0), past_now())
                .collect();

        assert_eq!(
            units,
            vec![
                FetchUnit::DayBars { year: 2017 },
                FetchUnit::DayBars { year: 2018 },
                FetchUnit::DayBars { year: 2019 },
            ]
        );
    }

    #[test]
    fn test_day_current_year_falls_back_to_hour_months() {
        // Request ends before the in-progress month: every emitted unit is
        // a complete month of hour bars, no year file.
        let now = past_now(); // 2025-08-15
        let units: Vec<_> =
            Plan::new(Granularity::D1, utc(2025, 1, 1, 0), utc(2025, 7, 1, 0), now).collect();

        assert_eq!(units.len(), 6);
        for (i, unit) in units.iter().enumerate() {
            assert_eq!(
                *unit,
                FetchUnit::HourBars {
                    month: NaiveDate::from_ymd_opt(2025, 1 + i as u32, 1).unwrap()
                }
            );
        }
    }

    #[test]
    fn test_day_fallback_cascades_to_minute_days() {
        // Range reaches into the current month: the cascade ends at day
        // files of minute bars, including the in-progress day.
        let now = past_now(); // 2025-08-15
        let units: Vec<_> =
            Plan::new(Granularity::D1, utc(2025, 1, 1, 0), utc(2025, 8, 16, 0), now).collect();

        // 7 complete months as hour bars, then 15 days of minute bars.
        assert_eq!(units.len(), 7 + 15);
        assert!(matches!(units[6], FetchUnit::HourBars { .. }));
        assert_eq!(
            units[7],
            FetchUnit::MinuteBars { day: NaiveDate::from_ymd_opt(2025, 8, 1).unwrap() }
        );
        assert_eq!(
            units[21],
            FetchUnit::MinuteBars { day: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap() }
        );
    }

    #[test]
    fn test_minute_current_day_is_emitted_anyway() {
        // Minute-day files are the finest bar source; the in-progress day
        // is requested as-is and the remote simply has less (or no) data.
        let now = past_now(); // 2025-08-15
        let units: Vec<_> =
            Plan::new(Granularity::M1, utc(2025, 8, 15, 0), utc(2025, 8, 16, 0), now).collect();

        assert_eq!(
            units,
            vec![FetchUnit::MinuteBars { day: NaiveDate::from_ymd_opt(2025, 8, 15).unwrap() }]
        );
    }

    #[test]
    fn test_fallback_only_applies_to_last_unit() {
        // The unit containing `now` is not last: later (future, empty)
        // periods keep the plan at the requested level.
        let now = past_now(); // 2025-08-15
        let units: Vec<_> =
            Plan::new(Granularity::D1, utc(2025, 1, 1, 0), utc(2027, 1, 1, 0), now).collect();

        assert_eq!(
            units,
            vec![FetchUnit::DayBars { year: 2025 }, FetchUnit::DayBars { year: 2026 }]
        );
    }

    #[test]
    fn test_ticks_never_fall_back() {
        let now = past_now();
        let units: Vec<_> = Plan::new(
            Granularity::Ticks,
            utc(2025, 8, 15, 11),
            utc(2025, 8, 15, 13),
            now,
        )
        .collect();

        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|u| matches!(u, FetchUnit::TickHour { .. })));
    }

    #[test]
    fn test_unit_start_and_end() {
        let unit = FetchUnit::HourBars { month: NaiveDate::from_ymd_opt(2019, 12, 1).unwrap() };
        assert_eq!(unit.start(), utc(2019, 12, 1, 0));
        assert_eq!(unit.end(), utc(2020, 1, 1, 0));
        assert_eq!(unit.bar_period(), Some(chrono::TimeDelta::hours(1)));

        let unit = FetchUnit::DayBars { year: 2019 };
        assert_eq!(unit.start(), utc(2019, 1, 1, 0));
        assert_eq!(unit.end(), utc(2020, 1, 1, 0));
        assert_eq!(unit.bar_period(), Some(chrono::TimeDelta::days(1)));

        let unit = FetchUnit::TickHour { hour: utc(2019, 2, 4, 9) };
        assert_eq!(unit.end() - unit.start(), chrono::TimeDelta::hours(1));
        assert_eq!(unit.bar_period(), None);
    }
}
