//! Time units and their truncation formulas

use super::datum;
use serde::{Deserialize, Serialize};

/// A single component of a date-time value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnitPart {
    Year,
    Quarter,
    Month,
    Day,
    Date,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
}

impl TimeUnitPart {
    fn as_str(&self) -> &'static str {
        match self {
            TimeUnitPart::Year => "year",
            TimeUnitPart::Quarter => "quarter",
            TimeUnitPart::Month => "month",
            TimeUnitPart::Day => "day",
            TimeUnitPart::Date => "date",
            TimeUnitPart::Hours => "hours",
            TimeUnitPart::Minutes => "minutes",
            TimeUnitPart::Seconds => "seconds",
            TimeUnitPart::Milliseconds => "milliseconds",
        }
    }
}

/// Time truncation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Year,
    Quarter,
    Month,
    Day,
    Date,
    Hours,
    Minutes,
    Seconds,
    Milliseconds,
    YearQuarter,
    YearQuarterMonth,
    YearMonth,
    YearMonthDate,
    YearMonthDateHours,
    YearMonthDateHoursMinutes,
    YearMonthDateHoursMinutesSeconds,
    QuarterMonth,
    MonthDate,
    HoursMinutes,
    HoursMinutesSeconds,
    MinutesSeconds,
    SecondsMilliseconds,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Year => "year",
            TimeUnit::Quarter => "quarter",
            TimeUnit::Month => "month",
            TimeUnit::Day => "day",
            TimeUnit::Date => "date",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
            TimeUnit::Milliseconds => "milliseconds",
            TimeUnit::YearQuarter => "yearquarter",
            TimeUnit::YearQuarterMonth => "yearquartermonth",
            TimeUnit::YearMonth => "yearmonth",
            TimeUnit::YearMonthDate => "yearmonthdate",
            TimeUnit::YearMonthDateHours => "yearmonthdatehours",
            TimeUnit::YearMonthDateHoursMinutes => "yearmonthdatehoursminutes",
            TimeUnit::YearMonthDateHoursMinutesSeconds => "yearmonthdatehoursminutesseconds",
            TimeUnit::QuarterMonth => "quartermonth",
            TimeUnit::MonthDate => "monthdate",
            TimeUnit::HoursMinutes => "hoursminutes",
            TimeUnit::HoursMinutesSeconds => "hoursminutesseconds",
            TimeUnit::MinutesSeconds => "minutesseconds",
            TimeUnit::SecondsMilliseconds => "secondsmilliseconds",
        }
    }

    /// Date-time components retained by this unit
    pub fn parts(&self) -> &'static [TimeUnitPart] {
        use TimeUnitPart::*;
        match self {
            TimeUnit::Year => &[Year],
            TimeUnit::Quarter => &[Quarter],
            TimeUnit::Month => &[Month],
            TimeUnit::Day => &[Day],
            TimeUnit::Date => &[Date],
            TimeUnit::Hours => &[Hours],
            TimeUnit::Minutes => &[Minutes],
            TimeUnit::Seconds => &[Seconds],
            TimeUnit::Milliseconds => &[Milliseconds],
            TimeUnit::YearQuarter => &[Year, Quarter],
            TimeUnit::YearQuarterMonth => &[Year, Quarter, Month],
            TimeUnit::YearMonth => &[Year, Month],
            TimeUnit::YearMonthDate => &[Year, Month, Date],
            TimeUnit::YearMonthDateHours => &[Year, Month, Date, Hours],
            TimeUnit::YearMonthDateHoursMinutes => &[Year, Month, Date, Hours, Minutes],
            TimeUnit::YearMonthDateHoursMinutesSeconds => {
                &[Year, Month, Date, Hours, Minutes, Seconds]
            }
            TimeUnit::QuarterMonth => &[Quarter, Month],
            TimeUnit::MonthDate => &[Month, Date],
            TimeUnit::HoursMinutes => &[Hours, Minutes],
            TimeUnit::HoursMinutesSeconds => &[Hours, Minutes, Seconds],
            TimeUnit::MinutesSeconds => &[Minutes, Seconds],
            TimeUnit::SecondsMilliseconds => &[Seconds, Milliseconds],
        }
    }

    pub fn contains(&self, part: TimeUnitPart) -> bool {
        self.parts().contains(&part)
    }

    /// Expression truncating `field` to this unit.
    ///
    /// Components not covered by the unit are pinned to January 1st 2012,
    /// midnight; a bare day-of-week maps onto the first week of 2012 (which
    /// starts on a Sunday).
    pub fn field_expr(&self, field: &str) -> String {
        let accessor = datum(field);
        let call = |part: TimeUnitPart| format!("{}({})", part.as_str(), accessor);
        let or_default = |part: TimeUnitPart, default: &str| {
            if self.contains(part) {
                call(part)
            } else {
                default.to_string()
            }
        };

        let year = or_default(TimeUnitPart::Year, "2012");
        let month = if self.contains(TimeUnitPart::Month) {
            call(TimeUnitPart::Month)
        } else if self.contains(TimeUnitPart::Quarter) {
            format!("({}-1)*3", call(TimeUnitPart::Quarter))
        } else {
            "0".to_string()
        };
        let date = if self.contains(TimeUnitPart::Date) {
            call(TimeUnitPart::Date)
        } else if self.contains(TimeUnitPart::Day) {
            format!("{}+1", call(TimeUnitPart::Day))
        } else {
            "1".to_string()
        };
        let hours = or_default(TimeUnitPart::Hours, "0");
        let minutes = or_default(TimeUnitPart::Minutes, "0");
        let seconds = or_default(TimeUnitPart::Seconds, "0");
        let milliseconds = or_default(TimeUnitPart::Milliseconds, "0");

        format!(
            "datetime({}, {}, {}, {}, {}, {}, {})",
            year, month, date, hours, minutes, seconds, milliseconds
        )
    }
}
