use chrono::{
    DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone,
    Timelike, Weekday,
};

/// Where the calendar day of the event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayAnchor {
    /// Computed from today ("tomorrow", "friday", "in 3 days"). Keeps the
    /// current time of day when no time is mentioned.
    Relative(NaiveDate),
    /// Written out by the user ("June 5", "2024-06-05"). Defaults to midnight.
    Absolute(NaiveDate),
}

#[derive(Debug, Clone, Copy)]
struct ClockTime {
    time: NaiveTime,
    has_meridiem: bool,
}

#[derive(Debug, Default)]
struct Extraction {
    day: Option<DayAnchor>,
    time: Option<ClockTime>,
    day_part: Option<NaiveTime>,
    offset: Option<Duration>,
}

/// Finds a date/time expression embedded in free text and resolves it
/// against `now`, in `now`'s timezone. Returns `None` when the text carries
/// no recognizable expression.
pub fn extract_datetime<Tz: TimeZone>(text: &str, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let now = now.with_nanosecond(0).unwrap_or_else(|| now.clone());
    let tokens = tokenize(text);
    let extraction = scan(&tokens, now.date_naive());
    resolve(extraction, &now)
}

fn tokenize(text: &str) -> Vec<String> {
    let lower = text
        .to_lowercase()
        .replace("a.m.", "am")
        .replace("p.m.", "pm");
    lower
        .split(|c: char| {
            c.is_whitespace() || matches!(c, ',' | ';' | '!' | '?' | '(' | ')' | '"')
        })
        .map(|t| t.trim_matches(|c: char| c == '.' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn scan(tokens: &[String], today: NaiveDate) -> Extraction {
    let mut ex = Extraction::default();
    let token_at = |idx: usize| tokens.get(idx).map(String::as_str);
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let next = token_at(i + 1);
        let mut consumed = 1;
        match token {
            "today" => set_day(&mut ex, DayAnchor::Relative(today)),
            "tonight" => {
                set_day(&mut ex, DayAnchor::Relative(today));
                ex.day_part.get_or_insert(hm(20, 0));
            }
            "tomorrow" => {
                if let Some(anchor) = relative_days(today, 1) {
                    set_day(&mut ex, anchor);
                }
            }
            "yesterday" => {
                if let Some(date) = today.checked_sub_days(Days::new(1)) {
                    set_day(&mut ex, DayAnchor::Relative(date));
                }
            }
            "day" if next == Some("after") && token_at(i + 2) == Some("tomorrow") => {
                if let Some(anchor) = relative_days(today, 2) {
                    set_day(&mut ex, anchor);
                }
                consumed = 3;
            }
            "noon" | "midday" => set_time(&mut ex, hm(12, 0), true),
            "midnight" => set_time(&mut ex, hm(0, 0), true),
            "morning" => {
                ex.day_part.get_or_insert(hm(9, 0));
            }
            "afternoon" => {
                ex.day_part.get_or_insert(hm(15, 0));
            }
            "evening" => {
                ex.day_part.get_or_insert(hm(18, 0));
            }
            "in" => {
                if let Some(span) = parse_span(next, token_at(i + 2), today) {
                    match span {
                        Span::Offset(offset) => {
                            ex.offset.get_or_insert(offset);
                        }
                        Span::Day(anchor) => set_day(&mut ex, anchor),
                    }
                    consumed = 3;
                }
            }
            "next" | "this" => {
                if let Some(weekday) = next.and_then(parse_weekday) {
                    if let Some(anchor) = upcoming_weekday(today, weekday, token == "next") {
                        set_day(&mut ex, anchor);
                    }
                    consumed = 2;
                } else if token == "next" && next == Some("week") {
                    if let Some(anchor) = relative_days(today, 7) {
                        set_day(&mut ex, anchor);
                    }
                    consumed = 2;
                }
            }
            _ => {
                consumed = scan_token(&mut ex, tokens, i, today);
            }
        }
        i += consumed.max(1);
    }
    ex
}

/// Handles tokens whose meaning depends on their shape rather than a keyword.
fn scan_token(ex: &mut Extraction, tokens: &[String], i: usize, today: NaiveDate) -> usize {
    let token = tokens[i].as_str();
    let next = tokens.get(i + 1).map(String::as_str);
    let after_next = tokens.get(i + 2).map(String::as_str);

    if let Some(weekday) = parse_weekday(token) {
        if let Some(anchor) = upcoming_weekday(today, weekday, false) {
            set_day(ex, anchor);
        }
        return 1;
    }

    // "June 5", "June 5th 2024"
    if let Some(month) = parse_month(token) {
        if let Some(day) = next.and_then(parse_day) {
            let year = after_next.and_then(parse_year);
            if let Some(date) = month_day(today, month, day, year) {
                set_day(ex, DayAnchor::Absolute(date));
                return if year.is_some() { 3 } else { 2 };
            }
        }
        return 1;
    }

    // "5 June", "5th of June 2024"
    if let Some(day) = parse_day(token) {
        let (month_idx, month) = match (next.and_then(parse_month), next, after_next) {
            (Some(month), _, _) => (i + 1, Some(month)),
            (None, Some("of"), Some(candidate)) => (i + 2, parse_month(candidate)),
            _ => (i, None),
        };
        if let Some(month) = month {
            let year = tokens
                .get(month_idx + 1)
                .map(String::as_str)
                .and_then(parse_year);
            if let Some(date) = month_day(today, month, day, year) {
                set_day(ex, DayAnchor::Absolute(date));
                let consumed = month_idx - i + 1;
                return if year.is_some() { consumed + 1 } else { consumed };
            }
        }
    }

    if let Some((date, time)) = parse_iso_datetime(token) {
        set_day(ex, DayAnchor::Absolute(date));
        if let Some(time) = time {
            set_time(ex, time, true);
        }
        return 1;
    }

    if let Some(date) = parse_slash_date(token, today) {
        set_day(ex, DayAnchor::Absolute(date));
        return 1;
    }

    let after_at = i > 0 && tokens[i - 1] == "at";
    if let Some((clock, consumed)) = parse_time(token, next, after_at) {
        set_time(ex, clock.time, clock.has_meridiem);
        return consumed;
    }

    1
}

fn set_day(ex: &mut Extraction, anchor: DayAnchor) {
    ex.day.get_or_insert(anchor);
}

fn set_time(ex: &mut Extraction, time: NaiveTime, has_meridiem: bool) {
    ex.time.get_or_insert(ClockTime { time, has_meridiem });
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}

/// `None` when the day falls outside the representable calendar.
fn relative_days(today: NaiveDate, days: u64) -> Option<DayAnchor> {
    today.checked_add_days(Days::new(days)).map(DayAnchor::Relative)
}

/// `next` skips the current week: "next friday" is at least 7 days out,
/// while "friday" / "this friday" is the next occurrence on or after today.
fn upcoming_weekday(today: NaiveDate, weekday: Weekday, next: bool) -> Option<DayAnchor> {
    let current = today.weekday().num_days_from_monday();
    let target = weekday.num_days_from_monday();
    let mut ahead = (target + 7 - current) % 7;
    if next {
        ahead += 7;
    }
    relative_days(today, u64::from(ahead))
}

/// Dates without a year roll forward to the next occurrence on or after today.
fn month_day(today: NaiveDate, month: u32, day: u32, year: Option<i32>) -> Option<NaiveDate> {
    if let Some(year) = year {
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

enum Span {
    Offset(Duration),
    Day(DayAnchor),
}

fn parse_span(amount: Option<&str>, unit: Option<&str>, today: NaiveDate) -> Option<Span> {
    let amount = parse_amount(amount?)?;
    let unit = unit?;
    let unit = unit.strip_suffix('s').unwrap_or(unit);
    match unit {
        "min" | "minute" => Some(Span::Offset(Duration::minutes(i64::from(amount)))),
        "hr" | "hour" => Some(Span::Offset(Duration::hours(i64::from(amount)))),
        "day" => relative_days(today, u64::from(amount)).map(Span::Day),
        "week" => relative_days(today, u64::from(amount) * 7).map(Span::Day),
        "month" => today
            .checked_add_months(Months::new(amount))
            .map(|date| Span::Day(DayAnchor::Relative(date))),
        _ => None,
    }
}

fn parse_amount(token: &str) -> Option<u32> {
    if let Ok(value) = token.parse::<u32>() {
        return Some(value);
    }
    let value = match token {
        "a" | "an" | "one" => 1,
        "two" => 2,
        "three" => 3,
        "four" => 4,
        "five" => 5,
        "six" => 6,
        "seven" => 7,
        "eight" => 8,
        "nine" => 9,
        "ten" => 10,
        "eleven" => 11,
        "twelve" => 12,
        _ => return None,
    };
    Some(value)
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    let weekday = match token {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn parse_month(token: &str) -> Option<u32> {
    let month = match token {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Day of month, optionally with an ordinal suffix ("2nd", "21st").
fn parse_day(token: &str) -> Option<u32> {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| token.strip_suffix(suffix))
        .unwrap_or(token);
    if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let day = digits.parse::<u32>().ok()?;
    (1..=31).contains(&day).then_some(day)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 {
        return None;
    }
    let year = token.parse::<i32>().ok()?;
    (1900..=2200).contains(&year).then_some(year)
}

/// `2024-06-02`, optionally followed by `t16:00` or `t16:00:00`.
fn parse_iso_datetime(token: &str) -> Option<(NaiveDate, Option<NaiveTime>)> {
    let (date_part, time_part) = match token.split_once('t') {
        Some((date, time)) => (date, Some(time)),
        None => (token, None),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    let time = match time_part {
        Some(raw) => Some(
            NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .ok()?,
        ),
        None => None,
    };
    Some((date, time))
}

/// US-style `M/D` or `M/D/YYYY` (two-digit years are taken as 20YY).
fn parse_slash_date(token: &str, today: NaiveDate) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split('/').collect();
    if !(2..=3).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let month = parts[0].parse::<u32>().ok()?;
    let day = parts[1].parse::<u32>().ok()?;
    let year = match parts.get(2) {
        Some(raw) if raw.len() == 2 => Some(2000 + raw.parse::<i32>().ok()?),
        Some(raw) => Some(raw.parse::<i32>().ok()?),
        None => None,
    };
    month_day(today, month, day, year)
}

/// Returns the time and how many tokens it spans ("4 pm" is two).
fn parse_time(token: &str, next: Option<&str>, after_at: bool) -> Option<(ClockTime, usize)> {
    let (core, meridiem, consumed) = if let Some(core) = token.strip_suffix("am") {
        (core, Some(false), 1)
    } else if let Some(core) = token.strip_suffix("pm") {
        (core, Some(true), 1)
    } else {
        match next {
            Some("am") => (token, Some(false), 2),
            Some("pm") => (token, Some(true), 2),
            _ => (token, None, 1),
        }
    };
    if core.is_empty() {
        return None;
    }

    let (hour, minute, second) = split_clock(core)?;
    let has_colon = core.contains(':');
    let hour = match meridiem {
        Some(pm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            if pm { hour % 12 + 12 } else { hour % 12 }
        }
        None if has_colon || after_at => hour,
        None => return None,
    };
    let time = NaiveTime::from_hms_opt(hour, minute, second)?;
    Some((
        ClockTime {
            time,
            has_meridiem: meridiem.is_some(),
        },
        consumed,
    ))
}

fn split_clock(core: &str) -> Option<(u32, u32, u32)> {
    let mut parts = core.split(':');
    let hour = parse_clock_part(parts.next()?, 2)?;
    let minute = match parts.next() {
        Some(raw) => parse_clock_part(raw, 2).filter(|_| raw.len() == 2)?,
        None => 0,
    };
    let second = match parts.next() {
        Some(raw) => parse_clock_part(raw, 2).filter(|_| raw.len() == 2)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((hour, minute, second))
}

fn parse_clock_part(raw: &str, max_len: usize) -> Option<u32> {
    if raw.is_empty() || raw.len() > max_len || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok()
}

fn resolve<Tz: TimeZone>(ex: Extraction, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    if let Some(offset) = ex.offset {
        return now.clone().checked_add_signed(offset);
    }

    let today = now.date_naive();
    let (date, fallback) = match ex.day {
        Some(DayAnchor::Relative(date)) => (date, now.time()),
        Some(DayAnchor::Absolute(date)) => (date, NaiveTime::MIN),
        None if ex.time.is_some() => (today, NaiveTime::MIN),
        None => return None,
    };

    let time = match (ex.time, ex.day_part) {
        (Some(clock), Some(part)) => afternoon_shift(clock, part),
        (Some(clock), None) => clock.time,
        (None, Some(part)) => part,
        (None, None) => fallback,
    };

    localize(&now.timezone(), date.and_time(time))
}

/// "at 7 tonight" means 19:00.
fn afternoon_shift(clock: ClockTime, day_part: NaiveTime) -> NaiveTime {
    if !clock.has_meridiem && clock.time.hour() < 12 && day_part.hour() >= 12 {
        clock.time + Duration::hours(12)
    } else {
        clock.time
    }
}

/// Ambiguous local times take the earlier instant; times that fall into a
/// DST gap move forward an hour.
fn localize<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
}
