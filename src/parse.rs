use chrono::{Datelike, NaiveDate};

const CURRENCY_MARKS: &[char] = &[',', '"', '$', '£', '€', '₹', '¥'];

// Two-digit-year forms come first: `%Y` would accept "24" as year 24.
const NAMED_MONTH_FORMATS: &[&str] = &[
    "%d %B %y",
    "%d-%B-%y",
    "%d/%B/%y",
    "%d %B %Y",
    "%d-%B-%Y",
    "%d/%B/%Y",
    "%d %B, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%Y-%B-%d",
];

/// Parse a money cell. Unparseable text yields 0.0.
///
/// Thousands separators and currency symbols are dropped; a leading `-` or
/// an accounting-style `(...)` wrapper makes the value negative.
pub fn parse_amount(raw: &str) -> f64 {
    let s: String = raw.chars().filter(|c| !CURRENCY_MARKS.contains(c)).collect();
    let s = s.trim();
    let (negative, body) = if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        (true, inner.trim())
    } else if let Some(rest) = s.strip_prefix('-') {
        (true, rest.trim())
    } else {
        (false, s.strip_prefix('+').unwrap_or(s).trim())
    };
    match body.parse::<f64>() {
        Ok(v) if v.is_finite() => {
            if negative {
                -v.abs()
            } else {
                v.abs()
            }
        }
        _ => 0.0,
    }
}

/// A cell counts as numeric when it is a Dr/Cr marker or an unsigned decimal.
pub fn is_numeric_like(raw: &str) -> bool {
    let val = raw.replace(',', "");
    let val = val.trim().to_lowercase();
    if val == "dr" || val == "cr" {
        return true;
    }
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in val.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

/// Parse a statement date cell.
///
/// Numeric dates use `/`, `-` or `.` separators. A four-digit leading part
/// reads as year-month-day; otherwise `day_first` decides the reading of an
/// ambiguous pair, falling back to the other order when the preferred one
/// is not a valid date. Named months (`05 Jan 2024`, `Jan 5, 2024`) are
/// accepted in either case. A trailing time component is ignored.
pub fn parse_date(raw: &str, day_first: bool) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(date) = parse_numeric_date(s, day_first).or_else(|| parse_named_month(s)) {
        return Some(date);
    }
    let first = s.split_whitespace().next()?;
    if first.len() < s.len() {
        parse_numeric_date(first, day_first)
    } else {
        None
    }
}

fn parse_numeric_date(s: &str, day_first: bool) -> Option<NaiveDate> {
    let parts: Vec<&str> = s.split(['/', '-', '.']).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let nums: Vec<u32> = parts
        .iter()
        .map(|p| p.parse().ok())
        .collect::<Option<Vec<_>>>()?;

    if parts[0].len() == 4 {
        if parts[1].len() > 2 || parts[2].len() > 2 {
            return None;
        }
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }
    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let year = expand_year(nums[2], parts[2].len())?;
    let (a, b) = (nums[0], nums[1]);
    if day_first {
        NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
    } else {
        NaiveDate::from_ymd_opt(year, a, b).or_else(|| NaiveDate::from_ymd_opt(year, b, a))
    }
}

fn expand_year(year: u32, width: usize) -> Option<i32> {
    match width {
        4 => Some(year as i32),
        2 if year < 70 => Some(2000 + year as i32),
        2 => Some(1900 + year as i32),
        _ => None,
    }
}

fn parse_named_month(s: &str) -> Option<NaiveDate> {
    if !s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    NAMED_MONTH_FORMATS
        .iter()
        .filter_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .find(|d| d.year() >= 1900)
}

/// Spreadsheet serial day number to a calendar date.
#[cfg(any(feature = "xlsx", test))]
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}
