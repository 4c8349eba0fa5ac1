// Utility helpers for parsing, statistics and number formatting.
//
// Statistics here work over `Option<f64>` samples: `None` cells are skipped,
// and a statistic over zero valid samples is `None` rather than zero.
use chrono::NaiveDateTime;
use num_format::{Locale, ToFormattedString};

/// Parse a CSV cell into `f64`.
///
/// - Trims whitespace and strips thousands separators.
/// - Accepts scientific notation (`5e2`).
/// - Returns `None` for blank or unparsable cells and for non-finite values
///   such as `nan` or `inf`.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(",", "");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const TIMESTAMP_FORMATS: [&str; 6] = [
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Join a date cell and a time cell and parse the result.
pub fn parse_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let joined = format!("{} {}", date.trim(), time.trim());
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&joined, fmt).ok())
}

/// Arithmetic mean of the defined samples.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

pub fn max<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values.into_iter().flatten().reduce(f64::max)
}

/// Sample standard deviation (n - 1 denominator). Needs two samples.
pub fn sample_std<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let v: Vec<f64> = values.into_iter().flatten().collect();
    if v.len() < 2 {
        return None;
    }
    let m = v.iter().sum::<f64>() / v.len() as f64;
    let var = v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (v.len() - 1) as f64;
    Some(var.sqrt())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.50`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Like `format_number`, but renders an undefined value as `n/a`.
pub fn format_optional(n: Option<f64>, decimals: usize) -> String {
    match n {
        Some(v) => format_number(v, decimals),
        None => "n/a".to_string(),
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
