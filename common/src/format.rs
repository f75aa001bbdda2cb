use serde::{Deserialize, Serialize};

use crate::stats::to_mops;

/// How plotted throughput values are rounded
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// Millions of ops/s rounded to three decimals
    #[default]
    Decimal,
    /// Truncate to whole thousands of ops/s, then print three significant
    /// digits. Byte-compatible with plots produced by the old scripts.
    Truncate,
}

impl Rounding {
    pub fn render_mops(self, ops_per_sec: f64) -> String {
        match self {
            Rounding::Decimal => format_decimal(to_mops(ops_per_sec), 3),
            Rounding::Truncate => format_general((ops_per_sec / 1000.0).trunc() / 1000.0, 3),
        }
    }
}

/// Text of one table cell: mean throughput plus speedup over one thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFormat {
    /// `0.500 (1.000)`
    Mops,
    /// `500k (1.00)`
    KiloOps,
}

impl CellFormat {
    pub fn render(self, ops_per_sec: f64, speedup: f64) -> String {
        match self {
            CellFormat::Mops => format!("{:.3} ({:.3})", to_mops(ops_per_sec), speedup),
            CellFormat::KiloOps => {
                format!("{}k ({:.2})", (ops_per_sec / 1000.0).trunc() as i64, speedup)
            }
        }
    }
}

/// `precision` decimals with trailing zeros removed, keeping one fractional digit
pub fn format_decimal(value: f64, precision: usize) -> String {
    let fixed = format!("{value:.precision$}");
    keep_fraction(&fixed)
}

/// General notation with `precision` significant digits: fixed-point with at
/// least one fractional digit while the decimal exponent is in
/// `-4..precision - 1`, `1.23e+02` style otherwise.
pub fn format_general(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    if value == 0.0 {
        return "0.0".to_owned();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, value);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((&sci, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if (-4..precision as i32 - 1).contains(&exp) {
        let decimals = (precision as i32 - 1 - exp) as usize;
        keep_fraction(&format!("{value:.decimals$}"))
    } else {
        let mantissa = if mantissa.contains('.') {
            mantissa.trim_end_matches('0').trim_end_matches('.')
        } else {
            mantissa
        };
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    }
}

/// Shortest representation that reads back to the same value, in positional
/// notation with a fractional part (`1.0`, `0.5`, `0.0000001`)
pub fn format_sample(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }
    keep_fraction(&value.to_string())
}

fn keep_fraction(fixed: &str) -> String {
    if !fixed.contains('.') {
        return format!("{fixed}.0");
    }
    let trimmed = fixed.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_owned()
    }
}
