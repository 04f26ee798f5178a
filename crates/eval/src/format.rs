//! Value formatter.
//!
//! Converts a raw field value plus its declared output type into the
//! pt-BR display string. Pure and total: every branch has a defined
//! fallback and nothing here can fail.

use rust_decimal::{Decimal, RoundingStrategy};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use folio_core::OutputType;

use crate::types::RawValue;

const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Format a raw value for display.
///
/// `None` renders as the empty string for every output type. Non-numeric
/// input to a numeric output type renders as that type's zero display
/// (`"R$ 0,00"`, `"0%"`, `"0"`) rather than an error.
pub fn format_field_value(raw: Option<&RawValue>, output_type: OutputType) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    match output_type {
        OutputType::Currency => match raw.as_number() {
            Some(d) => format!("R$ {}", grouped(d, Some(2))),
            None => "R$ 0,00".to_string(),
        },
        OutputType::Percent => match raw.as_number() {
            // Raw literal passthrough: no grouping, no forced decimals
            Some(d) => format!("{}%", d.normalize()),
            None => "0%".to_string(),
        },
        OutputType::Number => match raw.as_number() {
            Some(d) => grouped(d, None),
            None => "0".to_string(),
        },
        OutputType::Date => match raw {
            RawValue::Text(s) => match parse_iso_date(s) {
                Some(d) => format!("{:02}/{:02}/{}", d.day(), u8::from(d.month()), d.year()),
                None => s.clone(),
            },
            RawValue::Number(_) => raw.display(),
        },
        OutputType::Text => raw.display(),
    }
}

/// Accepts `YYYY-MM-DD` or any ISO datetime starting with it.
fn parse_iso_date(s: &str) -> Option<Date> {
    let head = s.get(..10)?;
    Date::parse(head, ISO_DATE).ok()
}

/// Render a decimal with pt-BR separators: `.` for thousands grouping,
/// `,` for the decimal mark. `forced_scale` pins the fraction width
/// (currency); otherwise trailing zeroes are dropped.
fn grouped(d: Decimal, forced_scale: Option<u32>) -> String {
    let plain = match forced_scale {
        Some(scale) => {
            let rounded = d.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
            format!("{:.*}", scale as usize, rounded)
        }
        None => d.normalize().to_string(),
    };

    let (sign, body) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain.as_str()),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };

    let mut out = String::with_capacity(plain.len() + 4);
    out.push_str(sign);
    let digits: Vec<char> = int_part.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(*c);
    }
    if let Some(f) = frac_part {
        out.push(',');
        out.push_str(f);
    }
    out
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
