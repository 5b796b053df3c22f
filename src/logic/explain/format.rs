//! Value Formatting & Narrative Sentences
//!
//! Display rules per field:
//! - duration: seconds → "2m 5s"
//! - pdays: -1 → "Not Contacted", else "N days"
//! - day: "Day N"; balance: "€N"; previous: "N times"
//! - age display value: "N Years"
//! - categorical display value: raw category title-cased

use crate::logic::features::layout::{split_dummy, PDAYS_NOT_CONTACTED};
use crate::logic::features::raw::format_number;
use crate::logic::features::{RawInstance, RawValue};

/// Upper-case the first letter of every word, lower-case the rest.
///
/// A word starts after any non-alphabetic character, so
/// "blue-collar" → "Blue-Collar" and "admin." → "Admin.".
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

/// First character upper-case, the rest lower-case
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Domain formatting for a raw field value
pub fn format_value(field: &str, value: &RawValue) -> String {
    let number = match value.as_number() {
        Some(n) => n,
        None => return value.to_string(),
    };
    match field {
        "duration" => {
            let total = number.trunc() as i64;
            format!("{}m {}s", total.div_euclid(60), total.rem_euclid(60))
        }
        "pdays" if number == PDAYS_NOT_CONTACTED as f64 => "Not Contacted".to_string(),
        "pdays" => format!("{} days", format_number(number)),
        "day" => format!("Day {}", format_number(number)),
        "balance" => format!("€{}", format_number(number)),
        "previous" => format!("{} times", format_number(number)),
        _ => value.to_string(),
    }
}

/// Values shown for one column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayValue {
    /// Raw value backing the column
    pub raw: Option<RawValue>,
    /// Value as used inside the sentence
    pub formatted: String,
    /// Value as shown next to the label
    pub feature_value: String,
}

impl DisplayValue {
    /// Resolve the display values of a model column against the lead
    pub fn resolve(column: &str, raw: &RawInstance) -> Self {
        let column = column.to_lowercase();

        if let Some(value) = raw.get(&column) {
            let formatted = format_value(&column, value);
            let feature_value = if column == "age" {
                format!("{} Years", formatted)
            } else {
                formatted.clone()
            };
            return Self { raw: Some(value.clone()), formatted, feature_value };
        }

        if let Some((field, _)) = split_dummy(&column) {
            if let Some(value) = raw.get(field) {
                let formatted = value.to_string();
                let feature_value = title_case(&formatted);
                return Self { raw: Some(value.clone()), formatted, feature_value };
            }
        }

        Self::default()
    }

    fn is_not_contacted(&self) -> bool {
        self.raw.as_ref().and_then(RawValue::as_number) == Some(PDAYS_NOT_CONTACTED as f64)
    }
}

fn clean_context(context: &str) -> &str {
    context.trim().trim_end_matches('.')
}

/// Human sentence for one column.
///
/// Without context the sentence is just `"{label}: {value}."`.
pub fn narrative(column: &str, display: &DisplayValue, label: &str, context: &str) -> String {
    if context.is_empty() {
        return format!("{}: {}.", label, display.feature_value);
    }

    let column = column.to_lowercase();
    let ctx = clean_context(context);
    let formatted = &display.formatted;
    let has = |yes: bool| if yes { "has" } else { "does not have" };

    match column.as_str() {
        "duration" => return format!("This Lead has {} call duration. {}.", formatted, ctx),
        "age" => return format!("This Lead is {} years old. {}.", formatted, ctx),
        "balance" => return format!("This Lead has a balance of {}. {}.", formatted, ctx),
        "campaign" => return format!("This Lead has been contacted {} times. {}.", formatted, ctx),
        "pdays" if display.is_not_contacted() => {
            return format!("This Lead has not been contacted recently. {}.", ctx)
        }
        "pdays" => return format!("It has been {} since the last contact. {}.", formatted, ctx),
        "previous" => return format!("This Lead was contacted {} previously. {}.", formatted, ctx),
        "day" => return format!("Contact was made on {} of the month. {}.", formatted, ctx),
        _ => {}
    }

    if let Some((field, suffix)) = split_dummy(&column) {
        // "admin." would otherwise end the clause early
        let category = suffix.trim_end_matches('.');
        let yes = column.contains("yes");
        match field {
            "housing" => return format!("This Lead {} a housing loan. {}.", has(yes), ctx),
            "loan" => return format!("This Lead {} a personal loan. {}.", has(yes), ctx),
            "default" => return format!("This Lead {} credit in default. {}.", has(yes), ctx),
            "poutcome" => return format!("Previous campaign outcome was {}. {}.", category, ctx),
            "contact" => return format!("This Lead was contacted via {}. {}.", category, ctx),
            "job" => return format!("This Lead works as a {}. {}.", category, ctx),
            "marital" => return format!("This Lead is {}. {}.", category, ctx),
            "education" => return format!("This Lead has {} education. {}.", category, ctx),
            "month" => return format!("Last contact was in {}. {}.", capitalize(category), ctx),
            _ => {}
        }
    }

    if display.feature_value.is_empty() {
        format!("{}. {}.", label, ctx)
    } else {
        format!("This Lead's {} is {}. {}.", label, display.feature_value, ctx)
    }
}
