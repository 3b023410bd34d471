//! Alert message rendering.
//!
//! Operator templates get `{field}` placeholders substituted with the
//! HTML-escaped value of the matching reading. Rules without a template get a
//! localized default message chosen by condition kind.

use crate::condition::AlertCondition;
use crate::rule::AlertRule;
use telemon_common::i18n::TRANSLATIONS;
use telemon_common::types::Readings;

/// Build the message for a rule that fired against `readings`.
pub fn format_message(rule: &AlertRule, readings: &Readings, locale: &str) -> String {
    match &rule.message_template {
        Some(template) => render_template(template, readings),
        None => default_message(rule, readings, locale),
    }
}

/// Substitute `{field}` placeholders with escaped reading values.
///
/// Placeholders naming an absent reading, and unterminated braces, are left
/// as written.
///
/// ```
/// use std::collections::HashMap;
/// use telemon_alert::message::render_template;
///
/// let readings = HashMap::from([("temperature".to_string(), 85.5)]);
/// assert_eq!(render_template("Value: {temperature}", &readings), "Value: 85.5");
/// assert_eq!(render_template("Value: {pressure}", &readings), "Value: {pressure}");
/// ```
pub fn render_template(template: &str, readings: &Readings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after[close..].starts_with('}') => {
                let key = &after[..close];
                match readings.get(key) {
                    Some(value) => out.push_str(&escape_html(&format_value(*value))),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            // Either no closing brace or another '{' first: emit this one
            // literally and rescan from the next character.
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Escape `< > & " '` for safe interpolation into markup.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

/// Shortest display form: `85.0` renders as `85`, `85.5` as `85.5`.
fn format_value(value: f64) -> String {
    value.to_string()
}

fn reading_display(readings: &Readings, field: &str) -> String {
    readings
        .get(field)
        .map_or_else(|| "n/a".to_string(), |v| format_value(*v))
}

fn default_message(rule: &AlertRule, readings: &Readings, locale: &str) -> String {
    let t = &*TRANSLATIONS;
    // {name} is substituted last so a rule name containing placeholder text
    // is never expanded.
    match &rule.condition {
        AlertCondition::Threshold {
            field,
            operator,
            value,
        } => t
            .get(
                locale,
                "alert.threshold",
                "{name}: {field} = {value} (threshold: {op} {target})",
            )
            .replace("{field}", field)
            .replace("{value}", &reading_display(readings, field))
            .replace("{op}", operator.symbol())
            .replace("{target}", &format_value(*value))
            .replace("{name}", &rule.name),
        AlertCondition::Range {
            field,
            min,
            max,
            mode,
        } => t
            .get(
                locale,
                "alert.range",
                "{name}: {field} = {value} (range: {min} - {max}, {mode})",
            )
            .replace("{field}", field)
            .replace("{value}", &reading_display(readings, field))
            .replace("{min}", &format_value(*min))
            .replace("{max}", &format_value(*max))
            .replace(
                "{mode}",
                t.get(locale, &format!("range.{mode}"), &mode.to_string()),
            )
            .replace("{name}", &rule.name),
        AlertCondition::Trend {
            field, direction, ..
        } => t
            .get(locale, "alert.trend", "{name}: {field} trend is {direction}")
            .replace("{field}", field)
            .replace(
                "{direction}",
                t.get(locale, &format!("trend.{direction}"), &direction.to_string()),
            )
            .replace("{name}", &rule.name),
        AlertCondition::Composite { .. } => t
            .get(locale, "alert.composite", "{name}: multiple conditions triggered")
            .replace("{name}", &rule.name),
    }
}
