// Notification text. Templates are fixed; values are whole token units.

use crate::error::FetchError;
use crate::models::ChangeEvent;

/// Formats `value` with a comma between each group of three digits (`1234567` -> `1,234,567`).
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Text to send for `event`, or `None` when the event is only logged locally (`Unchanged`).
pub fn render(event: &ChangeEvent) -> Option<String> {
    match event {
        ChangeEvent::Initial { value, label } => Some(format!(
            "🔔 Validator '{}' tokens initial value: {}",
            label,
            group_thousands(*value)
        )),
        ChangeEvent::Unchanged { .. } => None,
        ChangeEvent::Changed {
            label,
            previous,
            current,
            delta,
        } => {
            let sign = if *delta > 0 { "➕" } else { "➖" };
            Some(format!(
                "🔔 Validator '{}' tokens changed!\nPrevious: {}\nNew: {}\nChange: {}{}",
                label,
                group_thousands(*previous),
                group_thousands(*current),
                sign,
                delta.unsigned_abs()
            ))
        }
    }
}

pub fn render_fetch_error(err: &FetchError) -> String {
    format!("⚠️ Error: {}", err)
}
