//! jq-style JSON colorization

use console::Style;
use serde_json::Value;
use std::fmt::Write;

/// Styles applied to each JSON token class
struct Palette {
    key: Style,
    string: Style,
    number: Style,
    boolean: Style,
    null: Style,
    punct: Style,
}

impl Palette {
    fn forced() -> Self {
        Self {
            key: Style::new().blue().bold().force_styling(true),
            string: Style::new().green().force_styling(true),
            number: Style::new().yellow().force_styling(true),
            boolean: Style::new().yellow().bold().force_styling(true),
            null: Style::new().black().bright().force_styling(true),
            punct: Style::new().white().force_styling(true),
        }
    }
}

/// Pretty-print `value` with ANSI colors, indented like `serde_json::to_string_pretty`
pub fn colorize_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, 0, &Palette::forced());
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize, palette: &Palette) {
    match value {
        Value::Null => {
            let _ = write!(out, "{}", palette.null.apply_to("null"));
        }
        Value::Bool(b) => {
            let _ = write!(out, "{}", palette.boolean.apply_to(b));
        }
        Value::Number(n) => {
            let _ = write!(out, "{}", palette.number.apply_to(n));
        }
        Value::String(s) => {
            let _ = write!(out, "{}", palette.string.apply_to(quoted(s)));
        }
        Value::Array(items) => {
            if items.is_empty() {
                let _ = write!(out, "{}", palette.punct.apply_to("[]"));
                return;
            }
            let _ = writeln!(out, "{}", palette.punct.apply_to("["));
            for (i, item) in items.iter().enumerate() {
                indent(out, depth + 1);
                write_value(out, item, depth + 1, palette);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            let _ = write!(out, "{}", palette.punct.apply_to("]"));
        }
        Value::Object(map) => {
            if map.is_empty() {
                let _ = write!(out, "{}", palette.punct.apply_to("{}"));
                return;
            }
            let _ = writeln!(out, "{}", palette.punct.apply_to("{"));
            for (i, (key, item)) in map.iter().enumerate() {
                indent(out, depth + 1);
                let _ = write!(out, "{}: ", palette.key.apply_to(quoted(key)));
                write_value(out, item, depth + 1, palette);
                if i + 1 < map.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            indent(out, depth);
            let _ = write!(out, "{}", palette.punct.apply_to("}"));
        }
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn quoted(s: &str) -> String {
    // Serializing a str cannot fail
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
