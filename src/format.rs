//! Percent-style template expansion for text log messages.

use serde_json::Value;

/// Expand `template` against `args`.
///
/// Supported directives: `%s` (string), `%d` (number), `%i` (integer),
/// `%f` (float), `%j` (JSON), `%%` (literal percent). Directives with no
/// matching argument are kept literally; arguments with no directive are
/// appended, space separated.
pub fn format(template: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(&spec) if matches!(spec, 's' | 'd' | 'i' | 'f' | 'j') => match args.next() {
                Some(arg) => {
                    chars.next();
                    out.push_str(&expand(spec, arg));
                }
                // out of arguments: keep the directive as-is
                None => out.push('%'),
            },
            _ => out.push('%'),
        }
    }

    for arg in args {
        out.push(' ');
        out.push_str(&display(arg));
    }
    out
}

fn expand(spec: char, arg: &Value) -> String {
    match spec {
        'd' => as_number(arg)
            .map(format_number)
            .unwrap_or_else(|| "NaN".to_string()),
        'i' => as_number(arg)
            .map(|n| (n.trunc() as i64).to_string())
            .unwrap_or_else(|| "NaN".to_string()),
        'f' => as_number(arg)
            .map(|n| n.to_string())
            .unwrap_or_else(|| "NaN".to_string()),
        'j' => serde_json::to_string(arg).unwrap_or_else(|_| "undefined".to_string()),
        // %s and anything else falls back to plain display
        _ => display(arg),
    }
}

/// Strings render unquoted; everything else renders as JSON.
fn display(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn as_number(arg: &Value) -> Option<f64> {
    match arg {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Integer-valued numbers print without a trailing fraction.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}
