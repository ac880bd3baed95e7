//! Tolerant scanners for backend payloads
//!
//! The kiosk does not need a full JSON document model: it pulls the `name`
//! strings out of the report-type listing and a single number out of the
//! metrics response. Malformed pieces are skipped and never abort a scan.

/// Key whose string values form the report-type list
const NAME_KEY: &str = "\"name\"";

/// Key carrying the average response time
const AVG_MINUTES_KEY: &str = "average_response_minutes";

/// Extract every `"name": "<value>"` string, in order
///
/// Escaped quotes inside values are honoured. Entries whose value is not a
/// string are skipped. Returns `None` when nothing usable was found.
pub fn parse_report_type_names(payload: &str) -> Option<Vec<String>> {
    let mut names = Vec::new();
    let mut rest = payload;

    while let Some(pos) = rest.find(NAME_KEY) {
        rest = &rest[pos + NAME_KEY.len()..];

        let after_key = rest.trim_start();
        let Some(after_colon) = after_key.strip_prefix(':') else {
            continue;
        };
        let value = after_colon.trim_start();
        let Some(body) = value.strip_prefix('"') else {
            // null, number or nested object: not a label
            continue;
        };

        match scan_string(body) {
            Scanned::Value(raw, consumed) => {
                let normalized = normalize_label(&raw);
                names.push(if normalized.is_empty() { raw } else { normalized });
                rest = &body[consumed..];
            }
            // Resume at the next key; the bad value's own quote is not trusted.
            Scanned::Malformed => rest = body,
            // Unterminated string: nothing after it can be trusted.
            Scanned::Unterminated => break,
        }
    }

    if names.is_empty() {
        None
    } else {
        Some(names)
    }
}

/// Outcome of reading one string value
#[derive(Debug, PartialEq, Eq)]
enum Scanned {
    /// Unescaped value and bytes consumed including the closing quote
    Value(String, usize),
    /// Bad escape sequence
    Malformed,
    Unterminated,
}

/// Read a JSON string body (after the opening quote)
fn scan_string(body: &str) -> Scanned {
    let mut out = String::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Scanned::Value(out, i + 1),
            '\\' => {
                let Some((_, esc)) = chars.next() else {
                    return Scanned::Unterminated;
                };
                match esc {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    'u' => {
                        let mut hex = String::with_capacity(4);
                        while hex.len() < 4 {
                            match chars.next_if(|(_, h)| h.is_ascii_hexdigit()) {
                                Some((_, h)) => hex.push(h),
                                None => break,
                            }
                        }
                        if hex.len() < 4 {
                            return Scanned::Malformed;
                        }
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) => out.push(decoded),
                            None => return Scanned::Malformed,
                        }
                    }
                    other => out.push(other),
                }
            }
            _ => out.push(c),
        }
    }
    Scanned::Unterminated
}

/// Fold Polish diacritics to ASCII for the panel's built-in font
///
/// Other non-ASCII characters are dropped.
pub fn normalize_label(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            'ą' => Some('a'),
            'Ą' => Some('A'),
            'ć' => Some('c'),
            'Ć' => Some('C'),
            'ę' => Some('e'),
            'Ę' => Some('E'),
            'ł' => Some('l'),
            'Ł' => Some('L'),
            'ń' => Some('n'),
            'Ń' => Some('N'),
            'ó' => Some('o'),
            'Ó' => Some('O'),
            'ś' => Some('s'),
            'Ś' => Some('S'),
            'ź' | 'ż' => Some('z'),
            'Ź' | 'Ż' => Some('Z'),
            c if c.is_ascii() => Some(c),
            _ => None,
        })
        .collect()
}

/// What the metrics endpoint said
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricReading {
    Value(f64),
    /// Explicit `null`: the backend has no data yet
    Null,
    Malformed,
}

/// Parse `{"average_response_minutes": 7.8}`, `{"...": null}` or a bare number
pub fn parse_wait_minutes(payload: &str) -> MetricReading {
    let trimmed = payload.trim();

    let Some(pos) = trimmed.find(AVG_MINUTES_KEY) else {
        return parse_number(trimmed.trim_matches('"'));
    };

    let after_key = &trimmed[pos + AVG_MINUTES_KEY.len()..];
    let Some(colon) = after_key.find(':') else {
        return MetricReading::Malformed;
    };
    let value = after_key[colon + 1..].trim_start();

    if value.get(..4).map_or(false, |v| v.eq_ignore_ascii_case("null")) {
        return MetricReading::Null;
    }

    let token: String = value
        .trim_start_matches('"')
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
        .collect();
    parse_number(&token)
}

fn parse_number(token: &str) -> MetricReading {
    match token.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => MetricReading::Value(v),
        _ => MetricReading::Malformed,
    }
}
