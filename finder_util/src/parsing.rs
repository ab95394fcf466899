use std::collections::HashMap;

use url::form_urlencoded;

/// Parse a query string into a map. A leading `?` is ignored, keys and values are
/// percent-decoded, and the first occurrence of a repeated key wins.
pub fn parse_query_str(query_str: &str) -> HashMap<String, String> {
    let query_str = query_str.strip_prefix('?').unwrap_or(query_str);
    let mut results = HashMap::new();
    for (key, value) in form_urlencoded::parse(query_str.as_bytes()) {
        results.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    results
}

/// Split a relative URL like `/all?radius=50#top` into its path and query (without `?`).
/// The fragment is discarded.
pub fn split_path_and_query(url: &str) -> (&str, &str) {
    let url = url.split('#').next().unwrap_or_default();
    match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    }
}

/// Non-empty segments of a URL path.
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Parse the longest numeric prefix of `s`, after leading whitespace.
/// `"50"` and `"50mi"` give 50, `"-70.25"` gives -70.25, `"abc"` and `""` give `None`.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
