//! Id sequence parsing for commands such as `rd 1,3-5,9`.

/// Parses a range expression into string-encoded ids.
///
/// Comma-separated parts are trimmed. A part made only of digits is emitted
/// verbatim; a part of the form `<digits>-<digits>` expands to every integer of
/// the inclusive range in ascending order. Anything else is dropped silently,
/// as is a range whose start exceeds its end.
pub fn parse_sequence(text: &str) -> Vec<String> {
    let mut result = Vec::new();

    for part in text.split(',') {
        let part = part.trim();

        if is_digits(part) {
            result.push(part.to_string());
        }

        if let Some((begin, end)) = part.split_once('-') {
            if !is_digits(begin) || !is_digits(end) {
                continue;
            }
            let (Ok(begin), Ok(end)) = (begin.parse::<u64>(), end.parse::<u64>()) else {
                continue;
            };
            result.extend((begin..=end).map(|n| n.to_string()));
        }
    }

    result
}

/// Parses a range expression into numeric ids, first occurrence wins.
pub fn parse_ids(text: &str) -> Vec<i64> {
    let mut ids: Vec<i64> = Vec::new();
    for id in parse_sequence(text).iter().filter_map(|s| s.parse().ok()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
