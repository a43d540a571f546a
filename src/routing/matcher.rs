//! Route pattern matching
//!
//! Patterns are `/`-separated segments where `:name` captures one non-empty
//! path segment, e.g. `/api/student/:admissionNo/notice/edit`.

/// Values captured from `:name` segments, in pattern order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(&'static str, String)>,
}

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Match `path` against `pattern`, returning the captured parameters
pub fn match_pattern(pattern: &'static str, path: &str) -> Option<PathParams> {
    // A single trailing slash is ignored, as non-strict routers do
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');
    let mut params = PathParams::default();

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return Some(params),
            (Some(expected), Some(actual)) => {
                if let Some(name) = expected.strip_prefix(':') {
                    if actual.is_empty() {
                        return None;
                    }
                    params.params.push((name, percent_decode(actual)?));
                } else if expected != actual {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

/// Decode `%XX` escapes; `None` when an escape is malformed or the result is
/// not UTF-8
fn percent_decode(segment: &str) -> Option<String> {
    if !segment.contains('%') {
        return Some(segment.to_string());
    }

    let bytes = segment.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = segment.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}
