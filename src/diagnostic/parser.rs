//! Classify single lines of gcc-style compiler output.

/// Kind of a compiler output line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Error,
    Warning,
    Message,
    Note,
}

/// Everything recovered from one output line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedLine {
    pub kind: Option<LineKind>,
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub sys_file: bool,
    /// message body without file, line and column
    pub message: String,
    /// code fragments quoted in the message, left to right
    pub code: Vec<String>,
}

const SYS_INCLUDE: &str = "/usr/include/";

/// Split at single colons (`::` is kept) and at a trailing comma.
fn split_segments(line: &str) -> Vec<&str> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let split = match b {
            b':' => {
                let prev = i > 0 && bytes[i - 1] == b':';
                let next = bytes.get(i + 1) == Some(&b':');
                !prev && !next
            }
            b',' => i + 1 == bytes.len(),
            _ => false,
        };
        if split {
            segments.push(line[start..i].trim());
            start = i + 1;
        }
    }
    segments.push(line[start..].trim());
    segments
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `(.text+0x1f)` as printed by the linker
fn is_linker_ref(s: &str) -> bool {
    let Some(inner) = s.strip_prefix("(.").and_then(|s| s.strip_suffix(')')) else {
        return false;
    };
    let Some((section, offset)) = inner.split_once("+0x") else {
        return false;
    };
    !section.is_empty()
        && section.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !offset.is_empty()
        && offset.bytes().all(|b| b.is_ascii_hexdigit() || b == b'_')
}

/// Pull out fragments quoted with typographic quotes.
fn quoted_fragments(message: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut rest = message;
    while let Some(open) = rest.find('\u{2018}') {
        let after = &rest[open + '\u{2018}'.len_utf8()..];
        let Some(close) = after.find('\u{2019}') else {
            break;
        };
        if close > 0 {
            out.push(after[..close].to_string());
        }
        rest = &after[close + '\u{2019}'.len_utf8()..];
    }
    out
}

fn fill_message(parsed: &mut ParsedLine, segments: &[&str]) {
    parsed.message = segments.join(": ");
    parsed.code = quoted_fragments(&parsed.message);
    if parsed.code.is_empty() && !segments.is_empty() {
        let code = match segments {
            ["candidates are", rest @ ..] => rest.join(":"),
            _ => segments.join(":"),
        };
        if !code.is_empty() {
            parsed.code.push(code);
        }
    }
}

/// Parse one line of compiler output.
pub fn parse_line(line: &str) -> ParsedLine {
    let mut parsed = ParsedLine::default();
    let line = line.trim();
    let mut segments = split_segments(line);

    if segments.len() == 1 {
        parsed.file = "<unknown>".to_string();
        parsed.kind = Some(LineKind::Note);
        fill_message(&mut parsed, &segments);
        return parsed;
    }

    if let Some(rest) = segments[0].strip_prefix("In file included from") {
        segments[0] = rest.trim();
    } else if let Some(rest) = segments[0].strip_prefix("from ") {
        segments[0] = rest.trim();
    }

    let head = segments[0];
    if head == "collect2" {
        parsed.kind = Some(LineKind::Message);
        fill_message(&mut parsed, &segments[1..]);
        return parsed;
    }
    if head.is_empty() || head.contains(' ') {
        return parsed;
    }

    parsed.file = head.to_string();
    parsed.sys_file = head.starts_with(SYS_INCLUDE);

    let second = segments[1];
    if is_linker_ref(second) {
        parsed.kind = Some(LineKind::Warning);
        fill_message(&mut parsed, &segments[2..]);
    } else if is_number(second) {
        parsed.line = second.parse().ok();
        let mut idx = 2;
        if segments.get(idx).is_some_and(|s| is_number(s)) {
            parsed.column = segments[idx].parse().ok();
            idx += 1;
        }
        let (kind, body) = match segments.get(idx).copied() {
            Some("error") | Some("fatal error") => (LineKind::Error, idx + 1),
            Some("warning") => (LineKind::Warning, idx + 1),
            Some("note") => (LineKind::Note, idx + 1),
            _ => (LineKind::Note, idx),
        };
        parsed.kind = Some(kind);
        fill_message(&mut parsed, segments.get(body..).unwrap_or_default());
    } else if !second.is_empty() {
        parsed.kind = Some(LineKind::Note);
        fill_message(&mut parsed, &segments[1..]);
    }
    parsed
}
