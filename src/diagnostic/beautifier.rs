//! Simplify g++ error messages.
//!
//! Level 1 substitutes `[with T = ...]` bindings, drops `std::`, folds the character
//! typedefs (`basic_string<char, ...>` becomes `string`) and default container
//! arguments. Level 2 additionally removes system header locations and `boost::`
//! qualifiers. Level 3 and up also word-wraps long lines.

use super::parser::ParsedLine;

pub const LV_NONE: u8 = 0;
pub const LV_NORMAL: u8 = 1;
pub const LV_MODERATE: u8 = 2;
pub const LV_WRAPPED: u8 = 3;

pub const WRAP_WIDTH: usize = 72;
const WRAP_INDENT: &str = "    ";

const SYS_INCLUDE: &str = "/usr/include/";

const DROPPED_PREFIXES: [&str; 3] = ["from ", "note: previous definition", "In file included from"];

const CHAR_TYPES: [&str; 2] = ["char", "wchar_t"];

const STRING_TYPES: [(&str, &str); 12] = [
    ("basic_ios<%s, char_traits<%s>>", "ios"),
    ("basic_streambuf<%s, char_traits<%s>>", "streambuf"),
    ("basic_istream<%s, char_traits<%s>>", "istream"),
    ("basic_ostream<%s, char_traits<%s>>", "ostream"),
    ("basic_iostream<%s, char_traits<%s>>", "iostream"),
    ("basic_ifstream<%s, char_traits<%s>>", "ifstream"),
    ("basic_ofstream<%s, char_traits<%s>>", "ofstream"),
    ("basic_fstream<%s, char_traits<%s>>", "fstream"),
    ("basic_istringstream<%s, char_traits<%s>, allocator<%s>>", "istringstream"),
    ("basic_ostringstream<%s, char_traits<%s>, allocator<%s>>", "ostringstream"),
    ("basic_stringstream<%s, char_traits<%s>, allocator<%s>>", "stringstream"),
    ("basic_string<%s, char_traits<%s>, allocator<%s>>", "string"),
];

type Rewrite = (&'static str, &'static str);

const CONTAINERS: [(&str, [Rewrite; 2]); 6] = [
    ("vector", [("vector<%s, allocator<%s>>", "vector<%s>"), ("typename vector<%s>::value_type", "%s")]),
    ("list", [("list<%s, allocator<%s>>", "list<%s>"), ("typename list<%s>::value_type", "%s")]),
    ("queue", [("queue<%s, deque<%s>>", "queue<%s>"), ("typename queue<%s>::value_type", "%s")]),
    ("deque", [("deque<%s, allocator<%s>>", "deque<%s>"), ("typename deque<%s>::value_type", "%s")]),
    ("stack", [("stack<%s, deque<%s>>", "stack<%s>"), ("typename stack<%s>::value_type", "%s")]),
    ("set", [("set<%s, less<%s>, allocator<%s>>", "set<%s>"), ("typename set<%s>::value_type", "%s")]),
];

/// Beautify one raw output line. An empty result means the line should be dropped.
pub fn beautify_line(raw: &str, parsed: &ParsedLine, level: u8) -> String {
    if level == LV_NONE {
        return raw.to_string();
    }

    let mut result = raw.to_string();
    if level >= LV_MODERATE {
        result = strip_sys_files(&result);
        if result.starts_with("error: ") {
            return String::new();
        }
    }

    for code in &parsed.code {
        let formatted = beautify_code(code, level);
        if formatted != *code {
            result = result.replace(code.as_str(), &formatted);
        }
    }

    let result = result.trim_end();
    let head = result.trim_start();
    if DROPPED_PREFIXES.iter().any(|p| head.starts_with(p)) {
        return String::new();
    }
    if level >= LV_WRAPPED && result.chars().count() > WRAP_WIDTH {
        return wrap(result, WRAP_WIDTH);
    }
    result.to_string()
}

/// Greedy fill with a hanging indent. Words longer than `width` are kept whole.
fn wrap(line: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut current));
            current = format!("{}{}", WRAP_INDENT, word);
        } else {
            current.push(' ');
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Beautify a single quoted code fragment.
pub fn beautify_code(code: &str, level: u8) -> String {
    let mut f = code.to_string();
    if level >= LV_NORMAL {
        let bindings = with_bindings(&f);
        f = strip_with_clauses(&f).trim().to_string();
        for (key, value) in &bindings {
            f = replace_ident(&f, key, value);
        }
        while f.contains("> >") {
            f = f.replace("> >", ">>");
        }
        f = f.replace("std::", "").replace("__gnu_cxx::", "");
        f = compact_typedefs(&f);
        f = drop_default_args(&f);
    }
    if level >= LV_MODERATE {
        f = f.replace("boost::detail::", "").replace("boost::", "");
    }
    f
}

/// Locate `[with ...]`, returning (start, end, body) with `end` past the `]`.
fn find_with_clause(s: &str, from: usize) -> Option<(usize, usize, &str)> {
    let mut search = from;
    while let Some(rel) = s[search..].find("[with") {
        let start = search + rel;
        let after = &s[start + "[with".len()..];
        let body_start = after.len() - after.trim_start().len();
        let body = &after[body_start..];
        if let Some(close) = body.find(']')
            && close > 0
        {
            let end = start + "[with".len() + body_start + close + 1;
            return Some((start, end, &body[..close]));
        }
        search = start + "[with".len();
    }
    None
}

/// Parse `T = int, U = vector<char, x>` from the first with-clause.
fn with_bindings(code: &str) -> Vec<(String, String)> {
    let Some((_, _, body)) = find_with_clause(code, 0) else {
        return Vec::new();
    };
    split_top_level(body)
        .into_iter()
        .filter_map(|item| {
            let (key, value) = item.split_once('=')?;
            Some((key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn strip_with_clauses(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut pos = 0;
    while let Some((start, end, _)) = find_with_clause(code, pos) {
        out.push_str(&code[pos..start]);
        pos = end;
    }
    out.push_str(&code[pos..]);
    out
}

fn bracket_delta(c: char) -> i32 {
    match c {
        '<' | '[' | '{' | '(' => 1,
        '>' | ']' | '}' | ')' => -1,
        _ => 0,
    }
}

/// Split at commas outside any bracket pair.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut begin = 0;
    for (i, c) in s.char_indices() {
        if c == ',' && depth == 0 {
            parts.push(&s[begin..i]);
            begin = i + 1;
        } else {
            depth += bracket_delta(c);
        }
    }
    parts.push(&s[begin..]);
    parts
}

/// First template argument, or `None` if the bracket closes before a delimiter.
fn next_token(s: &str) -> Option<&str> {
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        if (c == ',' || c == '=') && depth == 0 {
            return Some(s[..i].trim());
        }
        depth += bracket_delta(c);
        if depth < 0 {
            return None;
        }
    }
    None
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace whole-identifier occurrences of `key`.
fn replace_ident(s: &str, key: &str, value: &str) -> String {
    if key.is_empty() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for (i, _) in s.match_indices(key) {
        if i < last {
            continue;
        }
        let before = s[..i].chars().next_back();
        let after = s[i + key.len()..].chars().next();
        if before.is_some_and(is_ident_char) || after.is_some_and(is_ident_char) {
            continue;
        }
        out.push_str(&s[last..i]);
        out.push_str(value);
        last = i + key.len();
    }
    out.push_str(&s[last..]);
    out
}

fn compact_typedefs(message: &str) -> String {
    let mut message = message.to_string();
    for (pattern, short) in STRING_TYPES {
        for c in CHAR_TYPES {
            let full = pattern.replace("%s", c);
            if message.contains(&full) {
                let short = if c.starts_with('w') {
                    format!("w{}", short)
                } else {
                    short.to_string()
                };
                message = message.replace(&full, &short);
            }
        }
    }
    message
}

fn drop_default_args(message: &str) -> String {
    let mut message = message.to_string();
    for (container, rewrites) in CONTAINERS {
        let Some(pos) = message.find(container) else {
            continue;
        };
        let Some(tp) = message.get(pos + container.len() + 1..).and_then(next_token) else {
            continue;
        };
        let tp = tp.to_string();
        for (full, short) in rewrites {
            message = message.replace(&full.replace("%s", &tp), &short.replace("%s", &tp));
        }
    }
    message
}

/// Remove `/usr/include/<file>:<line>: ` locations.
fn strip_sys_files(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(pos) = rest.find(SYS_INCLUDE) {
        let after = &rest[pos + SYS_INCLUDE.len()..];
        let name_len = match after.find(':') {
            Some(n) if n > 0 => n,
            _ => {
                out.push_str(&rest[..pos + SYS_INCLUDE.len()]);
                rest = after;
                continue;
            }
        };
        out.push_str(&rest[..pos]);
        let mut tail = &after[name_len + 1..];
        let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 {
            tail = &tail[digits..];
            if let Some(t) = tail.strip_prefix(": ") {
                tail = t;
            } else if tail == "," {
                tail = "";
            }
        }
        rest = tail;
    }
    out.push_str(rest);
    out
}
