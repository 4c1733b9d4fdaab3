//! Demangler for legacy Rust/C++-style mangled symbols.
//!
//! Symbols look like `_ZN3foo3barE`: a `_ZN` (or `ZN`) marker, a body of
//! length-prefixed path segments, and a trailing `E`. Within a segment,
//! `.` stands for the path separator and `$...$` (or `_$...$`) delimits an
//! escape: `$u<hex>$` is a Unicode scalar, anything else is looked up in a
//! fixed symbol table. A final segment of declared length 17 filling the
//! rest of the body is the symbol hash and is not part of the path.

/// Emitted for escape sequences with no known expansion.
const PLACEHOLDER: &str = "???";

/// Rewrites a mangled symbol into a readable `::`-separated path.
///
/// Total over all inputs: anything without the recognized envelope, or with
/// a malformed body (no digits where a length is expected, a declared length
/// overrunning the body), comes back unchanged. An escape that is opened but
/// never closed is emitted as literal text.
pub fn demangle(symbol: &str) -> String {
    let Some(inner) = strip_envelope(symbol) else {
        return symbol.to_string();
    };
    let chars: Vec<char> = inner.chars().collect();
    if chars.is_empty() {
        return symbol.to_string();
    }

    let mut path = String::new();
    let mut index = 0;
    while index < chars.len() {
        let digits_start = index;
        while index < chars.len() && chars[index].is_ascii_digit() {
            index += 1;
        }
        let digits: String = chars[digits_start..index].iter().collect();
        let Ok(length) = digits.parse::<usize>() else {
            return symbol.to_string();
        };

        // A declared length of 17 filling the rest of the body is the
        // trailing symbol hash, not a path segment.
        if length == 17 && chars.len() - index == 17 {
            break;
        }
        // Checked against the remainder, not `index + length`: a declared
        // length near usize::MAX must not overflow the bound check.
        if length > chars.len() - index {
            return symbol.to_string();
        }

        expand_segment(&chars[index..index + length], &mut path);
        path.push_str("::");
        index += length;
    }

    if path.is_empty() {
        return symbol.to_string();
    }
    path.truncate(path.len() - 2);
    path
}

fn strip_envelope(symbol: &str) -> Option<&str> {
    let body = symbol
        .strip_prefix("_ZN")
        .or_else(|| symbol.strip_prefix("ZN"))?;
    body.strip_suffix('E')
}

fn expand_segment(segment: &[char], out: &mut String) {
    let mut watching = false;
    let mut sequence = String::new();
    let mut i = 0;
    while i < segment.len() {
        let c = segment[i];
        // `_$` opens an escape just like `$`; the underscore is discarded.
        if c == '_' && segment.get(i + 1) == Some(&'$') {
            i += 1;
            continue;
        }
        if c == '.' {
            out.push_str("::");
            i += 1;
            continue;
        }
        if c == '$' {
            if watching {
                watching = false;
                expand_escape(&sequence, out);
                sequence.clear();
            } else {
                watching = true;
            }
            i += 1;
            continue;
        }
        if watching {
            sequence.push(c);
        } else {
            out.push(c);
        }
        i += 1;
    }
    // Unclosed escape: keep what was collected as a literal run.
    if watching {
        out.push_str(&sequence);
    }
}

fn expand_escape(sequence: &str, out: &mut String) {
    if let Some(hex) = sequence.strip_prefix('u') {
        match u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            Some(c) => out.push(c),
            None => out.push_str(PLACEHOLDER),
        }
        return;
    }
    let expanded = match sequence {
        "SP" => "@",
        "BP" => "*",
        "RF" => "&",
        "LT" => "<",
        "GT" => ">",
        "LP" => "(",
        "RP" => ")",
        "C" => ",",
        _ => PLACEHOLDER,
    };
    out.push_str(expanded);
}
