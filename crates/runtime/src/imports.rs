// Collect the modules a Python script imports, for PyInstaller `--hidden-import`.
//
// This is a tokenizer-level scan, not a Python parser. It understands:
//   import a, b.c as d
//   from x.y import z, w as v
//   from x import (a,
//                  b)
// and backslash continuations. String literals (including triple-quoted
// docstrings) are skipped, so `#`, brackets, and import-like text inside them
// are ignored. Relative imports are skipped; `*` targets yield the module.

use std::collections::BTreeSet;
use std::iter::Peekable;
use std::str::Chars;

/// Sorted, deduplicated fully qualified module names imported by `source`.
pub fn extract_imports(source: &str) -> Vec<String> {
    let mut imports = BTreeSet::new();

    for statement in logical_lines(source) {
        for part in statement.split(';') {
            collect_statement(part.trim(), &mut imports);
        }
    }

    imports.into_iter().collect()
}

/// Split `source` into logical lines with comments and string contents
/// removed. Newlines inside brackets or after a backslash join lines.
///
/// String prefixes (`r`, `b`, `f`, `u`) need no handling: they are kept as
/// identifier characters, and a backslash never ends a string even when raw.
fn logical_lines(source: &str) -> Vec<String> {
    let source = source.replace("\r\n", "\n");
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '#' => while chars.next_if(|&c| c != '\n').is_some() {},
            '\'' | '"' => {
                skip_string(ch, &mut chars);
                current.push_str("\"\"");
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            '\\' if chars.peek() == Some(&'\n') => {
                chars.next();
                current.push(' ');
            }
            '\n' if depth > 0 => current.push(' '),
            '\n' => end_line(&mut lines, &mut current),
            _ => current.push(ch),
        }
    }
    end_line(&mut lines, &mut current);
    lines
}

fn end_line(lines: &mut Vec<String>, current: &mut String) {
    let line = current.trim();
    if !line.is_empty() {
        lines.push(line.to_string());
    }
    current.clear();
}

/// Consume a string literal whose opening `quote` was just read.
fn skip_string(quote: char, chars: &mut Peekable<Chars<'_>>) {
    if chars.next_if_eq(&quote).is_some() {
        if chars.next_if_eq(&quote).is_none() {
            // Empty string.
            return;
        }
        let mut closing = 0;
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    chars.next();
                    closing = 0;
                }
                c if c == quote => {
                    closing += 1;
                    if closing == 3 {
                        return;
                    }
                }
                _ => closing = 0,
            }
        }
        return;
    }

    // Unterminated single-quoted strings end at the newline, which is kept.
    while let Some(ch) = chars.next_if(|&c| c != '\n') {
        if ch == '\\' {
            chars.next();
        } else if ch == quote {
            return;
        }
    }
}

fn collect_statement(statement: &str, imports: &mut BTreeSet<String>) {
    if let Some(rest) = statement.strip_prefix("import ") {
        for name in split_names(rest) {
            if is_module_path(&name) {
                imports.insert(name);
            }
        }
    } else if let Some(rest) = statement.strip_prefix("from ") {
        let Some((module, names)) = rest.split_once(" import ") else {
            return;
        };
        let module = module.trim();
        if module.starts_with('.') || !is_module_path(module) {
            return;
        }
        for name in split_names(names) {
            if name == "*" {
                imports.insert(module.to_string());
            } else if is_identifier(&name) {
                imports.insert(format!("{module}.{name}"));
            }
        }
    }
}

/// `a as b, (c, d)` -> `["a", "c", "d"]`
fn split_names(names: &str) -> Vec<String> {
    names
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .split(',')
        .filter_map(|item| item.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn is_module_path(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {
            chars.all(|c| c == '_' || c.is_alphanumeric())
        }
        _ => false,
    }
}
