//! Type name normalization.
//!
//! Front-ends spell the same type in many ways: `const Foo &`, `class Foo`,
//! `Foo*`. Every spelling is reduced to one lookup key before it touches the
//! entity store, so that lookups and sorted inserts agree.
//!
//! Rules, applied in order:
//!
//! 1. Every `*` and `&` sigil is dropped.
//! 2. Leading `const`, `class`, `struct` and `mutable` tokens are stripped,
//!    both before and after whitespace collapsing.
//! 3. Outside template argument lists, a whitespace run between two tokens of
//!    the same lexical class is removed, and a run between tokens of different
//!    classes becomes one space. Inside `<...>` whitespace is kept verbatim.
//! 4. Trailing whitespace is trimmed.
//!
//! Keys order byte-wise; [`compare_keys`] is the single comparator used by
//! both insert and lookup in [`EntityStore`](crate::model::EntityStore).

use std::cmp::Ordering;

/// Qualifier tokens stripped from the front of a spelling.
const LEADING_QUALIFIERS: [&str; 4] = ["const", "class", "struct", "mutable"];

/// Lexical class of a non-whitespace character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Word,
    Symbol,
}

#[inline]
fn char_class(c: char) -> CharClass {
    if unicode_ident::is_xid_continue(c) {
        CharClass::Word
    } else {
        CharClass::Symbol
    }
}

/// Normalize a raw type spelling into its lookup key.
///
/// Pure and linear in the length of `raw`.
///
/// # Example
/// ```
/// use codemodel::base::normalize;
///
/// assert_eq!(normalize("const Widget &"), "Widget");
/// assert_eq!(normalize("class std::vector<int> *"), "std::vector<int>");
/// ```
pub fn normalize(raw: &str) -> String {
    let without_sigils: String = raw.chars().filter(|c| *c != '*' && *c != '&').collect();
    let body = strip_leading_qualifiers(&without_sigils);

    let mut out = String::with_capacity(body.len());
    let mut depth = 0usize;
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if depth > 0 {
            match c {
                '<' => depth += 1,
                '>' => depth -= 1,
                _ => {}
            }
            out.push(c);
            continue;
        }

        if c.is_whitespace() {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let (Some(prev), Some(&next)) = (out.chars().next_back(), chars.peek()) else {
                continue;
            };
            if char_class(prev) != char_class(next) {
                out.push(' ');
            }
            continue;
        }

        if c == '<' {
            depth += 1;
        }
        out.push(c);
    }

    let trimmed = out.trim_end().len();
    out.truncate(trimmed);

    // Collapsing can glue fragments into a fresh qualifier (`con st <T>`).
    let rest = strip_leading_qualifiers(&out);
    if rest.len() != out.len() {
        return rest.to_string();
    }
    out
}

/// Strip any sequence of leading qualifier tokens (and the whitespace around them).
fn strip_leading_qualifiers(spelling: &str) -> &str {
    let mut rest = spelling.trim_start();
    'outer: loop {
        for qualifier in LEADING_QUALIFIERS {
            if let Some(after) = rest.strip_prefix(qualifier) {
                if after.starts_with(char::is_whitespace) {
                    rest = after.trim_start();
                    continue 'outer;
                }
            }
        }
        return rest;
    }
}

/// Key used to find the definition of a template from any of its uses.
///
/// This is the normalized spelling truncated before the first `<`, so
/// `Pair<int, Foo>` and `Pair<T,U>` share the key `Pair`.
pub fn template_definition_key(raw: &str) -> String {
    let mut key = normalize(raw);
    if let Some(idx) = key.find('<') {
        key.truncate(idx);
        let trimmed = key.trim_end().len();
        key.truncate(trimmed);
    }
    key
}

/// Returns true if the spelling names a template instantiation or definition.
#[inline]
pub fn is_template_spelling(raw: &str) -> bool {
    raw.contains('<')
}

/// The one ordering for normalized keys.
#[inline]
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}
