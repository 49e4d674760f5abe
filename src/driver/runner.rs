// Selection support shared between the rmake harness and every generated
// driver. This file is embedded verbatim into `makemain.rs`, so it must stay
// free of external dependencies and reference nothing from the surrounding
// crate.
//
// The pattern language is a compact regular-expression subset: literal
// characters, `.`, `[...]` classes with ranges and `^` negation, postfix
// `*` `+` `?`, a `^` start anchor, a `$` end anchor, and `\` escapes.
// Matching is an unanchored search unless the pattern starts with `^`; the
// empty pattern matches every name. `(` `)` `|` `{` `}` are rejected at
// compile time.

use std::error::Error;
use std::fmt;

/// Error produced when a selection pattern fails to compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternError {
    pattern: String,
    reason: String,
}

impl PatternError {
    fn new(pattern: &str, reason: impl Into<String>) -> PatternError {
        PatternError {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }

    /// The pattern string that failed to compile.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid pattern {:?}: {}", self.pattern, self.reason)
    }
}

impl Error for PatternError {}

#[derive(Debug, Clone)]
enum Atom {
    Literal(char),
    Any,
    Class { negated: bool, ranges: Vec<(char, char)> },
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repeat {
    One,
    ZeroOrMore,
    OneOrMore,
    ZeroOrOne,
}

/// A compiled selection pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    anchored: bool,
    nodes: Vec<(Atom, Repeat)>,
}

impl Pattern {
    pub fn compile(pattern: &str) -> Result<Pattern, PatternError> {
        let chars: Vec<char> = pattern.chars().collect();
        let anchored = chars.first() == Some(&'^');
        let mut nodes: Vec<(Atom, Repeat)> = Vec::new();
        let mut i = usize::from(anchored);
        while i < chars.len() {
            match chars[i] {
                c @ ('(' | ')' | '|' | '{' | '}') => {
                    return Err(PatternError::new(
                        pattern,
                        format!("unsupported metacharacter '{c}'"),
                    ));
                }
                c @ ('*' | '+' | '?') => {
                    let rep = match c {
                        '*' => Repeat::ZeroOrMore,
                        '+' => Repeat::OneOrMore,
                        _ => Repeat::ZeroOrOne,
                    };
                    match nodes.last_mut() {
                        Some(node) if node.1 == Repeat::One => node.1 = rep,
                        _ => {
                            return Err(PatternError::new(
                                pattern,
                                format!("'{c}' with nothing to repeat"),
                            ));
                        }
                    }
                    i += 1;
                }
                '.' => {
                    nodes.push((Atom::Any, Repeat::One));
                    i += 1;
                }
                '[' => i = parse_class(pattern, &chars, i, &mut nodes)?,
                '\\' => {
                    let Some(&next) = chars.get(i + 1) else {
                        return Err(PatternError::new(pattern, "trailing backslash"));
                    };
                    nodes.push((Atom::Literal(next), Repeat::One));
                    i += 2;
                }
                '$' if i == chars.len() - 1 => {
                    nodes.push((Atom::End, Repeat::One));
                    i += 1;
                }
                c => {
                    nodes.push((Atom::Literal(c), Repeat::One));
                    i += 1;
                }
            }
        }
        Ok(Pattern { anchored, nodes })
    }

    /// Tests whether the pattern matches anywhere in `text` (or at the
    /// start only, for `^`-anchored patterns).
    pub fn is_match(&self, text: &str) -> bool {
        let chars: Vec<char> = text.chars().collect();
        if self.anchored {
            return match_here(&self.nodes, &chars);
        }
        (0..=chars.len()).any(|start| match_here(&self.nodes, &chars[start..]))
    }
}

// Parses a `[...]` class starting at `chars[start]` and returns the index
// just past the closing bracket. A `]` directly after the opening bracket
// (or after `^`) is a literal member.
fn parse_class(
    pattern: &str,
    chars: &[char],
    start: usize,
    nodes: &mut Vec<(Atom, Repeat)>,
) -> Result<usize, PatternError> {
    let mut i = start + 1;
    let mut negated = false;
    if chars.get(i) == Some(&'^') {
        negated = true;
        i += 1;
    }
    let mut ranges = Vec::new();
    let mut first = true;
    loop {
        let Some(&c) = chars.get(i) else {
            return Err(PatternError::new(pattern, "unclosed character class"));
        };
        if c == ']' && !first {
            i += 1;
            break;
        }
        first = false;
        let lo = if c == '\\' {
            i += 1;
            match chars.get(i) {
                Some(&esc) => esc,
                None => return Err(PatternError::new(pattern, "trailing backslash")),
            }
        } else {
            c
        };
        if chars.get(i + 1) == Some(&'-') && chars.get(i + 2).is_some_and(|&c| c != ']') {
            let hi = chars[i + 2];
            if hi < lo {
                return Err(PatternError::new(
                    pattern,
                    format!("invalid range '{lo}-{hi}'"),
                ));
            }
            ranges.push((lo, hi));
            i += 3;
        } else {
            ranges.push((lo, lo));
            i += 1;
        }
    }
    nodes.push((Atom::Class { negated, ranges }, Repeat::One));
    Ok(i)
}

fn atom_matches(atom: &Atom, c: char) -> bool {
    match atom {
        Atom::Literal(l) => *l == c,
        Atom::Any => true,
        Atom::Class { negated, ranges } => {
            let inside = ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi);
            inside != *negated
        }
        Atom::End => false,
    }
}

fn match_here(nodes: &[(Atom, Repeat)], text: &[char]) -> bool {
    let Some(((atom, rep), rest)) = nodes.split_first() else {
        return true;
    };
    if let Atom::End = atom {
        return text.is_empty() && match_here(rest, text);
    }
    match rep {
        Repeat::One => {
            !text.is_empty() && atom_matches(atom, text[0]) && match_here(rest, &text[1..])
        }
        Repeat::ZeroOrOne => {
            (!text.is_empty() && atom_matches(atom, text[0]) && match_here(rest, &text[1..]))
                || match_here(rest, text)
        }
        Repeat::ZeroOrMore => match_repeat(atom, rest, text, 0),
        Repeat::OneOrMore => match_repeat(atom, rest, text, 1),
    }
}

// Consume `min` occurrences of `atom`, then grow the consumed span one
// character at a time until the rest of the pattern matches what remains.
fn match_repeat(atom: &Atom, rest: &[(Atom, Repeat)], text: &[char], min: usize) -> bool {
    let mut i = 0;
    while i < min {
        if i >= text.len() || !atom_matches(atom, text[i]) {
            return false;
        }
        i += 1;
    }
    loop {
        if match_here(rest, &text[i..]) {
            return true;
        }
        if i < text.len() && atom_matches(atom, text[i]) {
            i += 1;
        } else {
            return false;
        }
    }
}

/// Single-slot cache around [`Pattern::compile`].
///
/// Repeated selection calls with the same pattern string reuse the cached
/// compilation; a distinct pattern replaces the slot. The cache is owned by
/// the caller rather than living in process-wide state, so each runner (or
/// test) gets its own.
#[derive(Debug, Default)]
pub struct Selector {
    cached: Option<(String, Pattern)>,
    compiles: usize,
}

impl Selector {
    pub fn new() -> Selector {
        Selector::default()
    }

    /// Number of pattern compilations performed so far (cache misses).
    pub fn compile_count(&self) -> usize {
        self.compiles
    }

    /// Tests `candidate` against `pattern`, recompiling only when the
    /// pattern string differs from the cached one. A compile failure
    /// propagates without touching the previously cached pattern.
    pub fn select(&mut self, pattern: &str, candidate: &str) -> Result<bool, PatternError> {
        if let Some((cached, compiled)) = &self.cached {
            if cached == pattern {
                return Ok(compiled.is_match(candidate));
            }
        }
        let compiled = Pattern::compile(pattern)?;
        self.compiles += 1;
        let matched = compiled.is_match(candidate);
        self.cached = Some((pattern.to_string(), compiled));
        Ok(matched)
    }
}
