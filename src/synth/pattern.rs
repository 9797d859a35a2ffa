//! String generation from regular expressions.
//!
//! # Responsibilities
//! - Parse the common regex subset used in API schemas
//! - Emit a random string matching it
//!
//! # Design Decisions
//! - Supported: literals, `.`, classes (`[a-z]`, `[^...]`, `\d \w \s`),
//!   groups, alternation, `* + ? {n} {n,} {n,m}`, anchors
//! - Unsupported (backreferences, lookaround) yields `None`
//! - Every candidate is checked with the `regex` crate before it is returned

use rand::Rng;
use regex::Regex;

/// Extra repetitions allowed for open-ended quantifiers.
const OPEN_REPEAT: u32 = 4;

/// Attempts before giving up on a pattern.
const MAX_ATTEMPTS: usize = 8;

/// Printable ASCII, used for `.` and negated classes.
const PRINTABLE: (char, char) = (' ', '~');

/// Generate a string matching `pattern`, if the pattern is supported.
pub fn generate<R: Rng + ?Sized>(pattern: &str, rng: &mut R) -> Option<String> {
    let matcher = Regex::new(pattern).ok()?;
    let tree = Parser::new(pattern).parse()?;

    for _ in 0..MAX_ATTEMPTS {
        let mut out = String::new();
        tree.emit(rng, &mut out)?;
        if matcher.is_match(&out) {
            return Some(out);
        }
    }
    tracing::debug!(pattern, "Generated strings did not satisfy pattern");
    None
}

#[derive(Debug, Clone)]
enum Node {
    Empty,
    Literal(char),
    Class(CharSet),
    Alternation(Vec<Vec<Node>>),
    Repeat(Box<Node>, u32, u32),
}

#[derive(Debug, Clone)]
struct CharSet {
    ranges: Vec<(char, char)>,
    negated: bool,
}

impl CharSet {
    fn of(ranges: &[(char, char)], negated: bool) -> Self {
        Self {
            ranges: ranges.to_vec(),
            negated,
        }
    }

    fn digit(negated: bool) -> Self {
        Self::of(&[('0', '9')], negated)
    }

    fn word(negated: bool) -> Self {
        Self::of(&[('a', 'z'), ('A', 'Z'), ('0', '9'), ('_', '_')], negated)
    }

    fn space(negated: bool) -> Self {
        Self::of(&[(' ', ' ')], negated)
    }

    fn contains(&self, c: char) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi)
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<char> {
        if self.negated {
            let candidates: Vec<char> = (PRINTABLE.0..=PRINTABLE.1)
                .filter(|c| !self.contains(*c))
                .collect();
            if candidates.is_empty() {
                return None;
            }
            return Some(candidates[rng.gen_range(0..candidates.len())]);
        }

        let total: u32 = self
            .ranges
            .iter()
            .map(|&(lo, hi)| (hi as u32).saturating_sub(lo as u32) + 1)
            .sum();
        if total == 0 {
            return None;
        }
        let mut index = rng.gen_range(0..total);
        for &(lo, hi) in &self.ranges {
            let width = (hi as u32).saturating_sub(lo as u32) + 1;
            if index < width {
                return char::from_u32(lo as u32 + index);
            }
            index -= width;
        }
        None
    }
}

impl Node {
    fn emit<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut String) -> Option<()> {
        match self {
            Node::Empty => {}
            Node::Literal(c) => out.push(*c),
            Node::Class(set) => out.push(set.sample(rng)?),
            Node::Alternation(branches) => {
                let branch = &branches[rng.gen_range(0..branches.len())];
                for node in branch {
                    node.emit(rng, out)?;
                }
            }
            Node::Repeat(node, min, max) => {
                for _ in 0..rng.gen_range(*min..=*max) {
                    node.emit(rng, out)?;
                }
            }
        }
        Some(())
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Option<Node> {
        let node = self.alternation()?;
        // A stray `)` is the only way to stop early.
        if self.pos != self.chars.len() {
            return None;
        }
        Some(node)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn alternation(&mut self) -> Option<Node> {
        let mut branches = vec![self.sequence()?];
        while self.eat('|') {
            branches.push(self.sequence()?);
        }
        Some(Node::Alternation(branches))
    }

    fn sequence(&mut self) -> Option<Vec<Node>> {
        let mut nodes = Vec::new();
        while let Some(c) = self.peek() {
            if c == '|' || c == ')' {
                break;
            }
            let atom = self.atom()?;
            nodes.push(self.quantifier(atom)?);
        }
        Some(nodes)
    }

    fn atom(&mut self) -> Option<Node> {
        match self.next()? {
            '^' | '$' => Some(Node::Empty),
            '(' => {
                if self.eat('?') {
                    // Only non-capturing groups; lookaround and named groups are out.
                    if !self.eat(':') {
                        return None;
                    }
                }
                let inner = self.alternation()?;
                self.eat(')').then_some(inner)
            }
            '[' => self.class(),
            '.' => Some(Node::Class(CharSet::of(&[('a', 'z'), ('A', 'Z'), ('0', '9')], false))),
            '\\' => self.escape(),
            '*' | '+' | '?' => None,
            c => Some(Node::Literal(c)),
        }
    }

    fn escape(&mut self) -> Option<Node> {
        let node = match self.next()? {
            'd' => Node::Class(CharSet::digit(false)),
            'D' => Node::Class(CharSet::digit(true)),
            'w' => Node::Class(CharSet::word(false)),
            'W' => Node::Class(CharSet::word(true)),
            's' => Node::Class(CharSet::space(false)),
            'S' => Node::Class(CharSet::space(true)),
            'b' | 'B' | 'A' | 'z' => Node::Empty,
            'n' => Node::Literal('\n'),
            't' => Node::Literal('\t'),
            'r' => Node::Literal('\r'),
            c if c.is_ascii_digit() => return None,
            c => Node::Literal(c),
        };
        Some(node)
    }

    fn class(&mut self) -> Option<Node> {
        let negated = self.eat('^');
        let mut ranges = Vec::new();
        let mut first = true;

        loop {
            let c = self.next()?;
            if c == ']' && !first {
                break;
            }
            first = false;

            let lo = if c == '\\' {
                match self.next()? {
                    'd' => {
                        ranges.extend(CharSet::digit(false).ranges);
                        continue;
                    }
                    'w' => {
                        ranges.extend(CharSet::word(false).ranges);
                        continue;
                    }
                    's' => {
                        ranges.extend(CharSet::space(false).ranges);
                        continue;
                    }
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                }
            } else {
                c
            };

            if self.peek() == Some('-') && self.chars.get(self.pos + 1).is_some_and(|&n| n != ']') {
                self.pos += 1;
                let mut hi = self.next()?;
                if hi == '\\' {
                    hi = self.next()?;
                }
                if hi < lo {
                    return None;
                }
                ranges.push((lo, hi));
            } else {
                ranges.push((lo, lo));
            }
        }

        Some(Node::Class(CharSet { ranges, negated }))
    }

    fn quantifier(&mut self, atom: Node) -> Option<Node> {
        let (min, max) = match self.peek() {
            Some('*') => {
                self.pos += 1;
                (0, OPEN_REPEAT)
            }
            Some('+') => {
                self.pos += 1;
                (1, 1 + OPEN_REPEAT)
            }
            Some('?') => {
                self.pos += 1;
                (0, 1)
            }
            Some('{') => match self.counted() {
                Some(bounds) => bounds,
                None => return Some(atom),
            },
            _ => return Some(atom),
        };
        // Lazy and possessive suffixes do not change what can match.
        if !self.eat('?') {
            self.eat('+');
        }
        Some(Node::Repeat(Box::new(atom), min, max))
    }

    /// `{n}`, `{n,}` or `{n,m}`; restores the position when the braces are literal.
    fn counted(&mut self) -> Option<(u32, u32)> {
        let start = self.pos;
        self.pos += 1;

        let min = self.number();
        let result = match (min, self.peek()) {
            (Some(n), Some('}')) => Some((n, n)),
            (Some(n), Some(',')) => {
                self.pos += 1;
                match (self.number(), self.peek()) {
                    (Some(m), Some('}')) if m >= n => Some((n, m)),
                    (None, Some('}')) => Some((n, n + OPEN_REPEAT)),
                    _ => None,
                }
            }
            _ => None,
        };

        match result {
            Some(bounds) => {
                self.pos += 1;
                Some(bounds)
            }
            None => {
                self.pos = start;
                None
            }
        }
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        self.chars[start..self.pos].iter().collect::<String>().parse().ok()
    }
}
