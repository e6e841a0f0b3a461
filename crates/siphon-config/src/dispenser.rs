//! Directive token dispenser
//!
//! Directive text is a sequence of lines; each non-empty line is one
//! directive occurrence whose first token is the directive name and whose
//! remaining tokens are its arguments:
//!
//! ```text
//! # favour speed on the alternate encoder
//! br 3 v2
//! ```
//!
//! Tokens are split on whitespace. A token starting with `"` runs to the
//! closing quote and may contain spaces (`\"` escapes a quote). A `#` at the
//! start of a token comments out the rest of the line.

use siphon_core::ConfigError;

/// One directive occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// 1-based line number in the source text
    pub number: usize,
    /// Directive name followed by its arguments
    pub tokens: Vec<String>,
}

/// Cursor over directive lines and their arguments
#[derive(Debug, Clone, Default)]
pub struct Dispenser {
    lines: Vec<Line>,
    cursor: Option<usize>,
    arg: usize,
}

impl Dispenser {
    /// Tokenize directive text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut lines = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let number = idx + 1;
            let tokens = tokenize_line(raw, number)?;
            if !tokens.is_empty() {
                lines.push(Line { number, tokens });
            }
        }

        Ok(Self::from_lines(lines))
    }

    /// Build a dispenser holding a single directive occurrence
    pub fn from_tokens<I, S>(directive: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tokens = vec![directive.to_string()];
        tokens.extend(args.into_iter().map(Into::into));
        Self::from_lines(vec![Line { number: 1, tokens }])
    }

    fn from_lines(lines: Vec<Line>) -> Self {
        Self {
            lines,
            cursor: None,
            arg: 0,
        }
    }

    /// Advance to the next directive occurrence.
    ///
    /// Returns `false` once every line has been visited.
    pub fn next_directive(&mut self) -> bool {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next < self.lines.len() {
            self.cursor = Some(next);
            self.arg = 0;
            true
        } else {
            self.cursor = Some(self.lines.len());
            false
        }
    }

    fn current(&self) -> Option<&Line> {
        self.cursor.and_then(|c| self.lines.get(c))
    }

    /// Name of the current directive
    pub fn directive(&self) -> Option<&str> {
        self.current()
            .and_then(|l| l.tokens.first())
            .map(String::as_str)
    }

    /// Line number of the current directive (0 before the first advance)
    pub fn line(&self) -> usize {
        self.current().map_or(0, |l| l.number)
    }

    /// Consume and return every remaining argument on the current line
    pub fn remaining_args(&mut self) -> Vec<String> {
        let Some(line) = self.current() else {
            return Vec::new();
        };
        let start = (self.arg + 1).min(line.tokens.len());
        let args = line.tokens[start..].to_vec();
        self.arg += args.len();
        args
    }

    /// Wrap an error with the current directive's name and line
    pub fn err(&self, err: ConfigError) -> ConfigError {
        match self.directive() {
            Some(name) => err.at(name, self.line()),
            None => err,
        }
    }

    /// Distinct directive names in first-seen order
    pub fn directive_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for line in &self.lines {
            if let Some(name) = line.tokens.first() {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
        }
        names
    }

    /// New dispenser containing only occurrences of `directive`
    pub fn filter(&self, directive: &str) -> Self {
        let lines = self
            .lines
            .iter()
            .filter(|l| l.tokens.first().map(String::as_str) == Some(directive))
            .cloned()
            .collect();
        Self::from_lines(lines)
    }

    /// Rewrite every argument token in place, tagging failures with the
    /// directive's position
    pub(crate) fn try_map_args<F>(mut self, mut f: F) -> Result<Self, ConfigError>
    where
        F: FnMut(&str) -> Result<String, ConfigError>,
    {
        for line in &mut self.lines {
            let Some((name, args)) = line.tokens.split_first_mut() else {
                continue;
            };
            for arg in args {
                *arg = f(arg).map_err(|e| e.at(name.as_str(), line.number))?;
            }
        }
        Ok(self)
    }

    /// Number of directive occurrences
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no directives at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

fn tokenize_line(raw: &str, number: usize) -> Result<Vec<String>, ConfigError> {
    let mut tokens = Vec::new();
    let mut chars = raw.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        match chars.peek() {
            None | Some('#') => break,
            Some('"') => {
                chars.next();
                let mut token = String::new();
                let mut closed = false;
                while let Some(c) = chars.next() {
                    match c {
                        '\\' if chars.peek() == Some(&'"') => {
                            token.push('"');
                            chars.next();
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        other => token.push(other),
                    }
                }
                if !closed {
                    return Err(ConfigError::UnterminatedQuote { line: number });
                }
                tokens.push(token);
            }
            Some(_) => {
                let mut token = String::new();
                while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                    token.push(c);
                }
                tokens.push(token);
            }
        }
    }

    Ok(tokens)
}
