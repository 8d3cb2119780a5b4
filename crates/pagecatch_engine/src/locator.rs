//! XPath location paths evaluated through CSS selectors.
//!
//! Supported: absolute and relative paths over the child (`/`) and
//! descendant (`//`) steps, `*` and element name tests, and predicates made
//! of positions (`[2]`, `[last()]`) and attribute tests (`@a`, `@a='v'`,
//! `contains(@a,'v')`, `starts-with(@a,'v')`) joined with `and`. A wrapping
//! `( ... )[1]` and a trailing `/text()` or `/node()` are accepted because the
//! first matching element is used either way. Relative paths (`./`, `.//`)
//! are evaluated from the root element.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XPathError {
    #[error("empty xpath expression")]
    Empty,
    #[error("unsupported xpath at offset {offset}: {found:?}")]
    Unsupported { offset: usize, found: String },
    #[error("unterminated string literal at offset {0}")]
    UnterminatedLiteral(usize),
}

/// Locators starting with `/`, `./` or `(` are XPath; anything else is CSS.
pub fn looks_like_xpath(locator: &str) -> bool {
    let locator = locator.trim_start();
    locator.starts_with('/') || locator.starts_with("./") || locator.starts_with('(')
}

/// Rewrite an XPath location path as an equivalent CSS selector.
pub fn xpath_to_css(expr: &str) -> Result<String, XPathError> {
    let mut path = expr.trim();
    if let Some(inner) = strip_first_of_group(path) {
        path = inner;
    }
    // Relative paths start at the root element.
    let relative = !path.starts_with('/');
    if let Some(rest) = path.strip_prefix('.') {
        if rest.starts_with('/') {
            path = rest;
        }
    }
    for suffix in ["/text()", "/node()"] {
        if let Some(rest) = path.strip_suffix(suffix) {
            path = rest;
        }
    }
    if path.is_empty() {
        return Err(XPathError::Empty);
    }

    let mut cursor = Cursor::new(path);
    let mut css = String::new();
    let mut first = true;
    loop {
        cursor.skip_ws();
        if cursor.at_end() {
            break;
        }
        let child = if cursor.eat("//") {
            false
        } else if cursor.eat("/") {
            true
        } else if first {
            true
        } else {
            return Err(cursor.unsupported());
        };

        let step = parse_step(&mut cursor)?;
        if first && relative {
            css.push_str(if child { ":root > " } else { ":root " });
            css.push_str(&step);
        } else if first {
            css.push_str(&step);
            if child {
                css.push_str(":root");
            }
        } else {
            css.push_str(if child { " > " } else { " " });
            css.push_str(&step);
        }
        first = false;
    }

    if css.is_empty() {
        return Err(XPathError::Empty);
    }
    Ok(css)
}

/// `(path)` or `(path)[1]` -> `path`.
fn strip_first_of_group(expr: &str) -> Option<&str> {
    let rest = expr.strip_prefix('(')?;
    let close = rest.rfind(')')?;
    let tail = rest[close + 1..].trim();
    if tail.is_empty() || tail == "[1]" {
        Some(rest[..close].trim())
    } else {
        None
    }
}

fn parse_step(cursor: &mut Cursor<'_>) -> Result<String, XPathError> {
    cursor.skip_ws();
    cursor.eat("child::");
    let name = if cursor.eat("*") {
        None
    } else {
        match cursor.name() {
            Some(name) => Some(name.to_ascii_lowercase()),
            None => return Err(cursor.unsupported()),
        }
    };
    if cursor.peek() == Some(':') || cursor.peek() == Some('(') {
        return Err(cursor.unsupported());
    }

    let mut attributes = String::new();
    let mut position = String::new();
    let mut filtered = false;
    while {
        cursor.skip_ws();
        cursor.eat("[")
    } {
        loop {
            cursor.skip_ws();
            if let Some(index) = cursor.number() {
                if filtered || !position.is_empty() || index == 0 {
                    return Err(cursor.unsupported());
                }
                position = match name {
                    Some(_) => format!(":nth-of-type({index})"),
                    None => format!(":nth-child({index})"),
                };
            } else if cursor.eat("last()") {
                if filtered || !position.is_empty() {
                    return Err(cursor.unsupported());
                }
                position = match name {
                    Some(_) => ":last-of-type".to_string(),
                    None => ":last-child".to_string(),
                };
            } else {
                attributes.push_str(&parse_attribute_test(cursor)?);
            }

            cursor.skip_ws();
            if cursor.eat("and") {
                continue;
            }
            if cursor.eat("]") {
                break;
            }
            return Err(cursor.unsupported());
        }
        filtered = !attributes.is_empty();
    }

    let mut step = name.unwrap_or_else(|| "*".to_string());
    step.push_str(&attributes);
    step.push_str(&position);
    Ok(step)
}

fn parse_attribute_test(cursor: &mut Cursor<'_>) -> Result<String, XPathError> {
    let operator = if cursor.eat("contains(") {
        Some("*=")
    } else if cursor.eat("starts-with(") {
        Some("^=")
    } else {
        None
    };

    cursor.skip_ws();
    if !cursor.eat("@") {
        return Err(cursor.unsupported());
    }
    let attr = cursor.name().ok_or_else(|| cursor.unsupported())?;

    match operator {
        Some(operator) => {
            cursor.skip_ws();
            if !cursor.eat(",") {
                return Err(cursor.unsupported());
            }
            cursor.skip_ws();
            let value = cursor.literal()?;
            cursor.skip_ws();
            if !cursor.eat(")") {
                return Err(cursor.unsupported());
            }
            Ok(format!("[{attr}{operator}{}]", css_string(&value)))
        }
        None => {
            cursor.skip_ws();
            if cursor.eat("!=") {
                return Err(cursor.unsupported());
            }
            if !cursor.eat("=") {
                return Ok(format!("[{attr}]"));
            }
            cursor.skip_ws();
            let value = cursor.literal()?;
            Ok(format!("[{attr}={}]", css_string(&value)))
        }
    }
}

fn css_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.src.len() - trimmed.len();
    }

    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, c)| !accept(c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// Name test: `[A-Za-z_][A-Za-z0-9_-]*`.
    fn name(&mut self) -> Option<&'a str> {
        let first = self.peek()?;
        if !(first.is_ascii_alphabetic() || first == '_') {
            return None;
        }
        Some(self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')))
    }

    fn number(&mut self) -> Option<u32> {
        let start = self.pos;
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return None;
        }
        match digits.parse() {
            Ok(n) => Some(n),
            Err(_) => {
                self.pos = start;
                None
            }
        }
    }

    fn literal(&mut self) -> Result<String, XPathError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.unsupported()),
        };
        self.pos += 1;
        let body = self.rest();
        match body.find(quote) {
            Some(end) => {
                self.pos += end + 1;
                Ok(body[..end].to_string())
            }
            None => Err(XPathError::UnterminatedLiteral(start)),
        }
    }

    fn unsupported(&self) -> XPathError {
        XPathError::Unsupported {
            offset: self.pos,
            found: self.rest().chars().take(16).collect(),
        }
    }
}
