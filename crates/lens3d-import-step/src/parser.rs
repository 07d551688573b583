//! ISO 10303-21 exchange structure: instance records and their parameter lists.

use crate::error::StepError;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepValue {
    Ref(u64),
    Number(f64),
    String(String),
    /// `.T.`, `.UNSPECIFIED.` and friends, without the dots.
    Enum(String),
    List(Vec<StepValue>),
    /// A typed parameter such as `LENGTH_MEASURE(2.5)`.
    Typed(String, Vec<StepValue>),
    Unset,
    Derived,
}

impl StepValue {
    pub fn as_ref_id(&self) -> Option<u64> {
        match self {
            StepValue::Ref(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StepValue::Number(n) => Some(*n),
            StepValue::Typed(_, inner) if inner.len() == 1 => inner[0].as_number(),
            _ => None,
        }
    }

    pub fn as_numbers(&self) -> Option<Vec<f64>> {
        match self {
            StepValue::List(items) => items.iter().map(StepValue::as_number).collect(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub id: u64,
    pub type_name: String,
    pub params: Vec<StepValue>,
}

impl StepRecord {
    pub fn param(&self, index: usize) -> Option<&StepValue> {
        self.params.get(index)
    }
}

/// Type name used for complex (multi-type) instances like `#5 = (A() B());`.
pub const COMPLEX_TYPE: &str = "(complex)";

#[derive(Debug, Clone, Default)]
pub struct StepFile {
    pub records: BTreeMap<u64, StepRecord>,
    /// Statement count per type, complex instances included.
    counts: BTreeMap<String, usize>,
}

impl StepFile {
    pub fn get(&self, id: u64) -> Option<&StepRecord> {
        self.records.get(&id)
    }

    pub fn len(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn type_counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Records of one type, ascending by id.
    pub fn of_type<'a>(&'a self, type_name: &'a str) -> impl Iterator<Item = &'a StepRecord> + 'a {
        self.records.values().filter(move |r| r.type_name == type_name)
    }
}

fn simple_record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^#(\d+)\s*=\s*([A-Za-z][A-Za-z0-9_]*)\s*\((.*)\)$")
            .expect("invalid record regex")
    })
}

fn complex_record_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^#(\d+)\s*=\s*\(")
            .expect("invalid record regex")
    })
}

/// Parse the instance records of a STEP file. Header statements are ignored.
pub fn parse_step(text: &str) -> Result<StepFile, StepError> {
    let mut file = StepFile::default();
    for statement in split_statements(text)? {
        if let Some(caps) = simple_record_re().captures(&statement) {
            let id = parse_id(&caps[1])?;
            let type_name = caps[2].to_ascii_uppercase();
            let params = ParamParser::new(&caps[3])
                .parse_all()
                .map_err(|message| StepError::Syntax { id, message })?;
            if file.records.contains_key(&id) {
                return Err(StepError::DuplicateId(id));
            }
            *file.counts.entry(type_name.clone()).or_default() += 1;
            file.records.insert(
                id,
                StepRecord {
                    id,
                    type_name,
                    params,
                },
            );
        } else if let Some(caps) = complex_record_re().captures(&statement) {
            let id = parse_id(&caps[1])?;
            tracing::debug!(id, "skipping complex instance");
            *file.counts.entry(COMPLEX_TYPE.to_string()).or_default() += 1;
        }
    }
    Ok(file)
}

fn parse_id(digits: &str) -> Result<u64, StepError> {
    digits.parse().map_err(|_| StepError::Syntax {
        id: 0,
        message: format!("instance id out of range: {digits}"),
    })
}

/// Split on `;` outside strings and comments. Statements are trimmed and comment-free.
fn split_statements(text: &str) -> Result<Vec<String>, StepError> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                current.push(c);
                loop {
                    match chars.next() {
                        Some('\'') if chars.peek() == Some(&'\'') => {
                            current.push_str("''");
                            chars.next();
                        }
                        Some('\'') => {
                            current.push('\'');
                            break;
                        }
                        Some(other) => current.push(other),
                        None => return Err(StepError::Unterminated { what: "string" }),
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                loop {
                    match chars.next() {
                        Some('/') if prev == '*' => break,
                        Some(other) => prev = other,
                        None => return Err(StepError::Unterminated { what: "comment" }),
                    }
                }
            }
            ';' => {
                let stmt = current.trim();
                if !stmt.is_empty() {
                    statements.push(stmt.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    if current.trim_start().starts_with('#') {
        return Err(StepError::Unterminated { what: "record" });
    }
    Ok(statements)
}

struct ParamParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> ParamParser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn parse_all(mut self) -> Result<Vec<StepValue>, String> {
        let values = self.parse_sequence()?;
        self.skip_ws();
        if self.pos < self.src.len() {
            return Err(format!("unexpected input at offset {}", self.pos));
        }
        Ok(values)
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&f) {
            self.bump();
        }
        &self.src[start..self.pos]
    }

    /// Comma-separated values up to (not including) a closing `)` or the end.
    fn parse_sequence(&mut self) -> Result<Vec<StepValue>, String> {
        let mut values = Vec::new();
        self.skip_ws();
        if matches!(self.peek(), None | Some(')')) {
            return Ok(values);
        }
        loop {
            values.push(self.parse_value()?);
            self.skip_ws();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                None | Some(')') => return Ok(values),
                Some(c) => return Err(format!("expected ',' but found '{c}'")),
            }
        }
    }

    fn parse_parenthesized(&mut self) -> Result<Vec<StepValue>, String> {
        // caller has consumed '('
        let values = self.parse_sequence()?;
        match self.bump() {
            Some(')') => Ok(values),
            _ => Err("missing ')'".to_string()),
        }
    }

    fn parse_value(&mut self) -> Result<StepValue, String> {
        self.skip_ws();
        let Some(c) = self.peek() else {
            return Err("unexpected end of parameters".to_string());
        };
        match c {
            '#' => {
                self.bump();
                let digits = self.take_while(|c| c.is_ascii_digit());
                digits
                    .parse()
                    .map(StepValue::Ref)
                    .map_err(|_| format!("bad reference '#{digits}'"))
            }
            '\'' => self.parse_string(),
            '$' => {
                self.bump();
                Ok(StepValue::Unset)
            }
            '*' => {
                self.bump();
                Ok(StepValue::Derived)
            }
            '(' => {
                self.bump();
                Ok(StepValue::List(self.parse_parenthesized()?))
            }
            '.' => {
                self.bump();
                let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                match self.bump() {
                    Some('.') if !name.is_empty() => Ok(StepValue::Enum(name.to_string())),
                    _ => Err(format!("bad enumeration '.{name}'")),
                }
            }
            c if c.is_ascii_alphabetic() => {
                let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
                self.skip_ws();
                if self.bump() != Some('(') {
                    return Err(format!("expected '(' after '{name}'"));
                }
                Ok(StepValue::Typed(
                    name.to_ascii_uppercase(),
                    self.parse_parenthesized()?,
                ))
            }
            c if c.is_ascii_digit() || c == '-' || c == '+' => {
                let text = self.take_while(|c| {
                    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
                });
                text.parse()
                    .map(StepValue::Number)
                    .map_err(|_| format!("bad number '{text}'"))
            }
            other => Err(format!("unexpected '{other}'")),
        }
    }

    fn parse_string(&mut self) -> Result<StepValue, String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('\'') if self.peek() == Some('\'') => {
                    self.bump();
                    out.push('\'');
                }
                Some('\'') => return Ok(StepValue::String(out)),
                Some(c) => out.push(c),
                None => return Err("unterminated string".to_string()),
            }
        }
    }
}
