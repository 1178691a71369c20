use quarry_core::{err, stmt::Value, Result};

/// A derived-field expression over the closed projection grammar: property
/// access, arithmetic, comparison, and the conditional operator.
///
/// Expressions are parsed once per projection spec into this tagged AST and
/// interpreted per row; there is no reflection over caller types.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Dotted property access, e.g. `category.name`
    Path(Vec<String>),

    Literal(Value),

    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },

    /// `cond ? then : otherwise`
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Expr {
    /// Parse an expression string.
    pub fn parse(input: &str) -> Result<Expr> {
        let tokens = tokenize(input)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.ternary()?;
        if parser.pos != parser.tokens.len() {
            return Err(err!(
                "invalid projection expression `{input}`: unexpected trailing input"
            ));
        }
        Ok(expr)
    }

    /// The path segments when the whole expression is a bare property path.
    ///
    /// Expressions containing operators are computed from already-materialized
    /// scalars and never treated as join-requiring paths.
    pub fn as_path(&self) -> Option<&[String]> {
        match self {
            Self::Path(segments) => Some(segments),
            _ => None,
        }
    }

    /// Evaluate against a per-row scalar context.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<Value>) -> Result<Value> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Path(segments) => {
                let [name] = &segments[..] else {
                    return Err(err!(
                        "nested path `{}` cannot be used inside a computed expression",
                        segments.join(".")
                    ));
                };
                Ok(lookup(name).unwrap_or(Value::Null))
            }
            Self::Binary { op, lhs, rhs } => {
                let lhs = lhs.eval(lookup)?;
                let rhs = rhs.eval(lookup)?;
                eval_binary(*op, lhs, rhs)
            }
            Self::Ternary {
                cond,
                then,
                otherwise,
            } => match cond.eval(lookup)? {
                Value::Bool(true) => then.eval(lookup),
                // Null conditions take the else branch
                Value::Bool(false) | Value::Null => otherwise.eval(lookup),
                other => Err(err!(
                    "conditional expression requires a boolean condition, got `{other}`"
                )),
            },
        }
    }
}

fn eval_binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    use BinaryOp::*;

    match op {
        Add | Sub | Mul | Div => eval_arithmetic(op, lhs, rhs),
        Eq => Ok(Value::Bool(loose_eq(&lhs, &rhs))),
        Ne => Ok(Value::Bool(!loose_eq(&lhs, &rhs))),
        Gt | Lt | Gte | Lte => {
            // Comparisons against null are false, like SQL
            if lhs.is_null() || rhs.is_null() {
                return Ok(Value::Bool(false));
            }
            let ordering = loose_cmp(&lhs, &rhs)?;
            Ok(Value::Bool(match op {
                Gt => ordering == core::cmp::Ordering::Greater,
                Lt => ordering == core::cmp::Ordering::Less,
                Gte => ordering != core::cmp::Ordering::Less,
                Lte => ordering != core::cmp::Ordering::Greater,
                _ => unreachable!(),
            }))
        }
    }
}

/// Integer arithmetic stays integral except for division; anything involving
/// a float widens to a float. Null operands make the result null.
fn eval_arithmetic(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value> {
    use BinaryOp::*;

    if lhs.is_null() || rhs.is_null() {
        return Ok(Value::Null);
    }

    if op != Div {
        if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
            return Ok(Value::I64(match op {
                Add => a + b,
                Sub => a - b,
                Mul => a * b,
                _ => unreachable!(),
            }));
        }
    }

    let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
        return Err(err!(
            "arithmetic requires numeric operands, got `{lhs}` and `{rhs}`"
        ));
    };

    Ok(Value::F64(match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div => a / b,
        _ => unreachable!(),
    }))
}

fn loose_eq(lhs: &Value, rhs: &Value) -> bool {
    if let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) {
        return a == b;
    }
    lhs == rhs
}

fn loose_cmp(lhs: &Value, rhs: &Value) -> Result<core::cmp::Ordering> {
    if let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) {
        return a
            .partial_cmp(&b)
            .ok_or_else(|| err!("cannot order `{lhs}` against `{rhs}`"));
    }
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        return Ok(a.cmp(b));
    }
    Err(err!("cannot order `{lhs}` against `{rhs}`"))
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Op(BinaryOp),
    Question,
    Colon,
    Dot,
    OpenParen,
    CloseParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::OpenParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::CloseParen);
            }
            '?' => {
                chars.next();
                tokens.push(Token::Question);
            }
            ':' => {
                chars.next();
                tokens.push(Token::Colon);
            }
            '.' => {
                chars.next();
                tokens.push(Token::Dot);
            }
            '+' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Add));
            }
            '-' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Sub));
            }
            '*' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Mul));
            }
            '/' => {
                chars.next();
                tokens.push(Token::Op(BinaryOp::Div));
            }
            '=' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(err!("invalid expression: expected `==`"));
                }
                tokens.push(Token::Op(BinaryOp::Eq));
            }
            '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(err!("invalid expression: expected `!=`"));
                }
                tokens.push(Token::Op(BinaryOp::Ne));
            }
            '>' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Gte));
                } else {
                    tokens.push(Token::Op(BinaryOp::Gt));
                }
            }
            '<' => {
                chars.next();
                if chars.next_if_eq(&'=').is_some() {
                    tokens.push(Token::Op(BinaryOp::Lte));
                } else {
                    tokens.push(Token::Op(BinaryOp::Lt));
                }
            }
            '\'' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => text.push(c),
                        None => return Err(err!("invalid expression: unterminated string")),
                    }
                }
                tokens.push(Token::Str(text));
            }
            c if c.is_ascii_digit() => {
                let mut number = String::new();
                let mut is_float = false;
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() {
                        number.push(c);
                        chars.next();
                    } else if c == '.' {
                        // A digit must follow for this to be a decimal point
                        // rather than a path separator
                        let mut ahead = chars.clone();
                        ahead.next();
                        if ahead.peek().is_some_and(|c| c.is_ascii_digit()) {
                            is_float = true;
                            number.push('.');
                            chars.next();
                        } else {
                            break;
                        }
                    } else {
                        break;
                    }
                }
                if is_float {
                    let value = number
                        .parse()
                        .map_err(|_| err!("invalid number `{number}`"))?;
                    tokens.push(Token::Float(value));
                } else {
                    let value = number
                        .parse()
                        .map_err(|_| err!("invalid number `{number}`"))?;
                    tokens.push(Token::Int(value));
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => return Err(err!("invalid expression: unexpected `{other}`")),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: Token) -> Result<()> {
        match self.next() {
            Some(found) if found == token => Ok(()),
            found => Err(err!("invalid expression: expected {token:?}, got {found:?}")),
        }
    }

    fn ternary(&mut self) -> Result<Expr> {
        let cond = self.comparison()?;

        if self.peek() == Some(&Token::Question) {
            self.pos += 1;
            let then = self.ternary()?;
            self.expect(Token::Colon)?;
            let otherwise = self.ternary()?;
            return Ok(Expr::Ternary {
                cond: Box::new(cond),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }

        Ok(cond)
    }

    fn comparison(&mut self) -> Result<Expr> {
        let lhs = self.additive()?;

        if let Some(&Token::Op(op)) = self.peek() {
            if matches!(
                op,
                BinaryOp::Eq
                    | BinaryOp::Ne
                    | BinaryOp::Gt
                    | BinaryOp::Lt
                    | BinaryOp::Gte
                    | BinaryOp::Lte
            ) {
                self.pos += 1;
                let rhs = self.additive()?;
                return Ok(Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                });
            }
        }

        Ok(lhs)
    }

    fn additive(&mut self) -> Result<Expr> {
        let mut lhs = self.multiplicative()?;

        while let Some(&Token::Op(op)) = self.peek() {
            if !matches!(op, BinaryOp::Add | BinaryOp::Sub) {
                break;
            }
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn multiplicative(&mut self) -> Result<Expr> {
        let mut lhs = self.primary()?;

        while let Some(&Token::Op(op)) = self.peek() {
            if !matches!(op, BinaryOp::Mul | BinaryOp::Div) {
                break;
            }
            self.pos += 1;
            let rhs = self.primary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.next() {
            Some(Token::Int(value)) => Ok(Expr::Literal(Value::I64(value))),
            Some(Token::Float(value)) => Ok(Expr::Literal(Value::F64(value))),
            Some(Token::Str(value)) => Ok(Expr::Literal(Value::String(value))),
            Some(Token::Ident(ident)) => match ident.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "null" => Ok(Expr::Literal(Value::Null)),
                _ => {
                    let mut segments = vec![ident];
                    while self.peek() == Some(&Token::Dot) {
                        self.pos += 1;
                        match self.next() {
                            Some(Token::Ident(segment)) => segments.push(segment),
                            found => {
                                return Err(err!(
                                    "invalid expression: expected a path segment, got {found:?}"
                                ))
                            }
                        }
                    }
                    Ok(Expr::Path(segments))
                }
            },
            Some(Token::OpenParen) => {
                let inner = self.ternary()?;
                self.expect(Token::CloseParen)?;
                Ok(inner)
            }
            found => Err(err!("invalid expression: unexpected {found:?}")),
        }
    }
}
