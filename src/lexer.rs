//! Splitting of input lines into classified tokens.
//!
//! A line is cut at runs of blanks; no quoting, escaping or globbing is
//! performed. Every word is then looked up, by exact match, first in the
//! keyword table (built-in commands) and then in the operator table
//! (redirections). Anything else is a literal.

use crate::command::CommandFactory;
use crate::redirect::WriteMode;
use std::fmt;

/// Upper bound on the number of tokens kept from a single line.
///
/// Words past this limit are dropped with a warning.
pub const MAX_TOKENS: usize = 128;

/// A redirection operator and the mode it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    /// `<`: read standard input from a file.
    Input,
    /// `>` (truncate) or `>>` (append): write captured output to a file.
    Output(WriteMode),
}

impl Redirect {
    pub fn symbol(self) -> &'static str {
        match self {
            Redirect::Input => "<",
            Redirect::Output(WriteMode::Truncate) => ">",
            Redirect::Output(WriteMode::Append) => ">>",
        }
    }
}

const OPERATORS: [Redirect; 3] = [
    Redirect::Input,
    Redirect::Output(WriteMode::Truncate),
    Redirect::Output(WriteMode::Append),
];

/// Classification of a word together with the handler it is bound to.
#[derive(Clone, Copy)]
pub enum TokenKind<'t> {
    /// A built-in command name.
    Keyword(&'t dyn CommandFactory),
    /// A redirection operator.
    Operator(Redirect),
    /// Anything else: program names, arguments, file names.
    Literal,
}

impl fmt::Debug for TokenKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(factory) => write!(f, "Keyword({})", factory.name()),
            TokenKind::Operator(redirect) => write!(f, "Operator({})", redirect.symbol()),
            TokenKind::Literal => f.write_str("Literal"),
        }
    }
}

impl PartialEq for TokenKind<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TokenKind::Keyword(a), TokenKind::Keyword(b)) => a.name() == b.name(),
            (TokenKind::Operator(a), TokenKind::Operator(b)) => a == b,
            (TokenKind::Literal, TokenKind::Literal) => true,
            _ => false,
        }
    }
}

/// A single word of the input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'t> {
    pub text: String,
    pub kind: TokenKind<'t>,
}

impl Token<'_> {
    pub fn is_operator(&self) -> bool {
        matches!(self.kind, TokenKind::Operator(_))
    }
}

/// The keyword and operator tables.
///
/// Built once when the interpreter starts and only read afterwards.
pub struct TokenTable {
    keywords: Vec<Box<dyn CommandFactory>>,
}

impl TokenTable {
    /// Build a table from the given keyword factories.
    ///
    /// Fails if a keyword is registered twice or collides with an operator.
    pub fn new(keywords: Vec<Box<dyn CommandFactory>>) -> anyhow::Result<Self> {
        for (i, factory) in keywords.iter().enumerate() {
            let name = factory.name();
            if OPERATORS.iter().any(|op| op.symbol() == name) {
                anyhow::bail!("keyword '{name}' collides with an operator");
            }
            if keywords[..i].iter().any(|other| other.name() == name) {
                anyhow::bail!("keyword '{name}' registered twice");
            }
        }
        Ok(Self { keywords })
    }

    /// Names of all keywords, in registration order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keywords.iter().map(|f| f.name())
    }

    /// Classify a single word.
    pub fn classify(&self, word: &str) -> TokenKind<'_> {
        if let Some(factory) = self.keywords.iter().find(|f| f.name() == word) {
            return TokenKind::Keyword(factory.as_ref());
        }
        match OPERATORS.iter().find(|op| op.symbol() == word) {
            Some(op) => TokenKind::Operator(*op),
            None => TokenKind::Literal,
        }
    }

    /// Split `line` into at most [`MAX_TOKENS`] classified tokens.
    pub fn tokenize(&self, line: &str) -> Vec<Token<'_>> {
        let mut words = line
            .split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))
            .filter(|w| !w.is_empty());

        let tokens: Vec<Token<'_>> = words
            .by_ref()
            .take(MAX_TOKENS)
            .map(|word| {
                let kind = self.classify(word);
                log::debug!("token {word:?}: {kind:?}");
                Token {
                    text: word.to_owned(),
                    kind,
                }
            })
            .collect();

        let dropped = words.count();
        if dropped > 0 {
            log::warn!("line has more than {MAX_TOKENS} words, dropped {dropped}");
        }
        tokens
    }
}

impl Default for TokenTable {
    /// The table of the shell's own built-ins.
    fn default() -> Self {
        Self {
            keywords: crate::builtin::registry(),
        }
    }
}
