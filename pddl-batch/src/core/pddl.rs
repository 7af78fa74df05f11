//! Structural view of PDDL problem text.
//!
//! Only enough of the s-expression syntax is understood to answer two
//! questions about a problem file: which keywords head a list, and which
//! symbols occur anywhere. Matching is ASCII case-insensitive because PDDL
//! identifiers are. Unbalanced parentheses are tolerated.

/// A lexical token of PDDL text. Comments and whitespace are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    Open,
    Close,
    Symbol(&'a str),
}

/// Split PDDL text into tokens.
///
/// `;` starts a comment running to the end of the line.
pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            ';' => {
                for (_, next) in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            ch if ch.is_whitespace() => {}
            _ => {
                let mut end = start + ch.len_utf8();
                while let Some(&(idx, next)) = chars.peek() {
                    if next.is_whitespace() || matches!(next, '(' | ')' | ';') {
                        break;
                    }
                    end = idx + next.len_utf8();
                    chars.next();
                }
                tokens.push(Token::Symbol(&text[start..end]));
            }
        }
    }

    tokens
}

/// Tokenized problem text with structural queries.
#[derive(Debug, Clone)]
pub struct ProblemText<'a> {
    tokens: Vec<Token<'a>>,
}

impl<'a> ProblemText<'a> {
    pub fn parse(text: &'a str) -> Self {
        Self {
            tokens: tokenize(text),
        }
    }

    /// Symbols that directly follow an opening parenthesis, in document order.
    pub fn list_heads(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.windows(2).filter_map(|pair| match pair {
            [Token::Open, Token::Symbol(head)] => Some(*head),
            _ => None,
        })
    }

    /// Every symbol in document order.
    pub fn symbols(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            Token::Symbol(symbol) => Some(*symbol),
            _ => None,
        })
    }

    /// True when some list is headed by `keyword`, e.g. `(forall ...)`.
    pub fn has_list_head(&self, keyword: &str) -> bool {
        self.list_heads()
            .any(|head| head.eq_ignore_ascii_case(keyword))
    }

    /// True when `symbol` occurs as a whole token anywhere in the text.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols()
            .any(|candidate| candidate.eq_ignore_ascii_case(symbol))
    }
}
