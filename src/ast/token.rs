use std::fmt;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(String),
    Identifier(String),
    Operator(&'static str),
    LeftParen,
    RightParen,
    Comma,
    End,
    /// A character no token can start with.
    Unknown(char),
}

/// A single lexeme and the byte offset it starts at.
///
/// The grammar does the real tokenizing; a `Token` is only materialised to
/// describe what the parser tripped over.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

impl Token {
    /// Reads the token starting at (or after whitespace following) `position`.
    pub fn scan(input: &str, position: usize) -> Token {
        let rest = input.get(position..).unwrap_or("");
        let trimmed = rest.trim_start();
        let position = position + (rest.len() - trimmed.len());

        let mut chars = trimmed.chars();
        let kind = match chars.next() {
            None => TokenKind::End,
            Some('(') => TokenKind::LeftParen,
            Some(')') => TokenKind::RightParen,
            Some(',') => TokenKind::Comma,
            Some('*') if trimmed.starts_with("**") => TokenKind::Operator("**"),
            Some('+') => TokenKind::Operator("+"),
            Some('-') => TokenKind::Operator("-"),
            Some('*') => TokenKind::Operator("*"),
            Some('/') => TokenKind::Operator("/"),
            Some('%') => TokenKind::Operator("%"),
            Some('^') => TokenKind::Operator("^"),
            Some(c) if c.is_ascii_digit() || (c == '.' && starts_with_digit(chars.as_str())) => {
                TokenKind::Number(scan_number(trimmed).to_string())
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let end = trimmed
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(trimmed.len());
                TokenKind::Identifier(trimmed[..end].to_string())
            }
            Some(c) => TokenKind::Unknown(c),
        };

        Token { kind, position }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TokenKind::Number(text) => write!(f, "number '{}'", text),
            TokenKind::Identifier(name) => write!(f, "name '{}'", name),
            TokenKind::Operator(op) => write!(f, "operator '{}'", op),
            TokenKind::LeftParen => write!(f, "'('"),
            TokenKind::RightParen => write!(f, "')'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::End => write!(f, "end of input"),
            TokenKind::Unknown(c) => write!(f, "character '{}'", c),
        }
    }
}

/// Whether `name` could be written as an identifier in an expression.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn scan_number(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && (bytes[exp] == b'+' || bytes[exp] == b'-') {
            exp += 1;
        }
        if exp < bytes.len() && bytes[exp].is_ascii_digit() {
            while exp < bytes.len() && bytes[exp].is_ascii_digit() {
                exp += 1;
            }
            end = exp;
        }
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_skips_whitespace() {
        let token = Token::scan("2 +   foo", 3);
        assert_eq!(token.kind, TokenKind::Identifier("foo".to_string()));
        assert_eq!(token.position, 6);
    }

    #[test]
    fn test_scan_numbers() {
        assert_eq!(
            Token::scan("1.5e-3)", 0).kind,
            TokenKind::Number("1.5e-3".to_string())
        );
        assert_eq!(Token::scan(".5", 0).kind, TokenKind::Number(".5".to_string()));
        // An exponent marker without digits belongs to the next token.
        assert_eq!(Token::scan("2e", 0).kind, TokenKind::Number("2".to_string()));
    }

    #[test]
    fn test_scan_operators_and_punctuation() {
        assert_eq!(Token::scan("**2", 0).kind, TokenKind::Operator("**"));
        assert_eq!(Token::scan("*2", 0).kind, TokenKind::Operator("*"));
        assert_eq!(Token::scan(",", 0).kind, TokenKind::Comma);
        assert_eq!(Token::scan("@", 0).kind, TokenKind::Unknown('@'));
    }

    #[test]
    fn test_scan_past_end() {
        let token = Token::scan("2+", 2);
        assert_eq!(token.kind, TokenKind::End);
        assert_eq!(token.to_string(), "end of input");
        assert_eq!(Token::scan("2", 10).kind, TokenKind::End);
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("pi"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("log10"));
        assert!(!is_identifier("10log"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("a-b"));
    }
}
