//! Lexical analysis: turns source text into a flat token stream.
//!
//! Source is cut into chunks first (whitespace separated, with operators and
//! delimiters split off), then every chunk is classified against the literal
//! patterns before the reserved-word table is consulted.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::LexError;
use crate::token::{Pos, Token, TokenKind};

/// Operators that must win over their one-character prefix.
const TWO_CHAR_OPERATORS: [&str; 6] = ["==", "!=", "<=", ">=", "&&", "||"];

struct Patterns {
    int: Regex,
    double: Regex,
    string: Regex,
    boolean: Regex,
    identifier: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        int: Regex::new(r"^\d+$").expect("int pattern"),
        double: Regex::new(r"^\d+\.\d+$").expect("double pattern"),
        string: Regex::new(r#"^"([^"\\]|\\.)*"$"#).expect("string pattern"),
        boolean: Regex::new(r"^(true|false)$").expect("bool pattern"),
        identifier: Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("identifier pattern"),
    })
}

/// Classify one chunk. Literal patterns are tried before the reserved table,
/// and a chunk is only an identifier when the table does not know it.
pub fn classify(chunk: &str) -> TokenKind {
    let p = patterns();
    if p.int.is_match(chunk) {
        TokenKind::IntLit
    } else if p.double.is_match(chunk) {
        TokenKind::DoubleLit
    } else if p.string.is_match(chunk) {
        TokenKind::StrLit
    } else if p.boolean.is_match(chunk) {
        TokenKind::BoolLit
    } else if let Some(kind) = TokenKind::reserved(chunk) {
        kind
    } else if p.identifier.is_match(chunk) {
        TokenKind::Identifier
    } else {
        TokenKind::Unknown
    }
}

/// Lex the whole source into tokens terminated by a single `Eof` token.
///
/// Unrecognised characters become `Unknown` tokens and are left for the parser
/// to reject; only an unterminated string literal fails here.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut eof = Pos::new(1, 1);

    for (index, line) in source.lines().enumerate() {
        let line_no = index + 1;
        let chars: Vec<char> = line.chars().collect();
        eof = Pos::new(line_no, chars.len() + 1);

        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            // comment runs to the end of the line
            if c == '#' {
                break;
            }

            let start = i;
            let pos = Pos::new(line_no, start + 1);
            if c == '"' {
                i = scan_string(&chars, i).ok_or(LexError::UnterminatedString { pos })?;
            } else if is_word_char(c) {
                i = scan_word(&chars, i);
            } else if let Some(op) = TWO_CHAR_OPERATORS
                .iter()
                .find(|op| line_matches(&chars, i, op))
            {
                i += op.len();
            } else {
                i += 1;
            }

            let lexeme: String = chars[start..i].iter().collect();
            tokens.push(Token::new(classify(&lexeme), lexeme, pos));
        }
    }

    tokens.push(Token::new(TokenKind::Eof, "", eof));
    debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Returns the index just past the closing quote, or `None` when the line ends
/// first.
fn scan_string(chars: &[char], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '"' => return Some(i + 1),
            _ => i += 1,
        }
    }
    None
}

/// A run of word characters; a pure digit run may take one `.digits` fraction.
fn scan_word(chars: &[char], start: usize) -> usize {
    let mut i = start;
    while i < chars.len() && is_word_char(chars[i]) {
        i += 1;
    }
    let all_digits = chars[start..i].iter().all(|c| c.is_ascii_digit());
    if all_digits
        && i + 1 < chars.len()
        && chars[i] == '.'
        && chars[i + 1].is_ascii_digit()
    {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    i
}

fn line_matches(chars: &[char], at: usize, op: &str) -> bool {
    op.chars()
        .enumerate()
        .all(|(offset, expected)| chars.get(at + offset) == Some(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn two_char_operators_are_greedy() {
        assert_eq!(kinds("a<=b"), vec![
            TokenKind::Identifier,
            TokenKind::Leq,
            TokenKind::Identifier,
            TokenKind::Eof
        ]);
        assert_eq!(kinds("< ="), vec![TokenKind::Lt, TokenKind::Assign, TokenKind::Eof]);
        assert_eq!(kinds("==!=>=&&||!"), vec![
            TokenKind::Eq,
            TokenKind::Neq,
            TokenKind::Geq,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn literals_win_over_the_reserved_table() {
        assert_eq!(classify("true"), TokenKind::BoolLit);
        assert_eq!(classify("false"), TokenKind::BoolLit);
        assert_eq!(classify("42"), TokenKind::IntLit);
        assert_eq!(classify("4.25"), TokenKind::DoubleLit);
        assert_eq!(classify(r#""a \"b\"""#), TokenKind::StrLit);
        assert_eq!(classify("sin"), TokenKind::Sin);
        assert_eq!(classify("int"), TokenKind::KwInt);
        assert_eq!(classify("e"), TokenKind::Euler);
        assert_eq!(classify("sine"), TokenKind::Identifier);
        assert_eq!(classify("x_1"), TokenKind::Identifier);
        assert_eq!(classify("_x"), TokenKind::Unknown);
        assert_eq!(classify("12ab"), TokenKind::Unknown);
        assert_eq!(classify("@"), TokenKind::Unknown);
    }

    #[test]
    fn single_ampersand_and_pipe_are_unknown() {
        assert_eq!(kinds("& |"), vec![TokenKind::Unknown, TokenKind::Unknown, TokenKind::Eof]);
    }

    #[test]
    fn comments_discard_the_rest_of_the_line() {
        let tokens = tokenize("int x = 1; # x = 2;\nprint x;").expect("tokenize");
        let lexemes: Vec<&str> = tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["int", "x", "=", "1", ";", "print", "x", ";", ""]);
    }

    #[test]
    fn hash_inside_string_is_not_a_comment() {
        let tokens = tokenize(r#"print "a # b";"#).expect("tokenize");
        assert_eq!(tokens[1].kind, TokenKind::StrLit);
        assert_eq!(tokens[1].lexeme, r#""a # b""#);
        assert_eq!(tokens[2].kind, TokenKind::Semicolon);
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let err = tokenize("string s = \"abc;\nprint s;").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { pos: Pos::new(1, 12) });

        // an escaped quote does not close the literal
        assert!(tokenize(r#"print "abc\";"#).is_err());
    }

    #[test]
    fn positions_are_one_based() {
        let tokens = tokenize("int x;\n  x = 2.5;").expect("tokenize");
        assert_eq!(tokens[0].pos, Pos::new(1, 1));
        assert_eq!(tokens[1].pos, Pos::new(1, 5));
        assert_eq!(tokens[3].pos, Pos::new(2, 3));
        assert_eq!(tokens[5].kind, TokenKind::DoubleLit);
        assert_eq!(tokens[5].pos, Pos::new(2, 7));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn dot_after_identifier_is_a_delimiter() {
        assert_eq!(kinds("a.b 1."), vec![
            TokenKind::Identifier,
            TokenKind::Dot,
            TokenKind::Identifier,
            TokenKind::IntLit,
            TokenKind::Dot,
            TokenKind::Eof
        ]);
    }

    #[test]
    fn lexemes_reproduce_significant_source() {
        let src = "int x = 5; # five\n{ double y=x*2.0; if(y>=1.5){print \"big\";} }\n";
        let joined: String = tokenize(src)
            .expect("tokenize")
            .iter()
            .map(|t| t.lexeme.as_str())
            .collect();
        let expected: String = src
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(|line| line.split_whitespace())
            .collect();
        assert_eq!(joined, expected);
    }
}
