use crate::lexer::{Lexer, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    Lexer::new(src)
        .tokenize()
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

#[test]
fn keywords_and_punctuation() {
    let ks = kinds("int main() { return 0; }");
    assert_eq!(
        ks,
        vec![
            TokenKind::KwInt,
            TokenKind::Ident("main".into()),
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::LBrace,
            TokenKind::KwReturn,
            TokenKind::IntLit(0),
            TokenKind::Semi,
            TokenKind::RBrace,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn two_char_operators_are_not_split() {
    let ks = kinds("a <= b && c != d");
    assert_eq!(
        ks,
        vec![
            TokenKind::Ident("a".into()),
            TokenKind::Le,
            TokenKind::Ident("b".into()),
            TokenKind::AndAnd,
            TokenKind::Ident("c".into()),
            TokenKind::Ne,
            TokenKind::Ident("d".into()),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn hex_and_octal_literals() {
    let ks = kinds("0x1F 017 0 42");
    assert_eq!(
        ks,
        vec![
            TokenKind::IntLit(31),
            TokenKind::IntLit(15),
            TokenKind::IntLit(0),
            TokenKind::IntLit(42),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn comments_are_skipped() {
    let ks = kinds("1 // trailing comment\n/* block\ncomment */ 2");
    assert_eq!(
        ks,
        vec![TokenKind::IntLit(1), TokenKind::IntLit(2), TokenKind::Eof]
    );
}

#[test]
fn unterminated_block_comment_errors() {
    let err = Lexer::new("1 /* never closed").tokenize().unwrap_err();
    assert!(matches!(err, crate::error::CompileError::Syntax { .. }));
}
