use super::*;

// === Reserved keyword tests ===

#[test]
fn control_flow_keywords() {
    assert_eq!(lookup("if"), Some(TokenKind::If));
    assert_eq!(lookup("else"), Some(TokenKind::Else));
    assert_eq!(lookup("while"), Some(TokenKind::While));
    assert_eq!(lookup("for"), Some(TokenKind::For));
    assert_eq!(lookup("break"), Some(TokenKind::Break));
    assert_eq!(lookup("continue"), Some(TokenKind::Continue));
    assert_eq!(lookup("return"), Some(TokenKind::Return));
}

#[test]
fn declaration_keywords() {
    assert_eq!(lookup("func"), Some(TokenKind::Func));
    assert_eq!(lookup("var"), Some(TokenKind::Var));
    assert_eq!(lookup("managed"), Some(TokenKind::Managed));
    assert_eq!(lookup("class"), Some(TokenKind::Class));
    assert_eq!(lookup("new"), Some(TokenKind::New));
}

#[test]
fn value_keywords() {
    assert_eq!(lookup("true"), Some(TokenKind::True));
    assert_eq!(lookup("false"), Some(TokenKind::False));
    assert_eq!(lookup("null"), Some(TokenKind::Null));
    assert_eq!(lookup("is"), Some(TokenKind::Is));
}

// === Non-keyword tests ===

#[test]
fn identifiers_are_not_keywords() {
    assert_eq!(lookup("x"), None);
    assert_eq!(lookup("main"), None);
    assert_eq!(lookup("iff"), None);
    assert_eq!(lookup("function"), None);
    assert_eq!(lookup("continues"), None);
    assert_eq!(lookup(""), None);
}

#[test]
fn keywords_are_case_sensitive() {
    assert_eq!(lookup("If"), None);
    assert_eq!(lookup("NULL"), None);
    assert_eq!(lookup("Class"), None);
}
