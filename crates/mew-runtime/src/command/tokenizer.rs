//! Command line tokenizer.
//!
//! - Space, tab and newline separate tokens unless inside double quotes.
//!   Other whitespace (`\r`, no-break space) is ordinary token text.
//! - A double quote toggles quoted mode and ends the current token.
//! - A backslash escapes `"`, a space, or another backslash; before any
//!   other character it is kept literally along with that character.
//! - Empty tokens are never produced.

/// Splits a raw command line into tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(next) => {
                    if !matches!(next, '"' | ' ' | '\\') {
                        current.push('\\');
                    }
                    current.push(next);
                }
                // A trailing backslash has nothing to escape.
                None => current.push('\\'),
            },
            '"' => {
                quoted = !quoted;
                flush(&mut current, &mut tokens);
            }
            c if is_separator(c) && !quoted => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }

    flush(&mut current, &mut tokens);
    tokens
}

fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Quotes a single token so that [`tokenize`] reads it back unchanged.
pub fn quote(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    for c in token.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    if token.chars().any(is_separator) {
        format!("\"{escaped}\"")
    } else {
        escaped
    }
}

/// Joins tokens into a line that tokenizes back to the same tokens.
pub fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(tokenize("login ptc user pass"), ["login", "ptc", "user", "pass"]);
    }

    #[test]
    fn test_quoted_phrase() {
        assert_eq!(tokenize(r#"find "poke stop" 5"#), ["find", "poke stop", "5"]);
    }

    #[test]
    fn test_escaped_backslash() {
        assert_eq!(tokenize(r"a\\b"), [r"a\b"]);
    }

    #[test]
    fn test_escaped_space_and_quote() {
        assert_eq!(tokenize(r"poke\ stop"), ["poke stop"]);
        assert_eq!(tokenize(r#"say \"hi\""#), ["say", "\"hi\""]);
    }

    #[test]
    fn test_unknown_escape_is_literal() {
        assert_eq!(tokenize(r"C:\temp"), [r"C:\temp"]);
    }

    #[test]
    fn test_trailing_backslash_is_kept() {
        assert_eq!(tokenize(r"dir\"), [r"dir\"]);
    }

    #[test]
    fn test_whitespace_only_yields_nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \t ").is_empty());
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(tokenize("  a   b  "), ["a", "b"]);
    }

    #[test]
    fn test_quoted_whitespace_is_kept() {
        assert_eq!(tokenize(r#""  a  ""#), ["  a  "]);
    }

    #[test]
    fn test_empty_quotes_produce_no_token() {
        assert_eq!(tokenize(r#"say """#), ["say"]);
    }

    #[test]
    fn test_quote_splits_adjacent_text() {
        assert_eq!(tokenize(r#"ab"cd"ef"#), ["ab", "cd", "ef"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(tokenize(r#"say "hello there"#), ["say", "hello there"]);
    }

    #[test]
    fn test_rejoined_plain_line_is_stable() {
        let tokens = tokenize("  evolve   pidgey  3 ");
        assert_eq!(tokenize(&tokens.join(" ")), tokens);
    }

    #[test]
    fn test_join_round_trips_special_tokens() {
        let tokens = vec![
            "find".to_string(),
            "poke stop".to_string(),
            r"back\slash".to_string(),
            "\"quoted\"".to_string(),
            "tab\there".to_string(),
        ];
        assert_eq!(tokenize(&join(&tokens)), tokens);
    }

    #[test]
    fn test_only_space_tab_newline_separate() {
        assert_eq!(tokenize("a\tb\nc d"), ["a", "b", "c", "d"]);
        assert_eq!(tokenize("login\r"), ["login\r"]);
        assert_eq!(tokenize("a\u{A0}b"), ["a\u{A0}b"]);
        assert_eq!(tokenize("a\u{0C}b"), ["a\u{0C}b"]);
    }

    #[test]
    fn test_join_keeps_other_whitespace_unquoted() {
        assert_eq!(quote("a\u{A0}b"), "a\u{A0}b");
        let tokens = vec!["cr\r".to_string(), "nb\u{A0}sp".to_string()];
        assert_eq!(tokenize(&join(&tokens)), tokens);
    }
}
