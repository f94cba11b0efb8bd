// src/utils/args.rs

//! Quote-aware argument splitting for chat commands.

/// Split a command's argument string into tokens.
///
/// Whitespace separates tokens except inside double quotes. The quotes
/// themselves are dropped, so `mkm "Murders at Karlov Manor"` yields two
/// tokens. An explicitly quoted empty string (`""`) is kept as an empty
/// token; runs of plain whitespace never produce one.
pub fn parse_quoted_args(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut inside_quotes = false;
    let mut quoted = false;

    for c in input.chars() {
        match c {
            '"' => {
                inside_quotes = !inside_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !inside_quotes => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(parse_quoted_args("").is_empty());
        assert!(parse_quoted_args("   ").is_empty());
    }

    #[test]
    fn test_quoted_spaces() {
        assert_eq!(
            parse_quoted_args(r#"mack "Makkurosuke the Cat" 2014-03-14"#),
            vec!["mack", "Makkurosuke the Cat", "2014-03-14"]
        );
    }

    #[test]
    fn test_trailing_unquoted_tokens() {
        assert_eq!(
            parse_quoted_args(r#""A B" c d"#),
            vec!["A B", "c", "d"]
        );
    }

    #[test]
    fn test_repeated_whitespace_is_collapsed() {
        assert_eq!(parse_quoted_args("a   b\tc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_explicit_empty_quotes() {
        assert_eq!(parse_quoted_args(r#"a "" b"#), vec!["a", "", "b"]);
    }

    #[test]
    fn test_unterminated_quote_runs_to_end() {
        assert_eq!(parse_quoted_args(r#"a "b c"#), vec!["a", "b c"]);
    }
}
