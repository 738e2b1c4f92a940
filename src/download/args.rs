//! Splitting of the free-form YTDL_EXTRA_ARGS string into argv tokens.
//!
//! Tokens are separated by whitespace. Single- or double-quoted segments keep
//! embedded spaces and the quotes themselves are dropped. No other shell syntax
//! (escapes, variables, globs) is interpreted.

/// Tokenizes a raw flag string.
///
/// An unterminated quote runs to the end of the input.
///
/// # Examples
/// ```
/// use vidrelay::download::args::tokenize_args;
///
/// assert_eq!(
///     tokenize_args(r#"--proxy http://p:8080 --user-agent 'Mozilla 5.0'"#),
///     vec!["--proxy", "http://p:8080", "--user-agent", "Mozilla 5.0"]
/// );
/// ```
pub fn tokenize_args(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '\'' || c == '"' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        tokens.push(current);
    }

    tokens
}
