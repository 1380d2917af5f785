//! Tokenizer for pipeline input.
//!
//! Splits one input line into text and stage delimiters:
//! - `~~` introduces a regex filter
//! - `~` introduces a substring filter
//! - the configured modifier character (default `$`) introduces a modifier
//!
//! `~~` is matched before `~`. Text between delimiters is trimmed and dropped
//! when empty, so `cmd ~ x` and `cmd~x` tokenize the same way.

/// The kind of stage a delimiter introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// `~pattern`: keep lines containing the pattern.
    Substring,
    /// `~~pattern`: keep lines matching the regular expression.
    Regex,
    /// `$arg`: output modifiers such as paging.
    Modifier,
}

impl StageKind {
    /// Returns the delimiter text for this stage.
    pub fn delimiter(&self, modifier: char) -> String {
        match self {
            Self::Substring => "~".to_string(),
            Self::Regex => "~~".to_string(),
            Self::Modifier => modifier.to_string(),
        }
    }
}

/// A token of a pipeline line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Trimmed, non-empty text between delimiters.
    Text(String),
    /// A stage delimiter.
    Delimiter(StageKind),
}

/// Tokenizes a pipeline line using `modifier` as the modifier delimiter.
pub fn tokenize(input: &str, modifier: char) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let kind = if c == '~' {
            if chars.peek() == Some(&'~') {
                chars.next();
                StageKind::Regex
            } else {
                StageKind::Substring
            }
        } else if c == modifier {
            StageKind::Modifier
        } else {
            text.push(c);
            continue;
        };

        flush_text(&mut text, &mut tokens);
        tokens.push(Token::Delimiter(kind));
    }
    flush_text(&mut text, &mut tokens);

    tokens
}

fn flush_text(text: &mut String, tokens: &mut Vec<Token>) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        tokens.push(Token::Text(trimmed.to_string()));
    }
    text.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Token {
        Token::Text(s.to_string())
    }

    #[test]
    fn test_plain_command() {
        assert_eq!(tokenize("sa WOLF courier", '$'), vec![text("sa WOLF courier")]);
    }

    #[test]
    fn test_substring_stage() {
        assert_eq!(
            tokenize("s ~WOLF", '$'),
            vec![text("s"), Token::Delimiter(StageKind::Substring), text("WOLF")]
        );
    }

    #[test]
    fn test_regex_before_substring() {
        assert_eq!(
            tokenize("s ~~^W", '$'),
            vec![text("s"), Token::Delimiter(StageKind::Regex), text("^W")]
        );
    }

    #[test]
    fn test_triple_tilde() {
        assert_eq!(
            tokenize("cmd ~~~x", '$'),
            vec![
                text("cmd"),
                Token::Delimiter(StageKind::Regex),
                Token::Delimiter(StageKind::Substring),
                text("x"),
            ]
        );
    }

    #[test]
    fn test_chained_stages_and_modifier() {
        assert_eq!(
            tokenize("a ~ berlin ~~ lvl [0-9] $L", '$'),
            vec![
                text("a"),
                Token::Delimiter(StageKind::Substring),
                text("berlin"),
                Token::Delimiter(StageKind::Regex),
                text("lvl [0-9]"),
                Token::Delimiter(StageKind::Modifier),
                text("L"),
            ]
        );
    }

    #[test]
    fn test_custom_modifier() {
        assert_eq!(
            tokenize("r %L $5", '%'),
            vec![
                text("r"),
                Token::Delimiter(StageKind::Modifier),
                text("L $5"),
            ]
        );
    }

    #[test]
    fn test_leading_delimiter_has_no_base() {
        assert_eq!(
            tokenize("~x", '$'),
            vec![Token::Delimiter(StageKind::Substring), text("x")]
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert!(tokenize("   ", '$').is_empty());
    }

    #[test]
    fn test_delimiter_text() {
        assert_eq!(StageKind::Substring.delimiter('$'), "~");
        assert_eq!(StageKind::Regex.delimiter('$'), "~~");
        assert_eq!(StageKind::Modifier.delimiter('%'), "%");
    }
}
