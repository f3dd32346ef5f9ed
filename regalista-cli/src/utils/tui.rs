use indicatif::{ProgressBar, ProgressStyle};

pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["-", "\\", "|", "/"])
        .template("{msg} {spinner}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Split a shell line into words, honouring single and double quotes.
pub fn split_words(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err("Unterminated quote".to_string());
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain_words() {
        assert_eq!(split_words("gift add Ana Libro").unwrap(), ["gift", "add", "Ana", "Libro"]);
    }

    #[test]
    fn test_split_quoted_words() {
        assert_eq!(
            split_words(r#"add "Ana María" --day 3 --month 'mayo'"#).unwrap(),
            ["add", "Ana María", "--day", "3", "--month", "mayo"]
        );
    }

    #[test]
    fn test_split_empty_quotes_is_a_word() {
        assert_eq!(split_words(r#"gift edit Ana Libro --description """#).unwrap().len(), 6);
    }

    #[test]
    fn test_split_unterminated_quote() {
        assert!(split_words("add \"Ana").is_err());
    }
}
