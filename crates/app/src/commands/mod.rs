pub mod code;
pub mod library;
pub mod profile;
pub mod quiz;
pub mod run;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub type InputLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Map "1".."4" or "a".."d" to an option index.
pub fn parse_option(input: &str) -> Option<usize> {
    let input = input.trim().to_ascii_lowercase();
    match input.as_str() {
        "1" | "a" => Some(0),
        "2" | "b" => Some(1),
        "3" | "c" => Some(2),
        "4" | "d" => Some(3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_accept_digits_and_letters() {
        assert_eq!(parse_option(" 2 "), Some(1));
        assert_eq!(parse_option("D"), Some(3));
        assert_eq!(parse_option("5"), None);
        assert_eq!(parse_option(""), None);
    }
}
