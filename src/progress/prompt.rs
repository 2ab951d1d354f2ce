//! Interactive confirmation

use std::io::{self, BufRead, Write};

/// Text shown before reading the answer
pub const CONFIRM_PROMPT: &str = "enter \"y\" to confirm: ";

/// Ask for confirmation; only the literal answer `y` confirms
///
/// The first whitespace-separated word of the answer line is compared, so
/// `y` followed by a newline confirms while `yes`, `Y` or an empty line do not.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "{}", CONFIRM_PROMPT)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.split_whitespace().next() == Some("y"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(text: &str) -> (bool, String) {
        let mut out = Vec::new();
        let confirmed = confirm(text.as_bytes(), &mut out).unwrap();
        (confirmed, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_y_confirms() {
        let (confirmed, prompt) = answer("y\n");
        assert!(confirmed);
        assert_eq!(prompt, CONFIRM_PROMPT);
        assert!(answer("  y  \n").0);
    }

    #[test]
    fn test_anything_else_declines() {
        for text in ["n\n", "yes\n", "Y\n", "\n", ""] {
            assert!(!answer(text).0, "{:?} should decline", text);
        }
    }
}
