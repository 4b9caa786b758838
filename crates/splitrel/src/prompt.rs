//! Operator prompts.
//!
//! Every question the release workflow asks goes through [`Prompter`], so a
//! run can be driven from a terminal or from a scripted answer stream.

use std::io::{BufRead, Write};

pub trait Prompter {
    /// Ask for free text. Blank input or end of input yields `default`.
    fn ask_text(&mut self, question: &str, default: Option<&str>) -> Option<String>;

    /// Ask a yes/no question. Blank input or end of input yields `default`.
    fn ask_bool(&mut self, question: &str, default: bool) -> bool;
}

/// Line-oriented prompter: writes the question to `output`, reads one line
/// of `input` per answer.
///
/// When `input` is exhausted every question takes its default, so an
/// unattended run never confirms a warning.
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    fn read_answer(&mut self, question: &str) -> Option<String> {
        // A broken output stream must not stop the read.
        let _ = write!(self.output, "{question} ");
        let _ = self.output.flush();

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => {
                let _ = writeln!(self.output);
                None
            }
            Ok(_) => {
                let answer = line.trim();
                (!answer.is_empty()).then(|| answer.to_string())
            }
        }
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask_text(&mut self, question: &str, default: Option<&str>) -> Option<String> {
        self.read_answer(question)
            .or_else(|| default.map(str::to_string))
    }

    fn ask_bool(&mut self, question: &str, default: bool) -> bool {
        let hint = if default { "(Y/n)?" } else { "(y/N)?" };
        match self.read_answer(&format!("{question} {hint}")) {
            Some(answer) => answer.to_ascii_lowercase().starts_with('y'),
            None => default,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn text_answers_are_trimmed() {
        let mut p = prompter("  1.3.0 \n");
        assert_eq!(p.ask_text("Version:", None).as_deref(), Some("1.3.0"));
        assert_eq!(String::from_utf8_lossy(p.output()), "Version: ");
    }

    #[test]
    fn blank_text_uses_default() {
        let mut p = prompter("\n\n");
        assert_eq!(p.ask_text("Version:", None), None);
        assert_eq!(p.ask_text("Branch:", Some("main")).as_deref(), Some("main"));
    }

    #[test]
    fn eof_uses_default() {
        let mut p = prompter("");
        assert_eq!(p.ask_text("Version:", None), None);
        assert!(p.ask_bool("Latest", true));
        assert!(!p.ask_bool("Continue", false));
    }

    #[test]
    fn bool_answers() {
        let mut p = prompter("y\nNo\nYES\nmaybe\n\n");
        assert!(p.ask_bool("a", false));
        assert!(!p.ask_bool("b", true));
        assert!(p.ask_bool("c", false));
        assert!(!p.ask_bool("d", true));
        assert!(p.ask_bool("e", true));
    }

    #[test]
    fn bool_hint_reflects_default() {
        let mut p = prompter("\n\n");
        p.ask_bool("Make this the latest release", true);
        p.ask_bool("Mark as draft", false);
        assert_eq!(
            String::from_utf8_lossy(p.output()),
            "Make this the latest release (Y/n)? Mark as draft (y/N)? "
        );
    }
}
