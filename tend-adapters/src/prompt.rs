use async_trait::async_trait;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;

use tend_core::error::Result;
use tend_core::Prompter;

type Input = Box<dyn AsyncBufRead + Unpin + Send>;

/// Asks questions on the terminal.
///
/// One buffered reader serves every question, so answers piped in ahead of
/// time are consumed line by line.
pub struct TerminalPrompter {
    input: Mutex<Input>,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self::with_input(BufReader::new(io::stdin()))
    }

    /// Reads answers from `input` instead of standard input.
    pub fn with_input(input: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        Self {
            input: Mutex::new(Box::new(input)),
        }
    }

    /// Prints `question` and reads one line; `None` at end of input.
    async fn ask(&self, question: &str) -> Result<Option<String>> {
        let mut stdout = io::stdout();
        stdout.write_all(question.as_bytes()).await?;
        stdout.flush().await?;

        let mut input = self.input.lock().await;
        let mut answer = String::new();
        if input.read_line(&mut answer).await? == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_string()))
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn otp(&self, message: &str) -> Result<Option<String>> {
        self.ask(&format!("{}: ", message)).await
    }

    async fn confirm(&self, message: &str) -> Result<bool> {
        let answer = self.ask(&format!("{} (yes/no): ", message)).await?;
        Ok(answer.as_deref().map_or(false, is_yes))
    }
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_lowercase();
    answer == "yes" || answer == "y"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("yes"));
        assert!(is_yes(" Y "));
        assert!(!is_yes("no"));
        assert!(!is_yes(""));
        assert!(!is_yes("yess"));
    }

    #[tokio::test]
    async fn test_sequential_questions_share_piped_input() {
        let prompter = TerminalPrompter::with_input(&b"yes\n123456\n"[..]);

        assert!(prompter.confirm("Sure").await.unwrap());
        assert_eq!(
            prompter.otp("OTP").await.unwrap().as_deref(),
            Some("123456")
        );
        assert_eq!(prompter.otp("OTP").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_otp_reprompt_reads_next_line() {
        let prompter = TerminalPrompter::with_input(&b"12ab\n 654321 \n"[..]);

        assert_eq!(prompter.otp("OTP").await.unwrap().as_deref(), Some("12ab"));
        assert_eq!(
            prompter.otp("OTP").await.unwrap().as_deref(),
            Some("654321")
        );
    }

    #[tokio::test]
    async fn test_confirm_at_end_of_input_declines() {
        let prompter = TerminalPrompter::with_input(&b""[..]);
        assert!(!prompter.confirm("Sure").await.unwrap());
    }
}
