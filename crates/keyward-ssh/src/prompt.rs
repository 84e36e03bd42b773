// ABOUTME: Interactive prompt abstraction used after key generation.
// ABOUTME: The CLI backs it with a terminal; tests script the answers.

use crate::error::Result;

/// Questions keyward asks the user.
pub trait Prompter {
    /// Yes/no question. `true` means yes.
    fn confirm(&mut self, message: &str) -> Result<bool>;

    /// Free-form text answer.
    fn input(&mut self, message: &str) -> Result<String>;
}

/// Answers every question with no. Useful for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Decline;

impl Prompter for Decline {
    fn confirm(&mut self, _message: &str) -> Result<bool> {
        Ok(false)
    }

    fn input(&mut self, _message: &str) -> Result<String> {
        Ok(String::new())
    }
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn confirm(&mut self, message: &str) -> Result<bool> {
        (**self).confirm(message)
    }

    fn input(&mut self, message: &str) -> Result<String> {
        (**self).input(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decline_says_no() {
        let mut prompter = Decline;
        assert!(!prompter.confirm("Add?").expect("confirm"));
        assert_eq!(prompter.input("Host").expect("input"), "");
    }

    #[test]
    fn test_boxed_prompter_delegates() {
        let mut prompter: Box<dyn Prompter> = Box::new(Decline);
        assert!(!prompter.confirm("Add?").expect("confirm"));
    }
}
