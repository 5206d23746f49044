use crate::error::{LedgerError, Result};

/// Split a command line into words with POSIX shell quoting rules.
/// A word starting with `#` comments out the rest of the line.
pub fn split_words(line: &str) -> Result<Vec<String>> {
    shlex::split(line).ok_or(LedgerError::UnterminatedQuote)
}
