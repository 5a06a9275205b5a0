//! # Shell Completion Module
//!
//! Completion scripts through clap_complete, plus the word list behind the
//! hidden `complete-titles` command.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! sonograph completion bash > ~/.local/share/bash-completion/completions/sonograph
//!
//! # Generate zsh completions
//! sonograph completion zsh > ~/.config/zsh/completions/_sonograph
//! ```

use crate::cli::Shell;
use crate::engine::RecommendationEngine;
use anyhow::{Context, Result};
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use std::io::{self, Write};

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

/// Convert our Shell enum to clap_complete's Shell enum
#[must_use]
pub const fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Quotes a completion word containing whitespace.
#[must_use]
pub fn quote_completion(word: &str) -> String {
    if word.contains(char::is_whitespace) {
        format!("\"{}\"", word.replace('"', "\\\""))
    } else {
        word.to_string()
    }
}

/// Writes one quoted completion per line.
///
/// # Errors
///
/// Fails when `out` cannot be written.
pub fn write_completions<W: Write>(words: &[String], out: &mut W) -> Result<()> {
    for word in words {
        writeln!(out, "{}", quote_completion(word)).context("Failed to write completion")?;
    }
    Ok(())
}

/// Prints every title and artist name starting with `prefix`.
///
/// # Errors
///
/// Fails when stdout is closed.
pub fn print_title_completions(engine: &RecommendationEngine, prefix: &str) -> Result<()> {
    let words = engine.autocomplete(prefix);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_completions(&words, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(shell_to_completion_shell(Shell::Bash), CompletionShell::Bash);
        assert_eq!(shell_to_completion_shell(Shell::Zsh), CompletionShell::Zsh);
        assert_eq!(shell_to_completion_shell(Shell::PowerShell), CompletionShell::PowerShell);
    }

    #[test]
    fn test_quote_completion() {
        assert_eq!(quote_completion("amapola"), "amapola");
        assert_eq!(quote_completion("bohemian rhapsody"), "\"bohemian rhapsody\"");
        assert_eq!(quote_completion("say \"hi\" now"), "\"say \\\"hi\\\" now\"");
    }

    #[test]
    fn test_write_completions_one_per_line() {
        let words = vec!["amapola".to_string(), "amargo dulce".to_string()];
        let mut out = Vec::new();
        write_completions(&words, &mut out).expect("writes to memory");

        assert_eq!(String::from_utf8(out).expect("utf8"), "amapola\n\"amargo dulce\"\n");
    }
}
