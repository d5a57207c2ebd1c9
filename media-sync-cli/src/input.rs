//! Link input: positional arguments, a file, or stdin

use anyhow::{Context, Result};
use std::io::{IsTerminal, Read};
use std::path::Path;

/// Split free text into links, one token per whitespace-separated word.
///
/// Blank lines and `#` comments are ignored; a `#` inside a link is kept.
pub fn parse_links(text: &str) -> Vec<String> {
    text.lines()
        .flat_map(|line| {
            line.split_whitespace()
                .take_while(|token| !token.starts_with('#'))
        })
        .map(str::to_string)
        .collect()
}

/// Collect links from the first non-empty source: arguments, file, stdin
pub fn collect_links(urls: &[String], input: Option<&Path>) -> Result<Vec<String>> {
    if !urls.is_empty() {
        return Ok(urls.iter().flat_map(|url| parse_links(url)).collect());
    }

    if let Some(path) = input {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read links from {}", path.display()))?;
        return Ok(parse_links(&text));
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprintln!("Paste public links (one per line), then press Ctrl+D:");
    }

    let mut text = String::new();
    stdin
        .read_to_string(&mut text)
        .context("Failed to read links from stdin")?;
    Ok(parse_links(&text))
}
