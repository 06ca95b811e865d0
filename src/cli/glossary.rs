//! Glossary CLI command.

use crate::models::glossary;
use std::io::{self, Write};

/// Prints glossary entries whose term contains `term` (all when `None`).
///
/// Returns the number of entries printed.
pub fn cmd_glossary(term: Option<&str>, out: &mut impl Write) -> io::Result<usize> {
    let entries = glossary::search(term.unwrap_or_default());
    let width = entries.iter().map(|e| e.term.len()).max().unwrap_or(0);
    for entry in &entries {
        writeln!(out, "{:<width$}  {}", entry.term, entry.definition)?;
    }
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glossary_filters() {
        let mut out = Vec::new();
        let count = cmd_glossary(Some("eb"), &mut out).unwrap();
        assert!(count >= 1);
        assert!(String::from_utf8(out).unwrap().contains("Eclipsing Binary"));
    }

    #[test]
    fn test_glossary_no_match() {
        let mut out = Vec::new();
        assert_eq!(cmd_glossary(Some("zzz"), &mut out).unwrap(), 0);
        assert!(out.is_empty());
    }
}
