//! Interactive query building for the `custom` command.
//!
//! Each parameter is asked for in turn. A blank answer leaves it unset so
//! the configured default applies. Invalid answers are re-asked.

use clap::ValueEnum;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::config::MAX_PAGE_SIZE;
use crate::error::{HarvestError, Result};
use crate::models::{Endpoint, Query};

/// Ask for every query parameter on `output` and read answers from `input`.
///
/// The returned query has no API key; the caller applies config defaults.
///
/// # Errors
///
/// [`HarvestError::Prompt`] if reading or writing the terminal fails,
/// including end of input before all questions were answered.
pub fn collect_query<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Query> {
    let mut query = Query::default();

    query.endpoint = loop {
        match ask(input, output, "Endpoint [everything/top-headlines]")? {
            None => break Endpoint::Everything,
            Some(answer) => match Endpoint::from_str(&answer, true) {
                Ok(endpoint) => break endpoint,
                Err(_) => say(output, "Please answer `everything` or `top-headlines`.")?,
            },
        }
    };

    query.term = ask(input, output, "Search term (q)")?.unwrap_or_default();

    match query.endpoint {
        Endpoint::Everything => {
            query.search_in = ask(input, output, "Search in [title,description,content]")?;
            query.sources = ask(input, output, "Sources (comma separated ids)")?;
            query.domains = ask(input, output, "Domains (comma separated)")?;
            query.from = ask(input, output, "From (YYYY-MM-DD)")?;
            query.to = ask(input, output, "To (YYYY-MM-DD)")?;
            query.language = ask(input, output, "Language (default en)")?;
            query.sort_by =
                ask(input, output, "Sort by [relevancy/popularity/publishedAt] (default publishedAt)")?;
        }
        Endpoint::TopHeadlines => {
            query.country = ask(input, output, "Country (2-letter code)")?;
            query.category = ask(input, output, "Category")?;
            query.sources = ask(input, output, "Sources (comma separated ids)")?;
        }
    }

    query.page_size = loop {
        match ask(input, output, "Page size (1-100, blank for default)")? {
            None => break None,
            Some(answer) => match answer.parse::<u32>() {
                Ok(size) if (1..=MAX_PAGE_SIZE).contains(&size) => break Some(size),
                _ => say(output, "Page size must be a number from 1 to 100.")?,
            },
        }
    };

    debug!(?query, "Collected query interactively");
    Ok(query)
}

/// Print `label`, read one line, and return it trimmed; blank becomes `None`.
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<Option<String>> {
    write!(output, "{label}: ").map_err(HarvestError::Prompt)?;
    output.flush().map_err(HarvestError::Prompt)?;

    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(HarvestError::Prompt)?;
    if read == 0 {
        return Err(HarvestError::Prompt(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("no answer for `{label}`"),
        )));
    }
    let answer = line.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

fn say<W: Write>(output: &mut W, message: &str) -> Result<()> {
    writeln!(output, "{message}").map_err(HarvestError::Prompt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str) -> (Result<Query>, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = collect_query(&mut input, &mut output);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_everything_query() {
        let (query, transcript) = run(
            "everything\ngender AND tech\n\nwired\n\n2024-01-01\n2024-01-31\nen\nrelevancy\n50\n",
        );
        let query = query.unwrap();

        assert_eq!(query.endpoint, Endpoint::Everything);
        assert_eq!(query.term, "gender AND tech");
        assert_eq!(query.search_in, None);
        assert_eq!(query.sources.as_deref(), Some("wired"));
        assert_eq!(query.domains, None);
        assert_eq!(query.from.as_deref(), Some("2024-01-01"));
        assert_eq!(query.to.as_deref(), Some("2024-01-31"));
        assert_eq!(query.language.as_deref(), Some("en"));
        assert_eq!(query.sort_by.as_deref(), Some("relevancy"));
        assert_eq!(query.page_size, Some(50));
        assert!(query.api_key.is_empty());
        assert!(transcript.contains("Search term (q): "));
    }

    #[test]
    fn test_blank_answers_use_defaults() {
        let (query, _) = run("\nrust\n\n\n\n\n\n\n\n\n");
        let query = query.unwrap();
        assert_eq!(query.endpoint, Endpoint::Everything);
        assert_eq!(query.term, "rust");
        assert_eq!(query.page_size, None);
        assert_eq!(query.language, None);
    }

    #[test]
    fn test_top_headlines_query() {
        let (query, transcript) = run("top-headlines\n\nus\ntechnology\n\n20\n");
        let query = query.unwrap();
        assert_eq!(query.endpoint, Endpoint::TopHeadlines);
        assert_eq!(query.term, "");
        assert_eq!(query.country.as_deref(), Some("us"));
        assert_eq!(query.category.as_deref(), Some("technology"));
        assert_eq!(query.page_size, Some(20));
        assert!(!transcript.contains("Language"));
    }

    #[test]
    fn test_invalid_answers_are_reasked() {
        let (query, transcript) = run("sideways\ntop-headlines\n\n\n\n\n0\nabc\n100\n");
        let query = query.unwrap();
        assert_eq!(query.endpoint, Endpoint::TopHeadlines);
        assert_eq!(query.page_size, Some(100));
        assert!(transcript.contains("Please answer `everything` or `top-headlines`."));
        assert_eq!(transcript.matches("Page size must be").count(), 2);
    }

    #[test]
    fn test_eof_is_an_error() {
        let (query, _) = run("everything\n");
        assert!(matches!(query, Err(HarvestError::Prompt(_))));
    }
}
