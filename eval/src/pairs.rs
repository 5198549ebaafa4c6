//! Trip pair parsing for the evaluation harness.

use anyhow::{anyhow, Result};

/// The standing evaluation set used when no pairs are given.
pub fn default_pairs() -> Vec<(String, String)> {
    [
        ("school", "home"),
        ("home", "market"),
        ("office", "hospital"),
        ("parking", "shoppingMall"),
        ("cottageArea", "railway"),
    ]
    .iter()
    .map(|(start, end)| (start.to_string(), end.to_string()))
    .collect()
}

/// Parse `start:end` pairs separated by commas, e.g. `school:home,home:market`.
pub fn parse_pairs(raw: &str) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        let (start, end) = segment
            .split_once(':')
            .ok_or_else(|| anyhow!("malformed pair '{segment}' (expected start:end)"))?;
        let start = start.trim();
        let end = end.trim();
        if start.is_empty() || end.is_empty() {
            return Err(anyhow!("malformed pair '{segment}' (expected start:end)"));
        }
        pairs.push((start.to_string(), end.to_string()));
    }
    if pairs.is_empty() {
        return Err(anyhow!("no pairs given"));
    }
    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_pairs() {
        let pairs = parse_pairs("school:home, home:market").expect("parse");
        assert_eq!(
            pairs,
            vec![
                ("school".to_string(), "home".to_string()),
                ("home".to_string(), "market".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_segments_without_a_colon() {
        assert!(parse_pairs("school-home").is_err());
    }

    #[test]
    fn rejects_empty_sides() {
        assert!(parse_pairs("school:").is_err());
        assert!(parse_pairs(":home").is_err());
    }

    #[test]
    fn default_set_has_five_pairs() {
        assert_eq!(default_pairs().len(), 5);
    }
}
