//! Parallel Batch Sanitization
//!
//! Uses Rayon to sanitize many independent fragments against one shared
//! `Sanitizer`. A sanitizer is immutable, so every worker reads the same
//! configuration without locking.

use crate::sanitizer::Sanitizer;
use rayon::prelude::*;

/// Sanitize fragments in parallel, results in input order
pub fn sanitize_parallel(sanitizer: &Sanitizer, fragments: &[&str]) -> Vec<String> {
    fragments
        .par_iter()
        .map(|html| sanitizer.sanitize(html).into_owned())
        .collect()
}

/// Sanitize keyed fragments in parallel, keeping each key with its result
pub fn sanitize_keyed(
    sanitizer: &Sanitizer,
    fragments: &[(&str, &str)], // (key, html)
) -> Vec<(String, String)> {
    fragments
        .par_iter()
        .map(|(key, html)| (key.to_string(), sanitizer.sanitize(html).into_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_matches_sequential() {
        let sanitizer = Sanitizer::allow_list();
        let fragments = [
            "<b>ok</b>",
            "<script>alert(1)</script>x",
            "<a href=\"javascript:alert(1)\">y</a>",
            "",
        ];

        let results = sanitize_parallel(&sanitizer, &fragments);
        assert_eq!(results.len(), 4);
        for (html, out) in fragments.iter().zip(&results) {
            assert_eq!(sanitizer.sanitize(html), out.as_str());
        }
        assert_eq!(results[1], "x");
        assert_eq!(results[2], "<a>y</a>");
    }

    #[test]
    fn test_keyed() {
        let sanitizer = Sanitizer::strip_all();
        let fragments = [("title", "<h1>Hi</h1>"), ("body", "<p>a &lt; b</p>")];

        let results = sanitize_keyed(&sanitizer, &fragments);
        assert_eq!(
            results,
            vec![
                ("title".to_string(), "Hi".to_string()),
                ("body".to_string(), "a &lt; b".to_string()),
            ]
        );
    }
}
