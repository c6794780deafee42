//! Suppression of DOIs that only appear as the prefix or fragment of a longer match.
//!
//! Page text often yields both `10.1000/xyz123` and `10.1000/xyz123.extra`
//! from the same reference. The shorter one is dropped unless the citation
//! service can render it by itself. A genuine DOI that happens to be a
//! substring of another one and does not resolve is dropped as well.

use std::collections::HashSet;

use futures::StreamExt;
use tracing::{debug, info};

use crate::sources::CitationService;

const MAX_CONCURRENT_CHECKS: usize = 4;

/// Indices of DOIs that are a strict substring of another DOI in the list.
pub fn subsumed_indices(dois: &[String]) -> Vec<usize> {
    dois.iter()
        .enumerate()
        .filter(|(i, doi)| {
            dois.iter()
                .enumerate()
                .any(|(j, other)| j != *i && other.len() > doi.len() && other.contains(doi.as_str()))
        })
        .map(|(i, _)| i)
        .collect()
}

/// Returns `dois` without the subsumed entries that fail to resolve, in the original order.
pub async fn suppress_subsumed(
    dois: &[String],
    service: &dyn CitationService,
    style: &str,
) -> Vec<String> {
    let candidates = subsumed_indices(dois);
    if candidates.is_empty() {
        return dois.to_vec();
    }

    let rejected: HashSet<usize> = futures::stream::iter(candidates)
        .map(|i| async move {
            let ok = service.resolves(&dois[i], style).await;
            debug!("shorter DOI {} resolves: {ok}", dois[i]);
            (i, ok)
        })
        .buffer_unordered(MAX_CONCURRENT_CHECKS)
        .filter_map(|(i, ok)| async move { (!ok).then_some(i) })
        .collect()
        .await;

    if !rejected.is_empty() {
        info!("suppressed {} DOIs contained in longer matches", rejected.len());
    }

    dois.iter()
        .enumerate()
        .filter(|(i, _)| !rejected.contains(i))
        .map(|(_, doi)| doi.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::doi_citation::DoiCitationClient;
    use mockito::{Matcher, Server};
    use std::time::Duration;

    fn dois(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_subsumed_indices() {
        let list = dois(&["10.1000/xyz123", "10.1000/xyz123.extra", "10.2000/other"]);
        assert_eq!(subsumed_indices(&list), vec![0]);
    }

    #[test]
    fn test_no_overlap() {
        let list = dois(&["10.1000/a1", "10.1000/b2"]);
        assert!(subsumed_indices(&list).is_empty());
    }

    #[tokio::test]
    async fn test_shorter_dropped_when_it_does_not_resolve() {
        let mut server = Server::new_async().await;
        let _short = server.mock("GET", "/format")
            .match_query(Matcher::UrlEncoded("doi".into(), "10.1000/xyz123".into()))
            .with_status(404)
            .create_async().await;
        let longer = server.mock("GET", "/format")
            .match_query(Matcher::UrlEncoded("doi".into(), "10.1000/xyz123.extra".into()))
            .expect(0)
            .create_async().await;

        let client = DoiCitationClient::with_params(&server.url(), "en-US", "citescope-test", Duration::from_secs(5)).unwrap();
        let list = dois(&["10.1000/xyz123", "10.1000/xyz123.extra"]);
        let kept = suppress_subsumed(&list, &client, "apa").await;

        assert_eq!(kept, dois(&["10.1000/xyz123.extra"]));
        longer.assert_async().await;
    }

    #[tokio::test]
    async fn test_shorter_kept_when_it_resolves() {
        let mut server = Server::new_async().await;
        let _short = server.mock("GET", "/format")
            .match_query(Matcher::UrlEncoded("doi".into(), "10.1000/xyz123".into()))
            .with_status(200)
            .with_body("Real citation.")
            .create_async().await;

        let client = DoiCitationClient::with_params(&server.url(), "en-US", "citescope-test", Duration::from_secs(5)).unwrap();
        let list = dois(&["10.1000/xyz123.extra", "10.1000/xyz123"]);
        let kept = suppress_subsumed(&list, &client, "apa").await;

        assert_eq!(kept, list);
    }
}
