use std::time::Duration;

use citescope_core::ServicesConfig;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::Value;

use crate::error::{Result, ScienceError};
use crate::http::HttpClient;
use crate::identifiers::Pmid;

/// NCBI E-utilities summary lookup plus the PubMed citation endpoint.
pub struct PubMedClient {
    client: HttpClient,
    eutils_base_url: String,
    pubmed_base_url: String,
}

impl PubMedClient {
    pub fn from_config(services: &ServicesConfig) -> Result<Self> {
        Self::with_params(
            &services.eutils_base_url,
            &services.pubmed_base_url,
            &services.user_agent,
            Duration::from_secs(services.timeout_secs),
        )
    }

    pub fn with_params(
        eutils_base_url: &str,
        pubmed_base_url: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(user_agent, timeout)?,
            eutils_base_url: eutils_base_url.trim_end_matches('/').to_string(),
            pubmed_base_url: pubmed_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// DOI recorded in the PubMed summary, if any.
    pub async fn fetch_doi(&self, pmid: &Pmid) -> Result<Option<String>> {
        let url = format!(
            "{}/esummary.fcgi?db=pubmed&id={}",
            self.eutils_base_url, pmid
        );
        let xml = self.client.get(&url).await?;
        parse_esummary_doi(&xml)
    }

    /// Pre-formatted AMA citation from PubMed, if one is offered.
    pub async fn fetch_citation(&self, pmid: &Pmid) -> Result<Option<String>> {
        let url = format!("{}/{}/citations/", self.pubmed_base_url, pmid);
        let val: Value = self.client.get_json(&url).await?;
        Ok(val["ama"]["orig"]
            .as_str()
            .filter(|s| !s.is_empty())
            .map(ToOwned::to_owned))
    }
}

fn is_doi_item(e: &BytesStart<'_>) -> Result<bool> {
    if e.name().as_ref() != b"Item" {
        return Ok(false);
    }
    let attr = e
        .try_get_attribute("Name")
        .map_err(|err| ScienceError::Parse(format!("invalid esummary attribute: {err}")))?;
    match attr {
        Some(a) => {
            let value = a
                .unescape_value()
                .map_err(|err| ScienceError::Parse(format!("invalid esummary attribute: {err}")))?;
            Ok(value == "doi")
        }
        None => Ok(false),
    }
}

/// Text of the first `<Item Name="doi">` element in an esummary document.
///
/// An empty first match counts as no DOI.
pub fn parse_esummary_doi(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    // Depth inside the matched element; zero while not capturing.
    let mut depth = 0usize;
    let mut text = String::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| ScienceError::Parse(format!("invalid esummary xml: {e}")))?;

        match event {
            Event::Start(e) => {
                if depth > 0 {
                    depth += 1;
                } else if is_doi_item(&e)? {
                    depth = 1;
                }
            }
            Event::Empty(e) => {
                if depth == 0 && is_doi_item(&e)? {
                    return Ok(None);
                }
            }
            Event::Text(t) if depth > 0 => {
                let s = t
                    .unescape()
                    .map_err(|e| ScienceError::Parse(format!("invalid esummary text: {e}")))?;
                text.push_str(&s);
            }
            Event::CData(c) if depth > 0 => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
            }
            Event::End(_) if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let doi = text.trim();
                    return Ok((!doi.is_empty()).then(|| doi.to_string()));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};

    const SUMMARY_WITH_DOI: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSummaryResult PUBLIC "-//NLM//DTD esummary v1 20041029//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20041029/esummary-v1.dtd">
<eSummaryResult>
<DocSum>
	<Id>31452104</Id>
	<Item Name="PubDate" Type="Date">2019 Aug</Item>
	<Item Name="ArticleIds" Type="List">
		<Item Name="pubmed" Type="String">31452104</Item>
		<Item Name="doi" Type="String">10.1038/s41586-019-1506-7</Item>
	</Item>
	<Item Name="DOI" Type="String">10.9999/uppercase-ignored</Item>
</DocSum>
</eSummaryResult>"#;

    const SUMMARY_WITHOUT_DOI: &str = r#"<?xml version="1.0" encoding="UTF-8" ?>
<eSummaryResult>
<DocSum>
	<Id>99999999</Id>
	<Item Name="ArticleIds" Type="List">
		<Item Name="pubmed" Type="String">99999999</Item>
	</Item>
</DocSum>
</eSummaryResult>"#;

    fn client_for(server: &ServerGuard) -> PubMedClient {
        PubMedClient::with_params(&server.url(), &server.url(), "citescope-test", Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_parse_finds_lowercase_doi_item() {
        assert_eq!(
            parse_esummary_doi(SUMMARY_WITH_DOI).unwrap().as_deref(),
            Some("10.1038/s41586-019-1506-7")
        );
    }

    #[test]
    fn test_parse_without_doi_item() {
        assert_eq!(parse_esummary_doi(SUMMARY_WITHOUT_DOI).unwrap(), None);
    }

    #[test]
    fn test_parse_empty_doi_item() {
        let xml = r#"<r><Item Name="doi" Type="String"></Item><Item Name="doi">10.1/late</Item></r>"#;
        assert_eq!(parse_esummary_doi(xml).unwrap(), None);
        let xml = r#"<r><Item Name="doi"/></r>"#;
        assert_eq!(parse_esummary_doi(xml).unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_xml() {
        assert!(parse_esummary_doi("<a><Item Name=\"doi\">10.1/x</b></a>").is_err());
    }

    #[tokio::test]
    async fn test_fetch_doi() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/esummary.fcgi?db=pubmed&id=31452104")
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(SUMMARY_WITH_DOI)
            .create_async().await;

        let pmid = Pmid::parse("31452104").unwrap();
        let doi = client_for(&server).fetch_doi(&pmid).await.unwrap();
        assert_eq!(doi.as_deref(), Some("10.1038/s41586-019-1506-7"));
    }

    #[tokio::test]
    async fn test_fetch_citation() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/99999999/citations/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ama": {"orig": "Foo et al."}, "mla": {"orig": "Foo, Bar."}}"#)
            .create_async().await;

        let pmid = Pmid::parse("99999999").unwrap();
        let cite = client_for(&server).fetch_citation(&pmid).await.unwrap();
        assert_eq!(cite.as_deref(), Some("Foo et al."));
    }

    #[tokio::test]
    async fn test_fetch_citation_missing_field() {
        let mut server = Server::new_async().await;
        let _m = server.mock("GET", "/12345678/citations/")
            .with_status(200)
            .with_body(r#"{"apa": {"orig": "Someone."}}"#)
            .create_async().await;

        let pmid = Pmid::parse("12345678").unwrap();
        assert_eq!(client_for(&server).fetch_citation(&pmid).await.unwrap(), None);
    }
}
