use anyhow::{Result, anyhow};
use reqwest::Method;
use reqwest::Url;
use reqwest::blocking::Request;
use tracing::debug;

use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient};
use crate::services::scorecard_api::{RESULTS_PER_PAGE, ScorecardApi, ScorecardPage, WageQuery};

pub const SCORECARD_URL: &str = "https://api.data.gov/ed/collegescorecard/v1/schools.json";

pub struct ScorecardClient<C> {
    client: C,
    base_url: String,
}

impl ScorecardClient<UrlParam<BasicClient>> {
    /// Client for the public endpoint, authenticated with `api_key`.
    pub fn new(api_key: String) -> Self {
        Self::with_client(UrlParam::api_key(BasicClient::new(), api_key), SCORECARD_URL)
    }
}

impl<C: HttpClient> ScorecardClient<C> {
    pub fn with_client(client: C, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn page_url(&self, query: &WageQuery, page: u32) -> Result<Url> {
        let (male, female) = query.stat.fields();
        let mut url = Url::parse(&self.base_url)?;
        url.query_pairs_mut()
            .append_pair("fields", &format!("id,school.name,{male},{female}"))
            .append_pair("latest.student.size__range", &format!("{}..", query.poplimit))
            .append_pair("per_page", &RESULTS_PER_PAGE.to_string())
            .append_pair("page", &page.to_string());
        Ok(url)
    }
}

impl<C: HttpClient> ScorecardApi for ScorecardClient<C> {
    fn fetch_page(&self, query: &WageQuery, page: u32) -> Result<ScorecardPage> {
        let url = self.page_url(query, page)?;
        debug!(page, stat = %query.stat, poplimit = query.poplimit, "Requesting Scorecard page");

        // Errors are stripped of their URL so the api key never reaches the logs.
        let response = self
            .client
            .execute(Request::new(Method::GET, url))
            .map_err(|e| anyhow!("Failed to send Scorecard request: {}", e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(anyhow!(
                "Scorecard API returned status {}: {}",
                status,
                body
            ));
        }

        response
            .json::<ScorecardPage>()
            .map_err(|e| anyhow!("Failed to parse Scorecard page {}: {}", page, e.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::scorecard_api::WageStat;

    #[test]
    fn test_page_url_carries_query() {
        let client = ScorecardClient::with_client(BasicClient::new(), SCORECARD_URL);
        let query = WageQuery {
            stat: WageStat::Median,
            poplimit: 500,
        };
        let url = client.page_url(&query, 3).unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("per_page".into(), "100".into())));
        assert!(pairs.contains(&("page".into(), "3".into())));
        assert!(pairs.contains(&("latest.student.size__range".into(), "500..".into())));
        assert!(pairs.iter().any(|(k, v)| k == "fields"
            && v.starts_with("id,school.name,")
            && v.contains("median_earnings_male")));
    }
}
