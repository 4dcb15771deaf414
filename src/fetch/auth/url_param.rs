use crate::fetch::client::HttpClient;

/// An [`HttpClient`] wrapper that appends an API key as a URL query parameter.
///
/// `param_name` is the query parameter name (`"api_key"` for api.data.gov
/// services) and `key` is its value.
pub struct UrlParam<C> {
    pub inner: C,
    pub param_name: String,
    pub key: String,
}

impl<C> UrlParam<C> {
    /// Uses the `api_key` parameter expected by api.data.gov.
    pub fn api_key(inner: C, key: String) -> Self {
        Self {
            inner,
            param_name: "api_key".to_string(),
            key,
        }
    }
}

impl<C: HttpClient> HttpClient for UrlParam<C> {
    fn execute(
        &self,
        mut req: reqwest::blocking::Request,
    ) -> reqwest::Result<reqwest::blocking::Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(&self.param_name, &self.key);
        self.inner.execute(req)
    }
}
