use reqwest::blocking::{Request, Response};

/// Executes one blocking HTTP request.
pub trait HttpClient {
    fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
