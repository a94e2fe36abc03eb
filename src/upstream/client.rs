use crate::config::UpstreamConfig;
use std::time::Duration;

pub(crate) const RELAY_USER_AGENT: &str = concat!("gemini-relay/", env!("CARGO_PKG_VERSION"));

/// Shared upstream client used for both `generateContent` calls and token exchange.
pub fn build_http_client(cfg: &UpstreamConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .user_agent(RELAY_USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(cfg.request_timeout);

    if let Some(proxy_url) = &cfg.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
    }

    builder.build()
}
