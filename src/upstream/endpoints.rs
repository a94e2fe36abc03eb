use super::retry::RawResponse;
use crate::credentials::Credential;
use gemini_relay_schema::GenerateContentRequest;
use url::Url;

/// Per-model `generateContent` endpoints under a fixed API origin.
#[derive(Debug, Clone)]
pub struct ModelEndpoints {
    base: Url,
}

impl ModelEndpoints {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// `<base>/v1beta/models/<model>:generateContent`, keeping any base path prefix.
    pub fn generate_content(&self, model: &str) -> Url {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        url.set_path(&format!("{prefix}/v1beta/models/{model}:generateContent"));
        url.set_query(None);
        url
    }
}

/// One model's request, ready to be sent any number of times.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub model: String,
    pub url: Url,
    pub credential: Credential,
    pub body: GenerateContentRequest,
}

impl PreparedRequest {
    /// Attach the credential: API keys ride in the query, tokens in the header.
    pub fn build(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let request = match &self.credential {
            Credential::ApiKey(key) => {
                let mut url = self.url.clone();
                url.query_pairs_mut().append_pair("key", key);
                client.post(url)
            }
            Credential::BearerToken(token) => client.post(self.url.clone()).bearer_auth(token),
        };
        request.json(&self.body)
    }

    /// One attempt; the body is read fully so a broken stream counts as a transport error.
    pub(super) async fn send_once(
        &self,
        client: &reqwest::Client,
    ) -> Result<RawResponse, reqwest::Error> {
        let resp = self.build(client).send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;
        Ok(RawResponse {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn prepared(credential: Credential) -> PreparedRequest {
        let endpoints =
            ModelEndpoints::new(Url::parse("http://example.test").expect("invalid url"));
        PreparedRequest {
            model: "gemini-2.5-flash".to_string(),
            url: endpoints.generate_content("gemini-2.5-flash"),
            credential,
            body: GenerateContentRequest::from_prompt("hello"),
        }
    }

    #[test]
    fn generate_content_url_keeps_base_prefix() {
        let endpoints =
            ModelEndpoints::new(Url::parse("http://example.test/proxy/").expect("invalid url"));
        assert_eq!(
            endpoints.generate_content("gemini-2.0-flash").as_str(),
            "http://example.test/proxy/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[test]
    fn api_key_is_sent_as_query_parameter() {
        let http = reqwest::Client::new();
        let req = prepared(Credential::ApiKey("k-1".to_string()))
            .build(&http)
            .build()
            .expect("failed to build request");

        assert_eq!(req.method(), Method::POST);
        assert_eq!(
            req.url().as_str(),
            "http://example.test/v1beta/models/gemini-2.5-flash:generateContent?key=k-1"
        );
        assert!(req.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }

    #[test]
    fn bearer_token_is_sent_as_authorization_header() {
        let http = reqwest::Client::new();
        let req = prepared(Credential::BearerToken("ya29.t".to_string()))
            .build(&http)
            .build()
            .expect("failed to build request");

        assert_eq!(req.url().query(), None);
        assert_eq!(
            req.headers()
                .get(reqwest::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer ya29.t")
        );
    }

    #[test]
    fn body_wraps_prompt_in_contents() {
        let http = reqwest::Client::new();
        let req = prepared(Credential::ApiKey("k".to_string()))
            .build(&http)
            .build()
            .expect("failed to build request");

        let bytes = req
            .body()
            .and_then(reqwest::Body::as_bytes)
            .expect("buffered json body");
        let value: serde_json::Value = serde_json::from_slice(bytes).expect("json body");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
    }
}
