use std::time::Duration;

use anyhow::{Context, Result, bail};

use super::types::{FeedResponse, Message};

/// HTTP client for the unread-messages feed.
pub struct FeedClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl FeedClient {
    pub fn new(endpoint: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
        })
    }

    /// Fetch the current batch of unread messages.
    ///
    /// A reachable server answering with a non-"ok" status or an
    /// undecodable body fails the same way a transport error does.
    pub fn fetch(&self) -> Result<Vec<Message>> {
        let response: FeedResponse = self
            .http
            .get(&self.endpoint)
            .send()
            .with_context(|| format!("requesting {}", self.endpoint))?
            .json()
            .context("decoding feed response")?;

        if response.status != "ok" {
            bail!("feed answered with status {:?}", response.status);
        }
        Ok(response.messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serve a single canned response on an ephemeral port.
    fn serve_once(body: &'static str) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        std::thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let _ = request.respond(tiny_http::Response::from_string(body));
            }
        });
        format!("http://{addr}/messages/unread")
    }

    #[test]
    fn ok_envelope_yields_messages() {
        let endpoint = serve_once(
            r#"{"status":"ok","timestamp":1700000000,
                "messages":[{"id":"1","from":"john.doe@x.com","subject":"hi","body":"text","received":1700000000}]}"#,
        );
        let messages = FeedClient::new(&endpoint).unwrap().fetch().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, "1");
        assert!(!messages[0].is_new);
    }

    #[test]
    fn non_ok_status_is_an_error() {
        let endpoint = serve_once(r#"{"status":"error","timestamp":1700000000,"messages":[]}"#);
        assert!(FeedClient::new(&endpoint).unwrap().fetch().is_err());
    }

    #[test]
    fn malformed_body_is_an_error() {
        let endpoint = serve_once("not json at all");
        assert!(FeedClient::new(&endpoint).unwrap().fetch().is_err());
    }

    #[test]
    fn missing_messages_field_defaults_to_empty() {
        let endpoint = serve_once(r#"{"status":"ok","timestamp":1700000000}"#);
        let messages = FeedClient::new(&endpoint).unwrap().fetch().unwrap();
        assert!(messages.is_empty());
    }
}
