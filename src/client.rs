use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Path of the chat endpoint on the reply service.
pub const CHAT_PATH: &str = "/ai-chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    reply: String,
}

/// Client for the reply service. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Clone)]
pub struct ReplyClient {
    client: Client,
    base_url: String,
}

impl ReplyClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send one message and return the service's reply.
    ///
    /// The status code is deliberately not inspected: success is decided by
    /// whether the body decodes as `{"reply": …}`. See DESIGN.md.
    pub async fn send(&self, message: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, CHAT_PATH);

        let response = self
            .client
            .post(&url)
            .json(&ChatRequest { message })
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        let reply: ChatReply = response
            .json()
            .await
            .context("reply service returned a malformed body")?;

        Ok(reply.reply)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Canned-response HTTP stub shared by the client and widget tests.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serve `count` requests, answering each with the given status line and
    /// body. Returns the base URL and a handle yielding the raw requests.
    pub async fn stub_server(
        status: &'static str,
        body: &'static str,
        count: usize,
    ) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");

        let handle = tokio::spawn(async move {
            let mut captured = Vec::with_capacity(count);
            for _ in 0..count {
                let (mut socket, _) = listener.accept().await.expect("accept");
                captured.push(read_request(&mut socket).await);
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket
                    .write_all(response.as_bytes())
                    .await
                    .expect("write response");
            }
            captured
        });

        (format!("http://{}", addr), handle)
    }

    /// A base URL nothing is listening on.
    pub async fn unreachable_base() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        format!("http://{}", addr)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.expect("read request");
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            if let Some(header_end) = find_header_end(&raw) {
                let headers = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
                let content_length = headers
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&raw).to_string()
    }

    fn find_header_end(raw: &[u8]) -> Option<usize> {
        raw.windows(4).position(|window| window == b"\r\n\r\n")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{stub_server, unreachable_base};
    use super::*;

    #[tokio::test]
    async fn posts_message_as_json_and_returns_reply() {
        let (base, server) = stub_server("200 OK", r#"{"reply":"hi"}"#, 1).await;
        let client = ReplyClient::new(&base);

        let reply = client.send("hello").await.unwrap();
        assert_eq!(reply, "hi");

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("POST /ai-chat HTTP/1.1"));
        assert!(request.to_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"message":"hello"}"#));
    }

    #[tokio::test]
    async fn malformed_body_is_an_error() {
        let (base, _server) = stub_server("200 OK", "<html>oops</html>", 1).await;
        let client = ReplyClient::new(&base);

        assert!(client.send("hello").await.is_err());
    }

    #[tokio::test]
    async fn status_code_is_not_inspected() {
        // A rejected request that still carries a well-formed body yields a
        // reply; the body alone decides success.
        let (base, _server) =
            stub_server("500 Internal Server Error", r#"{"reply":"still here"}"#, 1).await;
        let client = ReplyClient::new(&base);

        assert_eq!(client.send("hello").await.unwrap(), "still here");
    }

    #[tokio::test]
    async fn unreachable_service_is_an_error() {
        let client = ReplyClient::new(&unreachable_base().await);
        assert!(client.send("hello").await.is_err());
    }

    #[tokio::test]
    async fn trailing_slash_is_normalized() {
        let client = ReplyClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
