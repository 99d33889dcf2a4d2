//! HTTP client for the message service, used by the `message-client` binary.

use std::fmt::{self, Write as _};
use std::net::{IpAddr, Ipv4Addr, UdpSocket};

use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use uuid::Uuid;

use crate::api::{MessageDto, UpdateMessageRequest};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Server returned {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Clone)]
pub struct MessageClient {
    http: Client,
    base_url: String,
}

impl MessageClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let parsed = reqwest::Url::parse(base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl(format!("{}: missing host", base_url)));
        }

        let http = Client::builder().pool_max_idle_per_host(8).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host part of the server URL.
    pub fn server_host(&self) -> Option<String> {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.trim_matches(['[', ']']).to_string()))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list(&self) -> Result<Vec<MessageDto>, ClientError> {
        let resp = self.http.get(self.url("/messages")).send().await?;
        let resp = check_status(resp, "messages").await?;
        Ok(resp.json().await?)
    }

    pub async fn create(&self, client_ip: &str, message: &str) -> Result<MessageDto, ClientError> {
        let body = MessageDto {
            id: None,
            client_ip: Some(client_ip.to_string()),
            message: Some(message.to_string()),
        };

        let resp = self.http.post(self.url("/messages")).json(&body).send().await?;
        let resp = check_status(resp, "messages").await?;
        Ok(resp.json().await?)
    }

    pub async fn get(&self, id: Uuid) -> Result<MessageDto, ClientError> {
        let resp = self
            .http
            .get(self.url(&format!("/messages/{}", id)))
            .send()
            .await?;
        let resp = check_status(resp, id).await?;
        Ok(resp.json().await?)
    }

    pub async fn update(&self, id: Uuid, text: &str) -> Result<MessageDto, ClientError> {
        let body = UpdateMessageRequest {
            message_id: id,
            updated_message: text.to_string(),
        };

        let resp = self
            .http
            .patch(self.url("/messages/message"))
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp, id).await?;
        Ok(resp.json().await?)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.url(&format!("/messages/{}", id)))
            .send()
            .await?;
        check_status(resp, id).await?;
        Ok(())
    }
}

async fn check_status(resp: Response, target: impl fmt::Display) -> Result<Response, ClientError> {
    let status = resp.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(target.to_string()));
    }
    if !status.is_success() {
        let body = resp.text().await?;
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp)
}

/// Local address the OS would route through to reach `host`.
///
/// Connecting a UDP socket sends nothing; it only selects a route. Falls back
/// to `0.0.0.0` when no route exists.
pub fn local_ip_for(host: &str) -> IpAddr {
    let unspecified = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

    let socket = match UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)) {
        Ok(socket) => socket,
        Err(_) => return unspecified,
    };

    match socket.connect((host, 80)).and_then(|_| socket.local_addr()) {
        Ok(addr) => addr.ip(),
        Err(e) => {
            tracing::debug!(host, error = %e, "could not resolve local address");
            unspecified
        }
    }
}

/// Renders a listing as numbered blocks, one message per block.
pub fn format_messages(messages: &[MessageDto]) -> String {
    if messages.is_empty() {
        return "No messages found.\n".to_string();
    }

    let mut out = String::new();
    for (i, dto) in messages.iter().enumerate() {
        let id = dto.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
        let client_ip = dto.client_ip.as_deref().unwrap_or("-");
        let text = dto
            .message
            .as_deref()
            .unwrap_or("")
            .lines()
            .collect::<Vec<_>>()
            .join(" ");

        let _ = writeln!(out, "{}) ID: {}", i + 1, id);
        let _ = writeln!(out, "   Client IP: {}", client_ip);
        let _ = writeln!(out, "   Message: \"{}\"", text.trim());
        let _ = writeln!(out, "--------------------");
    }
    out
}
