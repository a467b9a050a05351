use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::models::{AddKeyRequest, EnabledRequest, KeyListing, NotifyStats, SendRequest, SendResponse};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("reqwest client"),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn list_keys(&self) -> Result<KeyListing, String> {
        fetch(self.client.get(self.url("/keys")))
    }

    pub fn add_key(&self, key: &str) -> Result<KeyListing, String> {
        let req = AddKeyRequest { key: key.to_string() };
        fetch(self.client.post(self.url("/keys")).json(&req))
    }

    pub fn remove_key(&self, index: i64) -> Result<KeyListing, String> {
        fetch(self.client.delete(self.url(&format!("/keys/{}", index))))
    }

    pub fn set_enabled(&self, enabled: bool) -> Result<KeyListing, String> {
        fetch(self.client.put(self.url("/enabled")).json(&EnabledRequest { enabled }))
    }

    pub fn send(&self, message: &str) -> Result<SendResponse, String> {
        let req = SendRequest {
            message: message.to_string(),
        };
        fetch(self.client.post(self.url("/messages")).json(&req))
    }

    pub fn stats(&self) -> Result<NotifyStats, String> {
        fetch(self.client.get(self.url("/stats")))
    }
}

fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, String> {
    let resp = req.send().map_err(|err| err.to_string())?;
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(format!("http {}: {}", status.as_u16(), body))
    }
}
