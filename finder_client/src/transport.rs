use async_trait::async_trait;
use reqwest::{header, Client, Method};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Options of one request. Only method, body and headers identify the request;
/// the cancellation token does not.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub signal: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn post(body: String) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_signal(mut self, signal: CancellationToken) -> Self {
        self.signal = Some(signal);
        self
    }

    pub(crate) fn cache_key(&self, url: &str) -> String {
        let projection = json!({
            "method": self.method.as_str(),
            "body": self.body,
            "headers": self.headers,
        });
        format!("{}|{}", url, projection)
    }
}

/// Executes a single request and yields its JSON body.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, url: &str, options: &RequestOptions) -> Result<Value>;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, url: &str, options: &RequestOptions) -> Result<Value> {
        let mut request = self.client.request(options.method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        let content = response.text().await?;

        log(url, &content).await?;
        let result: Value = serde_json::from_str(&content)?;
        Ok(result)
    }
}

async fn log(url: &str, content: &str) -> Result<()> {
    use std::path::PathBuf;
    use tokio::{fs::File, io::AsyncWriteExt};

    if let Ok(dir) = std::env::var("CLIENT_LOG_DIR") {
        let path = url::Url::parse(url).map(|u| u.path().to_string()).unwrap_or_default();
        let name = path.strip_prefix('/').unwrap_or(&path).replace('/', "_");
        let time = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filepath = PathBuf::from(dir).join(format!("upstream_{}_{}.json", name, time));
        let mut file = File::create(filepath).await?;
        file.write_all(content.as_bytes()).await?;
    }
    Ok(())
}
