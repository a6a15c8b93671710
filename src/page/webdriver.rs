//! W3C WebDriver page accessor.
//!
//! Talks to a running chromedriver (or any W3C-compliant driver) over HTTP:
//! - POST /session to create the browser session
//! - POST /session/{id}/url to navigate
//! - GET  /session/{id}/source for the rendered document
//! - POST /session/{id}/execute/sync to scroll
//! - POST /session/{id}/elements to query by CSS selector
//! - GET  /session/{id}/element/{el}/displayed|attribute/{name}
//!
//! The session is deleted when the accessor is dropped.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Document, ElementHandle, PageAccessor, PageError};
use crate::config::BrowserConfig;

/// Key the W3C protocol uses for element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Deserialize)]
struct Envelope {
    value: Value,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: String,
    #[serde(default)]
    message: String,
}

pub struct WebDriverPage {
    client: Client,
    base: String,
    session_id: String,
}

impl WebDriverPage {
    /// Starts a new browser session. Failure here is fatal to the run.
    pub fn connect(config: &BrowserConfig) -> Result<Self, PageError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| PageError::Other(format!("http client: {e}")))?;

        let base = config.webdriver_url.trim_end_matches('/').to_string();

        let mut chrome_options = json!({ "args": config.args });
        if let Some(binary) = &config.chrome_binary {
            chrome_options["binary"] = json!(binary);
        }
        let body = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": chrome_options,
                }
            }
        });

        let value = send(client.post(format!("{base}/session")).json(&body))?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| PageError::Other("driver returned no session id".to_string()))?
            .to_string();

        tracing::info!(session = %session_id, driver = %base, "browser session started");

        Ok(WebDriverPage { client, base, session_id })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base, self.session_id, path)
    }

    fn get(&self, path: &str) -> Result<Value, PageError> {
        send(self.client.get(self.url(path)))
    }

    fn post(&self, path: &str, body: Value) -> Result<Value, PageError> {
        send(self.client.post(self.url(path)).json(&body))
    }

    fn is_displayed(&self, element: &ElementHandle) -> Result<bool, PageError> {
        let value = self.get(&format!("/element/{}/displayed", element.0))?;
        Ok(value.as_bool().unwrap_or(false))
    }
}

impl PageAccessor for WebDriverPage {
    fn navigate(&mut self, target: &str) -> Result<(), PageError> {
        self.post("/url", json!({ "url": target }))?;
        Ok(())
    }

    fn current_document(&mut self) -> Result<Document, PageError> {
        let value = self.get("/source")?;
        let source = value
            .as_str()
            .ok_or_else(|| PageError::Other("page source was not a string".to_string()))?;
        Ok(Document::new(source))
    }

    fn trigger_lazy_load(&mut self) -> Result<(), PageError> {
        self.post("/execute/sync", json!({ "script": SCROLL_TO_BOTTOM, "args": [] }))?;
        Ok(())
    }

    fn find_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, PageError> {
        let value = self.post("/elements", json!({ "using": "css selector", "value": selector }))?;
        Ok(element_handles(&value))
    }

    fn wait_for_visible(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<ElementHandle, PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            for element in self.find_all(selector)? {
                match self.is_displayed(&element) {
                    Ok(true) => return Ok(element),
                    Ok(false) | Err(PageError::ElementNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
            if Instant::now() >= deadline {
                return Err(PageError::Timeout(format!(
                    "{selector} not visible after {}",
                    humantime::format_duration(timeout)
                )));
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    fn attribute(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let value = self.get(&format!("/element/{}/attribute/{name}", element.0))?;
        Ok(value.as_str().map(str::to_string))
    }
}

impl Drop for WebDriverPage {
    fn drop(&mut self) {
        let url = format!("{}/session/{}", self.base, self.session_id);
        match self.client.delete(url).send() {
            Ok(_) => tracing::info!(session = %self.session_id, "browser session closed"),
            Err(e) => tracing::warn!(session = %self.session_id, error = %e, "failed to close browser session"),
        }
    }
}

fn send(request: reqwest::blocking::RequestBuilder) -> Result<Value, PageError> {
    let response = request.send().map_err(http_error)?;
    let status = response.status();
    let envelope: Envelope = response.json().map_err(http_error)?;

    if status.is_success() {
        return Ok(envelope.value);
    }

    match serde_json::from_value::<WireError>(envelope.value) {
        Ok(err) => Err(classify(&err.error, err.message)),
        Err(_) => Err(PageError::Other(format!("driver returned HTTP {status}"))),
    }
}

fn http_error(err: reqwest::Error) -> PageError {
    if err.is_timeout() {
        PageError::Timeout(err.to_string())
    } else {
        PageError::Other(err.to_string())
    }
}

/// Maps a W3C error code onto the page fault taxonomy.
fn classify(code: &str, message: String) -> PageError {
    match code {
        "timeout" | "script timeout" => PageError::Timeout(message),
        "no such element" | "stale element reference" => PageError::ElementNotFound(message),
        _ if message.is_empty() => PageError::Other(code.to_string()),
        _ => PageError::Other(format!("{code}: {message}")),
    }
}

fn element_handles(value: &Value) -> Vec<ElementHandle> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get(ELEMENT_KEY).and_then(Value::as_str))
                .map(|id| ElementHandle(id.to_string()))
                .collect()
        })
        .unwrap_or_default()
}
