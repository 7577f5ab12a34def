//! Kroki-backed diagram engine.
//!
//! Renders Mermaid sources to SVG by posting them to a Kroki server. The
//! engine configuration is applied as a Mermaid `init` directive prepended to
//! every source. HTTP calls are blocking and run on tokio's blocking pool.

use std::cell::OnceCell;
use std::time::Duration;

use ureq::Agent;

use crate::consts::{DEFAULT_TIMEOUT, KROKI_MERMAID_ENDPOINT};
use crate::engine::{DiagramEngine, EngineConfig, EngineError, EngineLoader};

/// Create HTTP agent with the specified timeout.
///
/// Non-2xx statuses are returned as responses so the error body can be read.
fn create_agent(timeout: Duration) -> Agent {
    Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into()
}

/// Loads a [`KrokiEngine`] when a server URL is configured.
#[derive(Debug, Clone)]
pub struct KrokiLoader {
    url: Option<String>,
    timeout: Duration,
}

impl KrokiLoader {
    /// Create a loader. Without a URL, loading fails as unavailable.
    #[must_use]
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl EngineLoader for KrokiLoader {
    type Engine = KrokiEngine;

    async fn load(&self) -> Result<KrokiEngine, EngineError> {
        match &self.url {
            Some(url) => Ok(KrokiEngine::new(url, self.timeout)),
            None => Err(EngineError::Unavailable(
                "no Kroki URL configured".to_owned(),
            )),
        }
    }
}

/// Diagram engine rendering through a Kroki server.
pub struct KrokiEngine {
    url: String,
    agent: Agent,
    directive: OnceCell<String>,
}

impl KrokiEngine {
    /// Create an engine for the server at `url`.
    #[must_use]
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            url: url.trim_end_matches('/').to_owned(),
            agent: create_agent(timeout),
            directive: OnceCell::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{KROKI_MERMAID_ENDPOINT}/svg", self.url)
    }
}

/// Mermaid `init` directive carrying the engine configuration.
fn init_directive(config: &EngineConfig) -> String {
    let init = serde_json::json!({
        "theme": config.theme,
        "securityLevel": config.security_level.as_str(),
        "fontFamily": config.font_family,
    });
    format!("%%{{init: {init}}}%%\n")
}

impl DiagramEngine for KrokiEngine {
    async fn initialize(&self, config: &EngineConfig) -> Result<(), EngineError> {
        if config.start_on_load {
            return Err(EngineError::Initialize(
                "on-load rendering is not supported".to_owned(),
            ));
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(EngineError::Initialize(format!(
                "Kroki URL must start with http:// or https://, got {}",
                self.url
            )));
        }
        self.directive
            .set(init_directive(config))
            .map_err(|_| EngineError::Initialize("engine already initialized".to_owned()))
    }

    async fn render(&self, target_id: &str, source: &str) -> Result<String, EngineError> {
        let body = match self.directive.get() {
            Some(directive) => format!("{directive}{source}"),
            None => source.to_owned(),
        };
        let agent = self.agent.clone();
        let url = self.endpoint();

        let svg = tokio::task::spawn_blocking(move || send_diagram_request(&agent, &url, &body))
            .await
            .map_err(|e| EngineError::Render(format!("render task failed: {e}")))??;

        Ok(format!(
            "<div id=\"{target_id}\" class=\"diagram\">{}</div>",
            strip_xml_prolog(&svg)
        ))
    }
}

/// Post a diagram to Kroki and return the response body.
fn send_diagram_request(agent: &Agent, url: &str, source: &str) -> Result<String, EngineError> {
    let response = agent
        .post(url)
        .header("Content-Type", "text/plain")
        .send(source.as_bytes())
        .map_err(|e| EngineError::Render(format!("HTTP error: {e}")))?;

    let status = response.status().as_u16();
    let mut body = response.into_body();

    if status >= 400 {
        let error_body = body
            .read_to_string()
            .unwrap_or_else(|_| String::from("(unable to read error body)"));
        return Err(EngineError::Render(format!("HTTP {status}: {error_body}")));
    }

    body.read_to_string()
        .map_err(|e| EngineError::Render(format!("I/O error: {e}")))
}

/// Drop a leading `<?xml ...?>` declaration so the SVG can be inlined.
fn strip_xml_prolog(svg: &str) -> &str {
    let trimmed = svg.trim_start();
    if trimmed.starts_with("<?xml")
        && let Some(end) = trimmed.find("?>")
    {
        return trimmed[end + 2..].trim_start();
    }
    trimmed
}
