//! Single-page web UI
//!
//! - `GET /` renders the request form, the sidebar quick view (`?ticker=`)
//!   and, with `?query=`, a stored result
//! - `POST /analyze` runs one exchange and shows its result
//! - `POST /download` returns the stored result text as a markdown attachment
//! - `GET /health` reports liveness
//!
//! Exchanges run one at a time: the result store lock is held for the
//! whole run.

use crate::api::MarketDataSource;
use crate::config::StockConfig;
use crate::desk::StockAnalysisDesk;
use crate::error::{Result, StockError};
use crate::report::{DISCLAIMER, report_file_name};
use crate::store::ResultStore;
use crate::tools::quick_metrics;
use agent_llm::LLMProvider;
use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use chrono::Local;
use minijinja::Environment;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

const INDEX: &str = "index.html";

const INDEX_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>AI Stock Analysis Platform</title>
  <style>
    body { font-family: sans-serif; margin: 0; display: flex; }
    aside { width: 18rem; padding: 1rem; background: #f3f4f6; min-height: 100vh; }
    main { flex: 1; padding: 1rem 2rem; }
    textarea { width: 100%; }
    pre { white-space: pre-wrap; background: #fafafa; padding: 1rem; }
    .error { color: #b91c1c; }
    .disclaimer, .note { color: #6b7280; font-size: 0.85rem; }
  </style>
</head>
<body>
  <aside>
    <h3>Quick Ticker View</h3>
    <form method="get" action="/">
      <input name="ticker" value="{{ ticker or '' }}" placeholder="MSFT">
      <button type="submit">Show</button>
    </form>
    {% if ticker %}
    <h4>{{ ticker }}</h4>
    <dl>
      {% for label, value in quick %}
      <dt>{{ label }}</dt><dd>{{ value }}</dd>
      {% endfor %}
    </dl>
    {% endif %}
  </aside>
  <main>
    <h1>AI Stock Analysis Platform</h1>
    <form method="post" action="/analyze">
      <label>OpenAI API key
        <input type="password" name="api_key" placeholder="{% if has_server_key %}configured on server{% else %}sk-...{% endif %}">
      </label>
      <p>
        <textarea name="query" rows="3" placeholder="Should I invest in MSFT based on recent trends?">{{ query or '' }}</textarea>
      </p>
      <button type="submit">Run Analysis</button>
    </form>
    {% if error %}<p class="error">{{ error }}</p>{% endif %}
    {% if result %}
    <h2>Analysis Results</h2>
    <p class="note">Shown as raw markdown. The download contains the same text.</p>
    <pre>{{ result }}</pre>
    <form method="post" action="/download">
      <input type="hidden" name="query" value="{{ query }}">
      <button type="submit">Download Report</button>
    </form>
    {% endif %}
    <p class="disclaimer">{{ disclaimer }}</p>
  </main>
</body>
</html>
"#;

/// Shared state of the web UI
pub struct AppState {
    config: StockConfig,
    source: Arc<dyn MarketDataSource>,
    provider: Option<Arc<dyn LLMProvider>>,
    store: Mutex<ResultStore>,
    templates: Environment<'static>,
}

impl AppState {
    /// `config` may lack an API key; each form submission can supply one
    pub fn new(config: StockConfig, source: Arc<dyn MarketDataSource>) -> Result<Self> {
        let mut templates = Environment::new();
        templates
            .add_template(INDEX, INDEX_TEMPLATE)
            .map_err(|e| StockError::ConfigError(format!("invalid page template: {e}")))?;

        Ok(Self {
            config,
            source,
            provider: None,
            store: Mutex::new(ResultStore::new()),
            templates,
        })
    }

    /// Run every desk against `provider` instead of OpenAI
    pub fn with_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    fn desk(&self, config: StockConfig) -> Result<StockAnalysisDesk> {
        let desk = StockAnalysisDesk::new(config, self.source.clone())?;
        Ok(match &self.provider {
            Some(provider) => desk.with_provider(provider.clone()),
            None => desk,
        })
    }
}

/// Everything the page template reads
#[derive(Debug, Default, Serialize)]
struct Page {
    query: Option<String>,
    result: Option<String>,
    error: Option<String>,
    ticker: Option<String>,
    quick: Vec<(String, String)>,
    has_server_key: bool,
    disclaimer: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    ticker: Option<String>,
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    query: String,
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadForm {
    query: String,
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/download", post(download))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve the UI on `addr` until the process stops
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Web UI listening");
    axum::serve(listener, router(state)).await
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn render(state: &AppState, mut page: Page) -> Response {
    page.has_server_key = state.config.api_key().is_ok();
    page.disclaimer = DISCLAIMER;

    match state.templates.get_template(INDEX).and_then(|t| t.render(&page)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!(error = %e, "Template render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Template error: {e}")).into_response()
        }
    }
}

async fn index(State(state): State<Arc<AppState>>, Query(params): Query<PageParams>) -> Response {
    let mut page = Page::default();

    if let Some(ticker) = non_blank(params.ticker) {
        let ticker = ticker.to_uppercase();
        page.quick = quick_metrics(state.source.as_ref(), &ticker).await;
        page.ticker = Some(ticker);
    }

    if let Some(query) = params.query {
        page.result = state
            .store
            .lock()
            .await
            .get(&query)
            .map(|r| r.result_text.clone());
        page.query = Some(query);
    }

    render(&state, page)
}

async fn analyze(State(state): State<Arc<AppState>>, Form(form): Form<AnalyzeForm>) -> Response {
    let config = state.config.clone().with_api_key(form.api_key);
    let mut page = Page {
        query: Some(form.query.clone()),
        ..Page::default()
    };

    if config.api_key().is_err() {
        page.error = Some("⚠️ Please provide your OpenAI API key".to_string());
        return render(&state, page);
    }
    if form.query.trim().is_empty() {
        page.error = Some("Please enter an analysis request".to_string());
        return render(&state, page);
    }

    let prepared = state.desk(config).and_then(|desk| {
        let chat = desk.prepare()?;
        Ok((desk, chat))
    });
    let (desk, chat) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            warn!(error = %e, "Desk setup failed");
            page.error = Some(format!("Could not start the analysis: {e}"));
            return render(&state, page);
        }
    };

    let mut store = state.store.lock().await;
    let text = desk.analyze_prepared(&chat, &form.query).await;
    page.result = Some(store.record(&form.query, text).result_text.clone());
    drop(store);

    render(&state, page)
}

async fn download(State(state): State<Arc<AppState>>, Form(form): Form<DownloadForm>) -> Response {
    let store = state.store.lock().await;
    let Some(result) = store.get(&form.query) else {
        return (StatusCode::NOT_FOUND, "No analysis found for this request").into_response();
    };

    let file_name = report_file_name(Local::now());
    info!(file = %file_name, "Serving report download");
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file_name}\"")),
        ],
        result.result_text.clone(),
    )
        .into_response()
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
