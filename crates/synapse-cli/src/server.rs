use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use synapse_core::{
    NetworkSizes, RawConcept, SampleKey, SimulatedActivationPayload, catalog, lenient_concepts,
    normalize_indexed_concepts,
};
use synapse_llm::{DEFAULT_PROMPT, ExplainInput, OpenRouterClient};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::Config;

const DEFAULT_CREATIVITY: f64 = 0.4;

const SIMULATE_FAILURE: &str = "The LLM could not produce a simulation plan. Adjust your prompt or verify the OpenRouter credentials.";

pub struct AppState {
    pub llm: OpenRouterClient,
    pub sizes: NetworkSizes,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = OpenRouterClient::new(config.llm.clone()).context("failed to build LLM client")?;
        Ok(Self {
            llm,
            sizes: config.server.sizes(),
        })
    }
}

// --- Errors ---

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or incomplete request body.
    InvalidInput(String),
    /// The LLM call failed; safe to retry.
    UpstreamGenerationFailure(String),
    Internal(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InvalidInput(msg)
            | ApiError::UpstreamGenerationFailure(msg)
            | ApiError::Internal(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamGenerationFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("rejecting request body: {e}");
        ApiError::InvalidInput("Invalid JSON payload.".to_string())
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// --- Request types ---

#[derive(Debug, Default, Deserialize)]
pub struct SampleQuery {
    sample: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub prompt: Option<String>,
    pub creativity: Option<f64>,
    pub language_hint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub sample_id: Option<String>,
    pub text: Option<String>,
    pub context: Option<String>,
    #[serde(default, deserialize_with = "lenient_concepts")]
    pub concepts: Vec<RawConcept>,
}

// --- Scenario operations shared with the CLI ---

/// Ask the LLM for a plan and turn it into a payload.
pub async fn simulate_scenario(
    llm: &OpenRouterClient,
    sizes: NetworkSizes,
    request: SimulateRequest,
) -> Result<SimulatedActivationPayload, ApiError> {
    let prompt = non_empty(request.prompt.as_deref()).unwrap_or(DEFAULT_PROMPT);
    let creativity = request
        .creativity
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CREATIVITY)
        .clamp(0.0, 1.0);
    let language_hint = non_empty(request.language_hint.as_deref());

    let plan = llm
        .simulation_plan(prompt, language_hint, creativity)
        .await
        .map_err(|e| {
            tracing::error!("simulation plan failed: {e}");
            ApiError::UpstreamGenerationFailure(SIMULATE_FAILURE.to_string())
        })?;

    let sample_id = format!("llm-{}", Uuid::new_v4().simple());
    tracing::info!(
        sample_id = %sample_id,
        concepts = plan.concepts.len(),
        "generated scenario plan"
    );
    plan.into_payload(sample_id, sizes)
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// Ask the LLM to explain an already-rendered scenario.
pub async fn explain_scenario(
    llm: &OpenRouterClient,
    request: ExplainRequest,
) -> Result<String, ApiError> {
    let text = non_empty(request.text.as_deref())
        .ok_or_else(|| ApiError::InvalidInput("Sample text is required.".to_string()))?
        .to_string();

    let input = ExplainInput {
        sample_id: request.sample_id.unwrap_or_else(|| "unknown".to_string()),
        text,
        context: non_empty(request.context.as_deref()).map(str::to_string),
        concepts: normalize_indexed_concepts(&request.concepts),
    };

    let explanation = llm.explain(&input).await.map_err(|e| {
        tracing::error!("explanation failed: {e}");
        ApiError::UpstreamGenerationFailure(format!(
            "Failed to obtain an explanation from the LLM. ({e})"
        ))
    })?;
    Ok(explanation.trim().to_string())
}

// --- Handlers ---

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_samples() -> impl IntoResponse {
    Json(catalog())
}

async fn sim_synapse(Query(query): Query<SampleQuery>) -> Json<SimulatedActivationPayload> {
    let key = SampleKey::resolve(query.sample.as_deref());
    Json(key.definition().simulate())
}

async fn llm_simulate(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SimulatedActivationPayload>, ApiError> {
    let request: SimulateRequest = parse_body(&body)?;
    let payload = simulate_scenario(&state.llm, state.sizes, request).await?;
    Ok(Json(payload))
}

async fn llm_explain(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, ApiError> {
    let request: ExplainRequest = parse_body(&body)?;
    let explanation = explain_scenario(&state.llm, request).await?;
    Ok(Json(serde_json::json!({ "explanation": explanation })))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/samples", get(list_samples))
        .route("/api/sim-synapse", get(sim_synapse))
        .route("/api/llm-simulate", post(llm_simulate))
        .route("/api/llm-explain", post(llm_explain))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already-bound listener until `shutdown` is cancelled.
pub async fn serve_on(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    tracing::info!("Synapse Monitor listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

pub async fn run(config: &Config, shutdown: CancellationToken) -> Result<()> {
    let state = Arc::new(AppState::from_config(config)?);
    if !state.llm.config().has_api_key() {
        tracing::warn!("OPENROUTER_API_KEY is not set; LLM routes will answer 502");
    }

    let listener = TcpListener::bind(config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    serve_on(listener, state, shutdown).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use synapse_llm::LlmConfig;

    /// Mock chat-completions endpoint that always answers `content`.
    async fn spawn_upstream(status: StatusCode, content: &str) -> String {
        let reply = serde_json::json!({
            "choices": [{ "message": { "content": content } }]
        })
        .to_string();
        let app = Router::new().route(
            "/chat/completions",
            post(move || {
                let reply = reply.clone();
                async move { (status, reply) }
            }),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}/chat/completions")
    }

    struct TestServer {
        addr: SocketAddr,
        shutdown: CancellationToken,
    }

    impl TestServer {
        fn url(&self, path: &str) -> String {
            format!("http://{}{path}", self.addr)
        }
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            self.shutdown.cancel();
        }
    }

    async fn start(llm: LlmConfig, sizes: NetworkSizes) -> TestServer {
        let state = Arc::new(AppState {
            llm: OpenRouterClient::new(llm).unwrap(),
            sizes,
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = CancellationToken::new();
        tokio::spawn(serve_on(listener, state, shutdown.clone()));
        TestServer { addr, shutdown }
    }

    fn keyed(api_url: String) -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".into()),
            api_url,
            timeout_secs: 5,
            ..Default::default()
        }
    }

    const PLAN: &str = r#"{
        "title": "Currency",
        "primary_text": "The dollar rose.",
        "alternate_text": "Le dollar a monté.",
        "context": "FX move.",
        "concepts": [{"label": "Currency Synapse", "description": "money", "intensity": 1.4}],
        "transformer_seed": "usd",
        "hatchling_seed": "currency-cross-lingual",
        "language": "English"
    }"#;

    #[tokio::test]
    async fn test_health_and_samples() {
        let server = start(LlmConfig::default(), NetworkSizes::default()).await;
        let health: serde_json::Value = reqwest::get(server.url("/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");

        let samples: serde_json::Value = reqwest::get(server.url("/api/samples"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(samples[0]["id"], "sample4");
        assert_eq!(samples.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_sim_synapse_lookup_and_fallback() {
        let server = start(LlmConfig::default(), NetworkSizes::default()).await;

        let payload: SimulatedActivationPayload =
            reqwest::get(server.url("/api/sim-synapse?sample=sample3"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(payload.sample_id, "sample3");
        assert_eq!(payload.hatchling.activations[72], 0.88);

        let fallback: SimulatedActivationPayload =
            reqwest::get(server.url("/api/sim-synapse?sample=nope"))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(fallback.sample_id, "sample1");

        let default: SimulatedActivationPayload = reqwest::get(server.url("/api/sim-synapse"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(default, fallback);
    }

    #[tokio::test]
    async fn test_llm_simulate_assembles_payload() {
        let upstream = spawn_upstream(StatusCode::OK, PLAN).await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;

        let response = reqwest::Client::new()
            .post(server.url("/api/llm-simulate"))
            .body(r#"{"prompt": "currency", "creativity": 7}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let payload: SimulatedActivationPayload = response.json().await.unwrap();

        assert!(payload.sample_id.starts_with("llm-"));
        assert_eq!(payload.generated_by.as_deref(), Some("openrouter"));
        assert_eq!(payload.title.as_deref(), Some("Currency"));
        assert_eq!(
            payload.context,
            "FX move.\n\nAlternate phrasing: Le dollar a monté."
        );
        let concept = &payload.hatchling.concepts[0];
        assert_eq!(concept.index, 122);
        assert_eq!(concept.intensity, 1.0);
        assert_eq!(payload.hatchling.activations[122], 1.0);
    }

    #[tokio::test]
    async fn test_llm_simulate_respects_configured_sizes() {
        let upstream = spawn_upstream(StatusCode::OK, PLAN).await;
        let sizes = NetworkSizes {
            transformer: 32,
            hatchling: 16,
        };
        let server = start(keyed(upstream), sizes).await;

        let payload: SimulatedActivationPayload = reqwest::Client::new()
            .post(server.url("/api/llm-simulate"))
            .body("{}")
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(payload.transformer.activations.len(), 32);
        assert_eq!(payload.hatchling.activations.len(), 16);
        assert!(payload.hatchling.concepts[0].index < 16);
    }

    #[tokio::test]
    async fn test_llm_simulate_tolerates_null_plan_fields() {
        let plan = r#"{"title": null, "concepts": null, "hatchling_seed": null}"#;
        let upstream = spawn_upstream(StatusCode::OK, plan).await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;

        let response = reqwest::Client::new()
            .post(server.url("/api/llm-simulate"))
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body.get("title").is_none());
        assert_eq!(body["hatchling"]["concepts"][0]["label"], "Fallback Concept");
        assert_eq!(body["hatchling"]["concepts"][0]["index"], 42);
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let server = start(LlmConfig::default(), NetworkSizes::default()).await;
        for path in ["/api/llm-simulate", "/api/llm-explain"] {
            let response = reqwest::Client::new()
                .post(server.url(path))
                .body("{not json")
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), 400);
            let body: serde_json::Value = response.json().await.unwrap();
            assert_eq!(body["error"], "Invalid JSON payload.");
        }
    }

    #[tokio::test]
    async fn test_missing_key_is_502() {
        let server = start(LlmConfig::default(), NetworkSizes::default()).await;
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-simulate"))
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 502);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], SIMULATE_FAILURE);
    }

    #[tokio::test]
    async fn test_prose_plan_is_502() {
        let upstream = spawn_upstream(StatusCode::OK, "I cannot do that.").await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-simulate"))
            .body("{}")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 502);
    }

    #[tokio::test]
    async fn test_explain_requires_text() {
        let server = start(LlmConfig::default(), NetworkSizes::default()).await;
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-explain"))
            .body(r#"{"sampleId": "sample1", "text": "   "}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Sample text is required.");
    }

    #[tokio::test]
    async fn test_explain_returns_explanation() {
        let upstream = spawn_upstream(StatusCode::OK, "  The currency neuron fired.  ").await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;
        let body = serde_json::json!({
            "sampleId": "sample1",
            "text": "The US Dollar has appreciated.",
            "concepts": [{"index": 42, "label": "Currency Synapse", "description": "money", "intensity": 1}]
        });
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-explain"))
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["explanation"], "The currency neuron fired.");
    }

    #[tokio::test]
    async fn test_explain_accepts_loose_concepts() {
        let upstream = spawn_upstream(StatusCode::OK, "ok").await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;
        let body = serde_json::json!({
            "text": "The US Dollar has appreciated.",
            "concepts": [
                {"index": -1, "label": "Currency Synapse"},
                {"index": 42.0, "label": 7},
                "stray"
            ]
        });
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-explain"))
            .body(body.to_string())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    #[test]
    fn test_explain_request_concepts_lenient() {
        let request: ExplainRequest = serde_json::from_str(
            r#"{"text": "x", "concepts": [{"index": -1, "label": 7}]}"#,
        )
        .unwrap();
        let concepts = normalize_indexed_concepts(&request.concepts);
        assert_eq!(concepts[0].index, 0);
        assert_eq!(concepts[0].label, "Unnamed Concept");

        let request: ExplainRequest =
            serde_json::from_str(r#"{"text": "x", "concepts": null}"#).unwrap();
        assert!(request.concepts.is_empty());
    }

    #[tokio::test]
    async fn test_explain_upstream_failure_is_502() {
        let upstream = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, "ignored").await;
        let server = start(keyed(upstream), NetworkSizes::default()).await;
        let response = reqwest::Client::new()
            .post(server.url("/api/llm-explain"))
            .body(r#"{"text": "hello"}"#)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 502);
        let body: serde_json::Value = response.json().await.unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Failed to obtain an explanation from the LLM. ("));
        assert!(message.contains("429"));
    }
}
