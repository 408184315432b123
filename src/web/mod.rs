pub mod history;
pub mod page;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::agent::BlogAgent;
use history::History;

/// Shared state of one interactive session. The pipeline never sees the history.
#[derive(Clone)]
pub struct AppState {
    agent: Arc<BlogAgent>,
    history: Arc<Mutex<History>>,
}

impl AppState {
    pub fn new(agent: BlogAgent) -> Self {
        Self {
            agent: Arc::new(agent),
            history: Arc::new(Mutex::new(History::new())),
        }
    }
}

#[derive(Deserialize)]
struct GenerateForm {
    #[serde(default)]
    topic: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate))
        .route("/clear", post(clear))
        .route("/posts/:id/download", get(download))
        .with_state(state)
}

pub async fn serve(agent: BlogAgent, addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    tracing::info!(addr, "interactive form listening");

    axum::serve(listener, router(AppState::new(agent)))
        .await
        .context("Server error")?;

    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let history = state.history.lock().await;
    Html(page::render(&history, None, state.agent.model()))
}

async fn generate(State(state): State<AppState>, Form(form): Form<GenerateForm>) -> Response {
    let topic = form.topic.trim();
    if topic.is_empty() {
        let history = state.history.lock().await;
        let body = page::render(&history, Some("Please enter a blog topic"), state.agent.model());
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response();
    }

    let content = state.agent.create_post(topic).await;
    let mut history = state.history.lock().await;
    let entry = history.push(topic, content);
    tracing::info!(id = %entry.id, topic, "post added to history");

    Redirect::to("/").into_response()
}

async fn clear(State(state): State<AppState>) -> Redirect {
    state.history.lock().await.clear();
    tracing::info!("history cleared");
    Redirect::to("/")
}

async fn download(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    let history = state.history.lock().await;
    match history.get(id) {
        Some(entry) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", entry.filename()),
                ),
            ],
            entry.content.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "No such post").into_response(),
    }
}
