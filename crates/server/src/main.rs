use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use controller::{ListController, SessionRegistry};
use serde::Deserialize;
use shared::{
    domain::{RenderId, UserId},
    error::{ApiError, ErrorCode},
    protocol::{Action, Intent, RenderInstruction},
};
use storage::WordStore;
use tracing::{error, info, warn};

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    controller: ListController,
    storage: WordStore,
    api_token: Option<String>,
}

/// A choice the user tapped on a rendered screen: the opaque action token
/// comes back verbatim together with the screen it was tapped on.
#[derive(Debug, Deserialize)]
struct CallbackRequest {
    user_id: i64,
    render_id: i64,
    data: String,
}

/// Free-form text the user typed. Only meaningful while an add session is
/// awaiting input; `message_render_id` identifies the user's own message so
/// the renderer can clean it up afterwards.
#[derive(Debug, Deserialize)]
struct TextRequest {
    user_id: i64,
    message_render_id: Option<i64>,
    text: String,
}

/// Top-level command ("start" / "menu"), always drawn as a fresh screen.
#[derive(Debug, Deserialize)]
struct CommandRequest {
    user_id: i64,
    command: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = load_settings();
    tracing_subscriber::fmt()
        .with_env_filter(settings.log_filter.clone())
        .init();

    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = WordStore::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let controller = ListController::new(storage.clone(), SessionRegistry::new());

    let state = AppState {
        controller,
        storage,
        api_token: settings.api_token.clone(),
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/command", post(command))
        .route("/callback", post(callback))
        .route("/text", post(submit_text))
        .with_state(state)
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.storage.health_check().await.map_err(internal)?;
    Ok("ok")
}

async fn command(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CommandRequest>,
) -> Result<Json<RenderInstruction>, (StatusCode, Json<ApiError>)> {
    require_auth(&state, &headers)?;
    match req.command.as_str() {
        "start" | "menu" => {}
        other => {
            return Err(validation(format!("unknown command '{other}'")));
        }
    }

    let instruction = state
        .controller
        .handle(UserId(req.user_id), None, Intent::ShowMainMenu)
        .await
        .map_err(internal)?;
    Ok(Json(instruction))
}

async fn callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<RenderInstruction>, (StatusCode, Json<ApiError>)> {
    require_auth(&state, &headers)?;

    let Some(action) = Action::parse(&req.data) else {
        warn!(user_id = req.user_id, data = %req.data, "malformed callback payload");
        return Err(validation("malformed action token"));
    };

    let instruction = state
        .controller
        .handle(
            UserId(req.user_id),
            Some(RenderId(req.render_id)),
            intent_for(action),
        )
        .await
        .map_err(internal)?;
    Ok(Json(instruction))
}

async fn submit_text(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<TextRequest>,
) -> Result<Json<RenderInstruction>, (StatusCode, Json<ApiError>)> {
    require_auth(&state, &headers)?;

    let instruction = state
        .controller
        .handle(
            UserId(req.user_id),
            req.message_render_id.map(RenderId),
            Intent::SubmitAddText { text: req.text },
        )
        .await
        .map_err(internal)?;
    Ok(Json(instruction))
}

fn intent_for(action: Action) -> Intent {
    match action {
        Action::ShowMainMenu => Intent::ShowMainMenu,
        Action::EditList(list) => Intent::OpenListEditor { list },
        Action::StartAdd(list) => Intent::StartAdd { list },
        Action::RemovalPicker(list) => Intent::RequestRemovalPicker { list },
        Action::RemoveAt(list, index) => Intent::RemoveByPosition { list, index },
        Action::ClearList(list) => Intent::ClearList { list },
        Action::Roll => Intent::Roll,
        Action::Back => Intent::Back,
        Action::BackToEditor(list) => Intent::BackToEditor { list },
    }
}

fn require_auth(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(), (StatusCode, Json<ApiError>)> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected) {
        Ok(())
    } else {
        Err((
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(
                ErrorCode::Unauthorized,
                "missing or invalid bearer token",
            )),
        ))
    }
}

fn validation(message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn internal(err: anyhow::Error) -> (StatusCode, Json<ApiError>) {
    error!(%err, "intent handling failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(ErrorCode::Internal, err.to_string())),
    )
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
