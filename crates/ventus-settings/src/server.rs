//! Settings web page and top-speed query endpoint.
//!
//! | Route | Behaviour |
//! |---|---|
//! | `GET /` | HTML form showing the current top speed |
//! | `POST /` | Form field `top_speed`; an integer in bounds is stored, anything else is ignored. Always answers 200 with the page |
//! | `GET /get_top_speed_api` | `{"top_speed": <n>}` |

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::response::Html;
use axum::routing::get;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::cell::TopSpeedCell;
use crate::error::TopSpeedError;
use crate::{DEFAULT_SETTINGS_PORT, TOP_SPEED_API_PATH};

/// Body of the query endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSpeedResponse {
    /// Current top speed (mph)
    pub top_speed: u32,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsForm {
    #[serde(default)]
    top_speed: Option<String>,
}

/// Build the settings router over `cell`.
pub fn settings_router(cell: TopSpeedCell) -> Router {
    Router::new()
        .route("/", get(show_settings).post(update_settings))
        .route(TOP_SPEED_API_PATH, get(top_speed_api))
        .with_state(cell)
}

async fn show_settings(State(cell): State<TopSpeedCell>) -> Html<String> {
    Html(render_page(&cell))
}

async fn update_settings(
    State(cell): State<TopSpeedCell>,
    form: Result<Form<SettingsForm>, FormRejection>,
) -> Html<String> {
    let raw = match form {
        Ok(Form(SettingsForm { top_speed: Some(raw) })) => raw,
        Ok(Form(SettingsForm { top_speed: None })) => {
            warn!("Settings form submitted without top_speed");
            return Html(render_page(&cell));
        }
        Err(rejection) => {
            warn!("Ignoring unreadable settings form: {rejection}");
            return Html(render_page(&cell));
        }
    };

    match raw.trim().parse::<i64>() {
        Ok(value) => match cell.set(value) {
            Ok(()) => info!(top_speed = value, "Top speed updated"),
            Err(e) => warn!(retained = cell.get(), "Ignoring top speed: {e}"),
        },
        Err(_) => warn!(input = %raw, retained = cell.get(), "Ignoring non-integer top speed"),
    }
    Html(render_page(&cell))
}

async fn top_speed_api(State(cell): State<TopSpeedCell>) -> Json<TopSpeedResponse> {
    Json(TopSpeedResponse {
        top_speed: cell.get(),
    })
}

fn render_page(cell: &TopSpeedCell) -> String {
    let bounds = cell.bounds();
    let current = cell.get();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Ventus wind settings</title>
</head>
<body>
<h1>Wind settings</h1>
<p>Current top speed: <strong id="current">{current}</strong> mph</p>
<form method="post" action="/">
<label for="top_speed">Top speed (mph)</label>
<input type="number" id="top_speed" name="top_speed" min="{min}" max="{max}" value="{current}" required>
<button type="submit">Save</button>
</form>
</body>
</html>
"#,
        min = bounds.min,
        max = bounds.max,
    )
}

/// A settings server running on a background task.
///
/// Dropping the handle leaves the server running; call
/// [`shutdown`](Self::shutdown) to stop it.
#[derive(Debug)]
pub struct SettingsServer {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl SettingsServer {
    /// Default bind address, all interfaces on port 5000.
    pub const fn default_addr() -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_SETTINGS_PORT))
    }

    /// Bind `addr` and serve the settings routes on a spawned task.
    ///
    /// # Errors
    ///
    /// Returns [`TopSpeedError::Bind`] if the address cannot be bound.
    pub async fn spawn(addr: SocketAddr, cell: TopSpeedCell) -> Result<Self, TopSpeedError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| TopSpeedError::Bind { addr, source })?;
        let local_addr = listener.local_addr().unwrap_or(addr);
        let app = settings_router(cell);

        info!(%local_addr, "Settings server listening");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Settings server error: {e}");
            }
        });

        Ok(Self { local_addr, handle })
    }

    /// Address the server is bound to (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop serving and wait for the task to finish.
    pub async fn shutdown(self) {
        self.handle.abort();
        if let Err(e) = self.handle.await
            && !e.is_cancelled()
        {
            error!("Settings server task failed: {e}");
        }
        info!("Settings server stopped");
    }
}
