use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use moodmate_config::{DialogueConfig, GatewayConfig};
use moodmate_core::{
    Conversation, ConversationHandle, HistoryStore, MemoryStore, RandomJokes, Reply,
};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{error, info, warn};

use crate::chart::BarChart;
use crate::markdown::{markdown_to_html, strip_markup};
use crate::presenter::{Presenter, Sender, Surface};
use crate::web_assets;

/// Serves the chat widget. Every websocket connection is its own session,
/// so reloading the page starts over.
pub struct WebChannel {
    gateway_config: GatewayConfig,
    reply_delay: Duration,
    shutdown_tx: Mutex<Option<oneshot::Sender<()>>>,
}

#[derive(Clone)]
struct AppState {
    reply_delay: Duration,
}

#[derive(Serialize)]
struct WsOutMsg {
    #[serde(rename = "type")]
    msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sender: Option<Sender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chart: Option<BarChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
}

impl WsOutMsg {
    fn of_type(msg_type: &str) -> Self {
        Self {
            msg_type: msg_type.to_string(),
            sender: None,
            content: None,
            speech: None,
            chart: None,
            timestamp: None,
        }
    }
}

#[derive(Deserialize)]
struct WsInMsg {
    #[serde(rename = "type")]
    msg_type: String,
    #[serde(default)]
    content: String,
}

/// Surface that turns messages into websocket frames.
struct WebSurface {
    tx: mpsc::UnboundedSender<Message>,
}

impl WebSurface {
    fn send(&self, msg: &WsOutMsg) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_| anyhow::anyhow!("websocket writer closed"))
    }
}

impl Surface for WebSurface {
    fn append(&mut self, sender: Sender, text: &str) -> Result<()> {
        let mut msg = WsOutMsg::of_type("message");
        msg.sender = Some(sender);
        msg.content = Some(markdown_to_html(text));
        if sender == Sender::Bot {
            msg.speech = Some(strip_markup(text));
        }
        msg.timestamp = Some(chrono::Local::now().to_rfc3339());
        self.send(&msg)
    }

    fn chart(&mut self, chart: &BarChart) -> Result<()> {
        let mut msg = WsOutMsg::of_type("chart");
        msg.chart = Some(chart.clone());
        self.send(&msg)
    }
}

impl WebChannel {
    pub fn new(gateway_config: GatewayConfig, dialogue: &DialogueConfig) -> Self {
        Self {
            gateway_config,
            reply_delay: Duration::from_millis(dialogue.reply_delay_ms),
            shutdown_tx: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        "web"
    }

    /// Bind and serve in the background. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let state = AppState {
            reply_delay: self.reply_delay,
        };

        let router = Router::new()
            .route("/", get(serve_index))
            .route("/style.css", get(serve_css))
            .route("/app.js", get(serve_js))
            .route("/ws", get(ws_upgrade))
            .with_state(state);

        let addr: SocketAddr = format!("{}:{}", self.gateway_config.host, self.gateway_config.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid gateway listen address: {e}"))?;

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let bound = listener.local_addr()?;
        info!("Web channel listening on http://{bound}");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        *self.shutdown_tx.lock().await = Some(shutdown_tx);

        tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            });

            if let Err(e) = server.await {
                error!("Web server error: {e}");
            }
        });

        Ok(bound)
    }

    pub async fn stop(&self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(());
        }
        Ok(())
    }
}

// --- Axum Handlers ---

async fn serve_index() -> Html<&'static str> {
    Html(web_assets::INDEX_HTML)
}

async fn serve_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], web_assets::STYLE_CSS)
}

async fn serve_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript")],
        web_assets::APP_JS,
    )
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
        .into_response()
}

async fn handle_ws(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let short_conn = &conn_id[..8];
    info!("WebSocket connected: conn={short_conn}");

    let (ws_write, mut ws_read) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<Message>();

    let write_conn_id = conn_id.clone();
    let write_handle = tokio::spawn(ws_write_loop(ws_write, rx, write_conn_id));

    let surface = WebSurface { tx: tx.clone() };
    if let Err(e) = surface.send(&WsOutMsg::of_type("connected")) {
        warn!("Failed to acknowledge conn={short_conn}: {e}");
    }

    let (handle, mut replies) = spawn_session(state.reply_delay);

    let present_conn_id = conn_id.clone();
    let present_handle = tokio::spawn(async move {
        // Speech happens in the browser
        let mut presenter = Presenter::new(surface, None);
        while let Some(reply) = replies.recv().await {
            if let Err(e) = forward_reply(&mut presenter, &reply) {
                warn!("Dropping replies for conn={present_conn_id}: {e}");
                break;
            }
        }
    });

    // Read loop
    while let Some(result) = ws_read.next().await {
        let msg = match result {
            Ok(m) => m,
            Err(e) => {
                warn!("WebSocket read error for conn={short_conn}: {e}");
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                let parsed: WsInMsg = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(_) => continue,
                };
                if let Some(Err(e)) = route(parsed, &handle) {
                    error!("Failed to queue input for conn={short_conn}: {e}");
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Cleanup
    drop(handle);
    present_handle.abort();
    write_handle.abort();
    info!("WebSocket disconnected: conn={short_conn}");
}

/// One conversation per connection, on fresh storage like a reloaded page.
fn spawn_session(reply_delay: Duration) -> (ConversationHandle, mpsc::UnboundedReceiver<Reply>) {
    let conversation = Conversation::new(
        HistoryStore::new(MemoryStore::new()),
        Box::new(RandomJokes::new()),
    );
    ConversationHandle::spawn(conversation, reply_delay)
}

/// Queue an inbound frame on the conversation. `None` when the frame is
/// dropped: blank messages and unknown types.
fn route(msg: WsInMsg, handle: &ConversationHandle) -> Option<Result<()>> {
    match msg.msg_type.as_str() {
        "message" if !msg.content.trim().is_empty() => Some(handle.submit(msg.content)),
        "restart" => Some(handle.restart()),
        _ => None,
    }
}

/// A `reset` frame precedes the first reply of every fresh session, so the
/// page clears only after older replies have arrived.
fn forward_reply(presenter: &mut Presenter<WebSurface>, reply: &Reply) -> Result<()> {
    if reply.restarted {
        presenter.surface().send(&WsOutMsg::of_type("reset"))?;
    }
    presenter.present(&reply.outputs)
}

async fn ws_write_loop(
    mut ws_write: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
    conn_id: String,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = ws_write.send(msg).await {
            warn!("WebSocket write error for conn={conn_id}: {e}");
            break;
        }
    }
}
