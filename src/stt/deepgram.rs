use super::{Recognizer, RecognizerEvent, RecognizerParams, RecognizerSession, RecognizerSink};
use anyhow::{Context, Result};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

const DEFAULT_ENDPOINT: &str = "wss://api.deepgram.com/v1/listen";

/// Buffered recognizer events before the relay task backpressures the reader
const EVENT_CHANNEL_CAPACITY: usize = 32;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Deepgram live-transcription client.
///
/// One WebSocket per audio track: raw PCM goes out as binary frames, result
/// events come back as JSON text frames.
pub struct DeepgramRecognizer {
    api_key: String,
    endpoint: String,
}

impl DeepgramRecognizer {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(api_key: String, endpoint: String) -> Self {
        Self { api_key, endpoint }
    }

    fn listen_url(&self, params: &RecognizerParams) -> String {
        format!(
            "{}?model={}&language={}&smart_format={}&encoding={}&sample_rate={}&channels={}",
            self.endpoint,
            params.model,
            params.language,
            params.smart_format,
            params.encoding,
            params.sample_rate,
            params.channels
        )
    }
}

/// Subset of the vendor result message this crate cares about
#[derive(Debug, Deserialize)]
struct DeepgramMessage {
    #[serde(rename = "type")]
    kind: Option<String>,
    channel: Option<DeepgramChannel>,
}

#[derive(Debug, Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

fn parse_event(text: &str) -> Option<RecognizerEvent> {
    let message: DeepgramMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            warn!("unparseable recognizer message: {}", e);
            return None;
        }
    };

    match message.kind.as_deref() {
        Some("Results") | None => {
            let alternative = message
                .channel
                .as_ref()
                .and_then(|c| c.alternatives.first())?;
            Some(RecognizerEvent::Transcript {
                text: alternative.transcript.clone(),
            })
        }
        Some("Metadata") => None,
        Some(other) => {
            debug!("ignoring recognizer message type {:?}", other);
            None
        }
    }
}

struct DeepgramSink {
    write: WsSink,
    closed: bool,
}

#[async_trait::async_trait]
impl RecognizerSink for DeepgramSink {
    async fn send(&mut self, pcm: &[u8]) -> Result<()> {
        self.write
            .send(Message::Binary(pcm.to_vec()))
            .await
            .context("recognizer audio send failed")
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Deepgram finalizes pending audio on CloseStream before the socket
        // goes down.
        self.write
            .send(Message::Text(r#"{"type":"CloseStream"}"#.to_string()))
            .await
            .context("recognizer close-stream send failed")?;
        self.write
            .send(Message::Close(None))
            .await
            .context("recognizer close failed")
    }
}

#[async_trait::async_trait]
impl Recognizer for DeepgramRecognizer {
    async fn open(&self, params: &RecognizerParams) -> Result<RecognizerSession> {
        let url = self.listen_url(params);
        let mut request = url
            .clone()
            .into_client_request()
            .context("invalid recognizer endpoint")?;
        request.headers_mut().insert(
            "Authorization",
            format!("Token {}", self.api_key)
                .parse()
                .context("invalid recognizer credential")?,
        );

        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .context("failed to connect to recognizer")?;
        info!("recognizer connection established");

        let (write, mut read) = ws_stream.split();
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        // Read side: turn vendor frames into typed events until the socket
        // closes. The channel closing is the bridge's end-of-stream signal.
        tokio::spawn(async move {
            if event_tx.send(RecognizerEvent::Open).await.is_err() {
                return;
            }

            while let Some(message) = read.next().await {
                let message = match message {
                    Ok(m) => m,
                    Err(e) => {
                        error!("recognizer read failed: {}", e);
                        let _ = event_tx.send(RecognizerEvent::Error(e.to_string())).await;
                        break;
                    }
                };

                match message {
                    Message::Text(text) => {
                        if let Some(event) = parse_event(&text) {
                            if event_tx.send(event).await.is_err() {
                                break;
                            }
                        }
                    }
                    Message::Close(reason) => {
                        info!("recognizer connection closed: {:?}", reason);
                        break;
                    }
                    Message::Binary(bin) => {
                        warn!("unexpected binary message from recognizer ({} bytes)", bin.len());
                    }
                    _ => {}
                }
            }

            let _ = event_tx.send(RecognizerEvent::Closed).await;
        });

        Ok(RecognizerSession {
            sink: Box::new(DeepgramSink {
                write,
                closed: false,
            }),
            events: event_rx,
        })
    }
}
