use std::future::Future;
use std::sync::{atomic::AtomicBool, atomic::Ordering, Arc};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{Client, Response};

use crate::config::OllamaApiConfig;
use crate::error::{parse_error_message, OllamaApiError};
use crate::events::{ChatDone, ChatStreamEvent};
use crate::ndjson::NdjsonStreamParser;
use crate::payload::ChatRequest;
use crate::url::normalize_chat_url;

/// Optional cancellation signal shared across request and stream loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

#[derive(Debug)]
pub struct OllamaApiClient {
    http: Client,
    config: OllamaApiConfig,
}

#[derive(Debug, Clone)]
pub struct StreamResult {
    pub events: Vec<ChatStreamEvent>,
    pub done: Option<ChatDone>,
}

impl OllamaApiClient {
    pub fn new(config: OllamaApiConfig) -> Result<Self, OllamaApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(OllamaApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &OllamaApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_url(&self.config.base_url)
    }

    pub fn build_request(
        &self,
        request: &ChatRequest,
    ) -> Result<reqwest::RequestBuilder, OllamaApiError> {
        let payload = self.request_with_transport_defaults(request);
        Ok(self.http.post(self.normalized_endpoint()).json(&payload))
    }

    fn request_with_transport_defaults(&self, request: &ChatRequest) -> ChatRequest {
        let mut payload = request.clone();
        payload.stream = true;
        if payload.keep_alive.is_none() {
            payload.keep_alive = self.config.keep_alive.clone();
        }
        payload
    }

    /// Send a chat request and return the raw streaming response.
    ///
    /// Failures are returned as-is; there is no transport-level retry, so a
    /// failed call is only re-issued when the user resubmits.
    pub async fn send(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<Response, OllamaApiError> {
        if is_cancelled(cancellation) {
            return Err(OllamaApiError::Cancelled);
        }

        let response = self.build_request(request)?.send();
        let response = await_or_cancel(response, cancellation)
            .await?
            .map_err(OllamaApiError::from)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = await_or_cancel(response.text(), cancellation)
            .await?
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(OllamaApiError::Status(
            status,
            parse_error_message(status, &body),
        ))
    }

    pub async fn stream_with_handler<F>(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
        mut on_event: F,
    ) -> Result<Option<ChatDone>, OllamaApiError>
    where
        F: FnMut(ChatStreamEvent),
    {
        let response = self.send(request, cancellation).await?;
        let mut bytes = response.bytes_stream();
        let mut parser = NdjsonStreamParser::default();
        let mut done = None;

        loop {
            let Some(chunk) = await_or_cancel(bytes.next(), cancellation).await? else {
                break;
            };
            if is_cancelled(cancellation) {
                return Err(OllamaApiError::Cancelled);
            }
            let chunk = chunk.map_err(OllamaApiError::from)?;
            for event in parser.feed(&chunk) {
                process_stream_event(event, &mut done, &mut on_event)?;
            }
        }

        if let Some(event) = parser.finish() {
            process_stream_event(event, &mut done, &mut on_event)?;
        }

        if is_cancelled(cancellation) {
            return Err(OllamaApiError::Cancelled);
        }

        Ok(done)
    }

    pub async fn stream(
        &self,
        request: &ChatRequest,
        cancellation: Option<&CancellationSignal>,
    ) -> Result<StreamResult, OllamaApiError> {
        let mut events = Vec::new();
        let done = self
            .stream_with_handler(request, cancellation, |event| {
                events.push(event);
            })
            .await?;

        Ok(StreamResult { events, done })
    }
}

fn process_stream_event<F>(
    event: ChatStreamEvent,
    done: &mut Option<ChatDone>,
    on_event: &mut F,
) -> Result<(), OllamaApiError>
where
    F: FnMut(ChatStreamEvent),
{
    match &event {
        ChatStreamEvent::StreamError { message } => {
            return Err(OllamaApiError::StreamFailed {
                message: message.clone(),
            });
        }
        ChatStreamEvent::Malformed { line } => {
            return Err(OllamaApiError::MalformedChunk(line.clone()));
        }
        ChatStreamEvent::Done(info) => {
            *done = Some(*info);
        }
        ChatStreamEvent::MessageDelta { .. } => {}
    }

    on_event(event);
    Ok(())
}

fn is_cancelled(cancel: Option<&CancellationSignal>) -> bool {
    cancel.is_some_and(|token| token.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, OllamaApiError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(OllamaApiError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(OllamaApiError::Cancelled);
            }
            return Ok(output);
        }
    }
}
