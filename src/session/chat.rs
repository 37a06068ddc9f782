//! The chat session state machine.
//!
//! ```text
//! Idle --begin--> Sending --content--> Streaming --content--> Streaming
//!                    |                     |
//!                    +--done/error/fail----+--> Finalizing --> Idle
//! ```
//!
//! Every transition goes through one of the step methods ([`ChatSession::begin`],
//! [`ChatSession::apply`], [`ChatSession::record_malformed`],
//! [`ChatSession::fail`], [`ChatSession::cancel`]). [`ChatSession::send`] drives
//! them from a live answer stream, so the same rules hold whether events come
//! from the network or from a test.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::context::SessionContext;
use super::exchange::{ChatExchange, ExchangeOutcome, ExchangeState};
use super::history::{HistoryEntry, SessionHistory};
use super::observer::{RenderUpdate, SessionObserver};
use crate::error::{NetworkError, SessionError, StreamError};
use crate::sse::{SseParseError, StreamEvent};
use crate::traits::HttpClient;
use crate::transport::{AssistantClient, ChatRequest};

/// Shown when the server finishes without sending any content.
pub const EMPTY_ANSWER_TEXT: &str = "The assistant returned an empty answer.";

enum Resolution {
    Answered { conversation_id: Option<String> },
    Failed { message: String },
}

/// A chat session: context, history and at most one live exchange.
pub struct ChatSession<O: SessionObserver> {
    context: SessionContext,
    history: SessionHistory,
    exchange: Option<ChatExchange>,
    observer: O,
}

impl<O: SessionObserver> ChatSession<O> {
    pub fn new(context: SessionContext, observer: O) -> Self {
        Self {
            context,
            history: SessionHistory::new(),
            exchange: None,
            observer,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Mutable access for credential and conversation changes.
    ///
    /// Changing the credential mid-exchange does not affect the request that
    /// is already in flight.
    pub fn context_mut(&mut self) -> &mut SessionContext {
        &mut self.context
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// The live exchange, if any.
    pub fn exchange(&self) -> Option<&ChatExchange> {
        self.exchange.as_ref()
    }

    /// Current state. `Idle` when no exchange is live.
    pub fn state(&self) -> ExchangeState {
        self.exchange
            .as_ref()
            .map(|exchange| exchange.state)
            .unwrap_or(ExchangeState::Idle)
    }

    pub fn is_idle(&self) -> bool {
        self.exchange.is_none()
    }

    /// Tear the session down, keeping only its history.
    pub fn into_history(self) -> SessionHistory {
        self.history
    }

    /// Start an exchange for `prompt`.
    ///
    /// Rejections leave the session unchanged. On success the user entry is
    /// appended to history and the state is `Sending`.
    pub fn begin(&mut self, prompt: &str) -> Result<&ChatExchange, SessionError> {
        if let Some(exchange) = &self.exchange {
            return Err(SessionError::Busy {
                state: exchange.state,
            });
        }

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(SessionError::EmptyPrompt);
        }
        if !self.context.has_credential() {
            return Err(SessionError::MissingCredential);
        }

        let entry = HistoryEntry::user(prompt);
        self.history.push(entry.clone());
        self.observer.history_appended(&entry);

        let exchange = ChatExchange::new(
            prompt.to_string(),
            self.context.conversation_id().map(str::to_string),
        );
        debug!(
            conversation_id = ?exchange.conversation_id(),
            "Exchange started: idle -> sending"
        );
        Ok(self.exchange.insert(exchange))
    }

    /// Apply one decoded event.
    ///
    /// Returns the outcome when the event finalizes the exchange. Events that
    /// arrive with no live exchange are ignored.
    pub fn apply(&mut self, event: StreamEvent) -> Option<ExchangeOutcome> {
        if self.exchange.is_none() {
            debug!(
                event_type = event.event_type_name(),
                "Ignoring event with no live exchange"
            );
            return None;
        }

        match event {
            StreamEvent::Content { chunk } => {
                let exchange = self.exchange.as_mut()?;
                if exchange.state == ExchangeState::Sending {
                    debug!("Exchange state: sending -> streaming");
                    exchange.state = ExchangeState::Streaming;
                }
                exchange.accumulated_text.push_str(&chunk);
                self.observer.render(RenderUpdate::Partial {
                    text: &exchange.accumulated_text,
                });
                None
            }
            StreamEvent::Done { conversation_id } => {
                let exchange = self.exchange.take()?;
                Some(self.finalize(exchange, Resolution::Answered { conversation_id }))
            }
            StreamEvent::Error { message } => {
                let exchange = self.exchange.take()?;
                Some(self.finalize(exchange, Resolution::Failed { message }))
            }
        }
    }

    /// Count a line that could not be decoded. The exchange continues.
    pub fn record_malformed(&mut self, error: &SseParseError) {
        if let Some(exchange) = self.exchange.as_mut() {
            exchange.malformed_events += 1;
            warn!(
                error = %error,
                malformed = exchange.malformed_events,
                "Skipping malformed stream line"
            );
        }
    }

    /// Finalize the live exchange as a transport failure.
    pub fn fail(&mut self, error: NetworkError) -> Option<ExchangeOutcome> {
        let exchange = self.exchange.take()?;
        warn!(
            code = error.error_code(),
            error = %error,
            "Exchange failed"
        );
        Some(self.finalize(
            exchange,
            Resolution::Failed {
                message: error.user_message(),
            },
        ))
    }

    /// Abort the live exchange without recording an answer.
    ///
    /// Returns false when nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        match self.exchange.take() {
            Some(exchange) => {
                info!(state = %exchange.state, "Exchange cancelled");
                true
            }
            None => false,
        }
    }

    fn finalize(&mut self, mut exchange: ChatExchange, resolution: Resolution) -> ExchangeOutcome {
        debug!(from = %exchange.state, "Exchange state: finalizing");
        exchange.state = ExchangeState::Finalizing;
        let malformed_events = exchange.malformed_events;

        let (content, outcome) = match resolution {
            Resolution::Answered { conversation_id } => {
                if let Some(id) = &conversation_id {
                    self.context.set_conversation_id(id.clone());
                }
                let empty = exchange.accumulated_text.is_empty();
                let text = if empty {
                    EMPTY_ANSWER_TEXT.to_string()
                } else {
                    std::mem::take(&mut exchange.accumulated_text)
                };
                let outcome = ExchangeOutcome::Answered {
                    text: text.clone(),
                    conversation_id,
                    empty,
                    malformed_events,
                };
                (text, outcome)
            }
            Resolution::Failed { message } => {
                // Partial answers are never shown once the exchange failed
                exchange.accumulated_text.clear();
                exchange.is_error = true;
                let outcome = ExchangeOutcome::Failed {
                    message: message.clone(),
                    malformed_events,
                };
                (message, outcome)
            }
        };

        let is_error = outcome.is_error();
        self.observer.render(RenderUpdate::Final {
            text: &content,
            is_error,
        });
        let entry = HistoryEntry::assistant(content, is_error);
        self.history.push(entry.clone());
        self.observer.history_appended(&entry);

        info!(
            is_error,
            malformed_events,
            conversation_id = ?self.context.conversation_id(),
            "Exchange finalized"
        );
        outcome
    }

    /// Send `prompt` and drive the exchange to completion.
    ///
    /// Local rejections are returned as `Err` without touching the network.
    /// Everything after that (server errors, transport failures, a stream
    /// that ends without a terminal event, cancellation) is reported as an
    /// [`ExchangeOutcome`]. Once the exchange is finalized the rest of the
    /// stream is dropped unread.
    pub async fn send<C: HttpClient>(
        &mut self,
        client: &AssistantClient<C>,
        prompt: &str,
        cancel: CancellationToken,
    ) -> Result<ExchangeOutcome, SessionError> {
        let exchange = self.begin(prompt)?;
        let request = ChatRequest::new(
            exchange.prompt(),
            exchange.conversation_id().map(str::to_string),
        );
        let Some(credential) = self.context.credential().map(str::to_string) else {
            self.cancel();
            return Err(SessionError::MissingCredential);
        };

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                self.cancel();
                return Ok(ExchangeOutcome::Cancelled);
            }
            opened = client.stream_chat(&credential, &request) => opened,
        };
        let mut events = match opened {
            Ok(events) => events,
            Err(error) => return Ok(settle(self.fail(error))),
        };

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    self.cancel();
                    return Ok(ExchangeOutcome::Cancelled);
                }
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => {
                    if let Some(outcome) = self.apply(event) {
                        return Ok(outcome);
                    }
                }
                Some(Err(StreamError::Malformed(error))) => self.record_malformed(&error),
                Some(Err(StreamError::Transport(error))) => return Ok(settle(self.fail(error))),
                None => return Ok(settle(self.fail(NetworkError::StreamEndedEarly))),
            }
        }
    }
}

/// A step that found no live exchange means it was already cancelled.
fn settle(outcome: Option<ExchangeOutcome>) -> ExchangeOutcome {
    outcome.unwrap_or(ExchangeOutcome::Cancelled)
}
