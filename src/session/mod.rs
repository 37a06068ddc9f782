//! Chat session management.
//!
//! A session owns the credential, the conversation identity, the history and
//! at most one in-flight exchange.
//!
//! # Module structure
//! - `context` - Session-wide state (SessionContext)
//! - `history` - Append-only message log (SessionHistory, HistoryEntry)
//! - `exchange` - One prompt/answer cycle (ChatExchange, ExchangeState)
//! - `observer` - Presentation callbacks (SessionObserver, RenderUpdate)
//! - `chat` - The state machine (ChatSession)

mod chat;
mod context;
mod exchange;
mod history;
mod observer;

pub use chat::{ChatSession, EMPTY_ANSWER_TEXT};
pub use context::SessionContext;
pub use exchange::{ChatExchange, ExchangeOutcome, ExchangeState};
pub use history::{HistoryEntry, Sender, SessionHistory};
pub use observer::{NoopObserver, RenderUpdate, SessionObserver};
