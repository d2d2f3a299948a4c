//! HTTP gateway for the tutoring widget: chat, quiz, lesson listing, and
//! text-to-speech proxying.

mod error;
mod handlers;
mod router;
mod server;
mod tts;

pub use error::GatewayError;
pub use server::GatewayServer;
pub use tts::{TtsClient, TtsError};
