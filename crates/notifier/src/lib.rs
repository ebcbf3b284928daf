//! Threshold alert dispatch and the channels alerts are delivered on.

pub use channel::{ChannelKind, Notifier, NotifyError, Recipient};
pub use dispatcher::{
    AlertDispatcher, AlertDispatcherBuilder, DEFAULT_TIMEOUT, DispatchOutcome, UserGate,
    UserGuard,
};
pub use email::{EmailNotifier, EmailSettings};
pub use message::AlertMessage;
pub use telegram::TelegramNotifier;

mod channel;
mod dispatcher;
mod message;
mod telegram;

pub mod email;
