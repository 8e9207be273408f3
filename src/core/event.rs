use serde::{Deserialize, Serialize};

/// Application notifications fanned out by the event bus. Immutable once
/// constructed; handed to handlers and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    UserLoggedIn { user_id: String },
    UserLoggedOut,
    DataRefreshed,
}
