//! Per-browser session state.
//!
//! The session is an explicit value loaded at the start of a request and
//! written back at the end only when something marked it modified.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cart::CartLine;

/// Serialized contents of a session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Identity bound to this session by login
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Cart lines keyed by product id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart: Option<BTreeMap<String, CartLine>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_total_amount: Option<Decimal>,
    /// Order awaiting the payment provider's return
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i32>,
}

/// A loaded session
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    data: SessionData,
    modified: bool,
    retired_id: Option<String>,
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}

impl Session {
    /// Start a new, empty session with a fresh id.
    pub fn fresh() -> Self {
        Self {
            id: generate_id(),
            data: SessionData::default(),
            modified: false,
            retired_id: None,
        }
    }

    /// Rehydrate a session read from the store.
    pub fn restore(id: impl Into<String>, data: SessionData) -> Self {
        Self {
            id: id.into(),
            data,
            modified: false,
            retired_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Mutable access to the stored fields; callers must mark the session modified.
    pub(crate) fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Force the session to be persisted at the end of the request.
    pub fn mark_modified(&mut self) {
        self.modified = true;
    }

    /// Id this session used before it was cycled, which the store should forget.
    pub fn retired_id(&self) -> Option<&str> {
        self.retired_id.as_deref()
    }

    /// Logged-in identity, if any
    pub fn user_id(&self) -> Option<Uuid> {
        self.data.user_id
    }

    /// Bind an identity to this session, issuing a new session id.
    pub fn login(&mut self, user_id: Uuid) {
        self.cycle_id();
        self.data.user_id = Some(user_id);
        self.modified = true;
    }

    /// Drop every stored field, cart included, and issue a new session id.
    pub fn flush(&mut self) {
        self.cycle_id();
        self.data = SessionData::default();
        self.modified = true;
    }

    /// Remember the order the payment return should finalize.
    pub fn stash_order(&mut self, order_id: i32) {
        self.data.order_id = Some(order_id);
        self.modified = true;
    }

    pub fn stashed_order(&self) -> Option<i32> {
        self.data.order_id
    }

    fn cycle_id(&mut self) {
        let old = std::mem::replace(&mut self.id, generate_id());
        if self.retired_id.is_none() {
            self.retired_id = Some(old);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_is_clean() {
        let session = Session::fresh();
        assert!(!session.is_modified());
        assert!(session.user_id().is_none());
        assert!(session.retired_id().is_none());
    }

    #[test]
    fn test_login_cycles_id_and_binds_user() {
        let mut session = Session::restore("abc", SessionData::default());
        let user = Uuid::new_v4();
        session.login(user);

        assert_eq!(session.user_id(), Some(user));
        assert_ne!(session.id(), "abc");
        assert_eq!(session.retired_id(), Some("abc"));
        assert!(session.is_modified());
    }

    #[test]
    fn test_flush_clears_everything() {
        let mut session = Session::restore("abc", SessionData::default());
        session.login(Uuid::new_v4());
        session.stash_order(3);
        session.flush();

        assert_eq!(session.data(), &SessionData::default());
        // the id handed out by the browser is the one to forget
        assert_eq!(session.retired_id(), Some("abc"));
    }

    #[test]
    fn test_empty_data_serializes_to_empty_object() {
        let json = serde_json::to_string(&SessionData::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
