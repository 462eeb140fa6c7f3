use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use shared::domain::{ListName, RenderId, UserId};

/// Transient per-user state for an in-progress bulk add: the user has tapped
/// "add" and the next free-text message they send belongs to `target_list`.
/// `anchor` is the screen to update in place once the text arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub user_id: UserId,
    pub target_list: ListName,
    pub anchor: Option<RenderId>,
}

/// Registry of live edit sessions, at most one per user. Held behind a
/// mutex and shared by cloning; injected into the controller rather than
/// living in a global. Sessions never expire on their own — they end on
/// submit, cancel, or when a newer `start` for the same user overwrites
/// them (last writer wins).
#[derive(Clone, Default)]
pub struct SessionRegistry {
    inner: Arc<Mutex<HashMap<UserId, EditSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self, user_id: UserId, target_list: ListName, anchor: Option<RenderId>) {
        self.lock().insert(
            user_id,
            EditSession {
                user_id,
                target_list,
                anchor,
            },
        );
    }

    pub fn get(&self, user_id: UserId) -> Option<EditSession> {
        self.lock().get(&user_id).cloned()
    }

    /// Removes the user's session unconditionally. Safe when absent.
    pub fn end(&self, user_id: UserId) {
        self.lock().remove(&user_id);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, EditSession>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_again_overwrites_the_previous_session() {
        let sessions = SessionRegistry::new();
        let user = UserId(7);

        sessions.start(user, ListName::A, Some(RenderId(1)));
        sessions.start(user, ListName::B, Some(RenderId(2)));

        let session = sessions.get(user).expect("session");
        assert_eq!(session.target_list, ListName::B);
        assert_eq!(session.anchor, Some(RenderId(2)));
    }

    #[test]
    fn end_is_safe_when_no_session_exists() {
        let sessions = SessionRegistry::new();
        sessions.end(UserId(7));
        assert!(sessions.get(UserId(7)).is_none());
    }

    #[test]
    fn sessions_are_per_user() {
        let sessions = SessionRegistry::new();
        sessions.start(UserId(1), ListName::A, None);
        sessions.start(UserId(2), ListName::B, None);

        sessions.end(UserId(1));

        assert!(sessions.get(UserId(1)).is_none());
        assert_eq!(
            sessions.get(UserId(2)).expect("session").target_list,
            ListName::B
        );
    }
}
