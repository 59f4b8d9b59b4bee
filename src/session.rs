use std::fmt::Debug;

/// A server-side session that the handling layer attaches to a request
/// after parsing.
///
/// The parser never creates sessions; storage and expiry belong to whoever
/// implements this trait.
pub trait Session: Debug + Send + Sync {
    /// Unique identifier of the session (usually echoed back in a cookie).
    fn id(&self) -> &str;

    /// Look up a value stored in the session.
    fn get(&self, key: &str) -> Option<String>;

    /// Return `true` if the session holds a value under `key`.
    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}
