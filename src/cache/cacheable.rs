//! Cacheability Predicate
//!
//! Pure policy deciding which operations are eligible for client-side
//! caching. Built once at startup and shared read-only; safe to call from
//! any number of tasks without synchronization.

use std::collections::HashSet;

// == Command Tags ==
/// Operation types routed through the cache client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Get,
    MGet,
    Exists,
    HGet,
    HGetAll,
    Set,
    HSet,
    Del,
}

impl Command {
    /// Read-only commands with deterministic results are cacheable by
    /// default. Caching a write command is never valid.
    pub fn is_default_cacheable(self) -> bool {
        matches!(
            self,
            Command::Get | Command::MGet | Command::Exists | Command::HGet | Command::HGetAll
        )
    }

    /// Wire/log name of the command.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Get => "GET",
            Command::MGet => "MGET",
            Command::Exists => "EXISTS",
            Command::HGet => "HGET",
            Command::HGetAll => "HGETALL",
            Command::Set => "SET",
            Command::HSet => "HSET",
            Command::Del => "DEL",
        }
    }
}

// == Cacheable Trait ==
/// Policy gating which operations/keys may enter the client-side cache.
pub trait Cacheable: Send + Sync {
    /// Returns true when the operation may be served from or populate the
    /// client-side cache.
    fn is_cacheable(&self, command: Command, keys: &[&str]) -> bool;
}

// == Prefix Strategy ==
/// Caches operations whose keys start with any configured prefix.
#[derive(Debug, Clone)]
pub struct PrefixCacheable {
    prefixes: HashSet<String>,
}

impl PrefixCacheable {
    /// Creates a prefix-based policy from any collection of prefixes.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Cacheable for PrefixCacheable {
    fn is_cacheable(&self, command: Command, keys: &[&str]) -> bool {
        if !command.is_default_cacheable() {
            return false;
        }
        // A single matching key marks the whole operation eligible, even
        // when a multi-key read also touches keys outside the policy.
        keys.iter()
            .any(|key| self.prefixes.iter().any(|prefix| key.starts_with(prefix.as_str())))
    }
}

// == Exact-Key Strategy ==
/// Caches operations touching an exact set of keys only.
#[derive(Debug, Clone)]
pub struct ExactKeysCacheable {
    keys: HashSet<String>,
}

impl ExactKeysCacheable {
    /// Creates an exact-key policy from any collection of keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl Cacheable for ExactKeysCacheable {
    fn is_cacheable(&self, command: Command, keys: &[&str]) -> bool {
        if !command.is_default_cacheable() {
            return false;
        }
        keys.iter().any(|key| self.keys.contains(*key))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_commands_never_cacheable() {
        let policy = PrefixCacheable::new(["foo"]);

        for command in [Command::Set, Command::HSet, Command::Del] {
            assert!(!policy.is_cacheable(command, &["foo123"]));
        }
    }

    #[test]
    fn test_prefix_match() {
        let policy = PrefixCacheable::new(["foo", "person"]);

        assert!(policy.is_cacheable(Command::Get, &["foo123"]));
        assert!(policy.is_cacheable(Command::HGet, &["person:1"]));
        assert!(!policy.is_cacheable(Command::Get, &["barxyz"]));
    }

    #[test]
    fn test_empty_keys_not_cacheable() {
        let policy = PrefixCacheable::new(["foo"]);
        assert!(!policy.is_cacheable(Command::Get, &[]));
    }

    #[test]
    fn test_multi_key_any_match_marks_operation_eligible() {
        let policy = PrefixCacheable::new(["person"]);

        // The whole multi-get is eligible although only one key matches.
        assert!(policy.is_cacheable(Command::MGet, &["other:1", "person:1"]));
        assert!(!policy.is_cacheable(Command::MGet, &["other:1", "other:2"]));
    }

    #[test]
    fn test_exact_keys_membership() {
        let policy = ExactKeysCacheable::new(["user:1001", "person:1"]);

        assert!(policy.is_cacheable(Command::Get, &["user:1001"]));
        assert!(!policy.is_cacheable(Command::Get, &["user:1002"]));
        // Prefixes do not count in exact mode.
        assert!(!policy.is_cacheable(Command::Get, &["user:100"]));
    }

    #[test]
    fn test_exists_is_default_cacheable() {
        assert!(Command::Exists.is_default_cacheable());
        assert!(!Command::Del.is_default_cacheable());
    }
}
