//! Property-Based Tests for the Cache Module
//!
//! Uses proptest to verify the capacity bound of the side cache and the
//! cacheability predicate against a reference model.

use proptest::prelude::*;

use crate::cache::{Cacheable, Command, PrefixCacheable, SideCache};

// == Strategies ==
/// Keys drawn from a small alphabet so sequences revisit the same records.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e][0-9]".prop_map(|s| s)
}

fn field_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("name".to_string()), Just("surname".to_string())]
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z]{1,16}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum SideCacheOp {
    Set { key: String, field: String, value: String },
    Get { key: String, field: String },
    Delete { key: String },
}

fn op_strategy() -> impl Strategy<Value = SideCacheOp> {
    prop_oneof![
        (key_strategy(), field_strategy(), value_strategy())
            .prop_map(|(key, field, value)| SideCacheOp::Set { key, field, value }),
        (key_strategy(), field_strategy()).prop_map(|(key, field)| SideCacheOp::Get { key, field }),
        key_strategy().prop_map(|key| SideCacheOp::Delete { key }),
    ]
}

fn read_command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        Just(Command::Get),
        Just(Command::MGet),
        Just(Command::Exists),
        Just(Command::HGet),
        Just(Command::HGetAll),
    ]
}

fn write_command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![Just(Command::Set), Just(Command::HSet), Just(Command::Del)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The side cache never holds more records than its configured
    /// capacity, for any operation sequence.
    #[test]
    fn prop_capacity_never_exceeded(
        capacity in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let mut cache = SideCache::new(capacity);

        for op in ops {
            match op {
                SideCacheOp::Set { key, field, value } => cache.set_field(&key, &field, value),
                SideCacheOp::Get { key, field } => { cache.get_field(&key, &field); }
                SideCacheOp::Delete { key } => cache.delete(&key),
            }
            prop_assert!(cache.len() <= capacity, "capacity bound violated");
        }
    }

    /// A field written is immediately readable; inserting a record never
    /// evicts the record itself.
    #[test]
    fn prop_written_field_readable(
        capacity in 1usize..8,
        warmup in prop::collection::vec(op_strategy(), 0..40),
        key in key_strategy(),
        value in value_strategy(),
    ) {
        let mut cache = SideCache::new(capacity);
        for op in warmup {
            match op {
                SideCacheOp::Set { key, field, value } => cache.set_field(&key, &field, value),
                SideCacheOp::Get { key, field } => { cache.get_field(&key, &field); }
                SideCacheOp::Delete { key } => cache.delete(&key),
            }
        }

        cache.set_field(&key, "name", value.clone());
        prop_assert_eq!(cache.get_field(&key, "name"), Some(value));
    }

    /// Deleted records are gone regardless of prior history.
    #[test]
    fn prop_delete_removes_record(
        ops in prop::collection::vec(op_strategy(), 0..40),
        key in key_strategy(),
    ) {
        let mut cache = SideCache::new(8);
        for op in ops {
            match op {
                SideCacheOp::Set { key, field, value } => cache.set_field(&key, &field, value),
                SideCacheOp::Get { key, field } => { cache.get_field(&key, &field); }
                SideCacheOp::Delete { key } => cache.delete(&key),
            }
        }

        cache.delete(&key);
        prop_assert!(!cache.exists(&key));
    }

    /// Write commands are never cacheable, whatever the keys look like.
    #[test]
    fn prop_write_commands_never_cacheable(
        command in write_command_strategy(),
        keys in prop::collection::vec("[a-z]{1,12}", 0..4),
    ) {
        let policy = PrefixCacheable::new(["foo", "user", "session", "person", "hello"]);
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        prop_assert!(!policy.is_cacheable(command, &refs));
    }

    /// For read commands the prefix policy agrees with a direct model:
    /// eligible iff any key starts with a configured prefix.
    #[test]
    fn prop_prefix_policy_matches_model(
        command in read_command_strategy(),
        keys in prop::collection::vec("[a-z:0-9]{0,12}", 0..4),
    ) {
        let prefixes = ["foo", "person"];
        let policy = PrefixCacheable::new(prefixes);

        let expected = keys
            .iter()
            .any(|key| prefixes.iter().any(|prefix| key.starts_with(prefix)));
        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        prop_assert_eq!(policy.is_cacheable(command, &refs), expected);
    }
}
