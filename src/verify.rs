//! Before/after verification for mutations the engine does not confirm.
//!
//! The editor accepts `make new action with properties {xml:...}` and says
//! nothing when it silently discards malformed markup. The only reliable
//! signal is an observable that the mutation must change, read before and
//! after. A mutation whose observable did not move becomes
//! [`BridgeError::NotApplied`], which callers surface differently from an
//! outright execution failure.

use std::fmt::Display;

use crate::error::{BridgeError, Result};

/// Run `act` between two `observe` calls and require `changed` to hold.
///
/// Returns the post-mutation observation together with the raw script
/// output. Errors from `observe` and `act` propagate unchanged; only a
/// completed act with an unmoved observable becomes `NotApplied`.
pub fn verified_mutation<T, O, A, P>(
    op: &str,
    observe: O,
    act: A,
    changed: P,
) -> Result<(T, String)>
where
    T: Display,
    O: Fn() -> Result<T>,
    A: FnOnce() -> Result<String>,
    P: FnOnce(&T, &T) -> bool,
{
    let before = observe()?;
    let output = act()?;
    let after = observe()?;
    if !changed(&before, &after) {
        tracing::warn!(op, %after, "mutation produced no observable change");
        return Err(BridgeError::not_applied(
            op,
            format!("no observable change ({after}); the engine reported no error but the edit did not take effect"),
        ));
    }
    Ok((after, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_applied_mutation_returns_after_state_and_output() {
        let count = Cell::new(2usize);
        let (after, output) = verified_mutation(
            "add_action",
            || Ok(count.get()),
            || {
                count.set(count.get() + 1);
                Ok("3".to_string())
            },
            |before, after| after > before,
        )
        .unwrap();
        assert_eq!(after, 3);
        assert_eq!(output, "3");
    }

    #[test]
    fn test_unmoved_observable_is_not_applied() {
        let err = verified_mutation(
            "add_trigger",
            || Ok(5usize),
            || Ok(String::new()),
            |before, after| after > before,
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::NotApplied { .. }));
        let message = err.to_string();
        assert!(message.contains("add_trigger"));
        assert!(message.contains("no observable change"));
    }

    #[test]
    fn test_act_failure_skips_second_observation() {
        let observations = Cell::new(0usize);
        let err = verified_mutation(
            "add_action",
            || {
                observations.set(observations.get() + 1);
                Ok(1usize)
            },
            || Err(BridgeError::execution("add_action", "engine not running")),
            |_, _| true,
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::Execution { .. }));
        assert_eq!(observations.get(), 1);
    }

    #[test]
    fn test_first_observation_failure_skips_act() {
        let acted = Cell::new(false);
        let result = verified_mutation(
            "add_action",
            || -> Result<usize> { Err(BridgeError::execution("count_actions", "boom")) },
            || {
                acted.set(true);
                Ok(String::new())
            },
            |_, _| true,
        );
        assert!(result.is_err());
        assert!(!acted.get());
    }
}
