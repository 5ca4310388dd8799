use hireflow::domain::errors::DomainError;
use hireflow::domain::models::{ApplicationStatus, NewApplication};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

mod common;

fn any_status() -> impl Strategy<Value = ApplicationStatus> {
    prop::sample::select(ApplicationStatus::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: the persisted status only ever follows edges of the
    /// transition table, and a rejected request leaves the record untouched.
    #[test]
    fn prop_transitions_follow_table(path in prop::collection::vec(any_status(), 1..8)) {
        tokio_test::block_on(async {
            let store = common::test_store().await;
            let app = store.create(NewApplication::new("J1", "U1")).await.unwrap();
            let mut expected = ApplicationStatus::Pending;

            for target in path {
                let before = store.get(app.id).await.unwrap();
                match store.transition(app.id, target).await {
                    Ok(updated) => {
                        prop_assert!(expected.can_transition_to(target));
                        prop_assert_eq!(updated.status, target);
                        expected = target;
                    }
                    Err(DomainError::InvalidTransition { from, to }) => {
                        prop_assert!(!expected.can_transition_to(target));
                        prop_assert_eq!(from, expected);
                        prop_assert_eq!(to, target);
                        let after = store.get(app.id).await.unwrap();
                        prop_assert_eq!(after, before);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {}", other),
                }
            }

            let persisted = store.get(app.id).await.unwrap();
            prop_assert_eq!(persisted.status, expected);
            Ok::<(), TestCaseError>(())
        })?;
    }

    /// Property: once terminal, no request changes the status.
    #[test]
    fn prop_terminal_states_are_final(
        terminal in prop::sample::select(vec![ApplicationStatus::Accepted, ApplicationStatus::Rejected]),
        attempts in prop::collection::vec(any_status(), 1..6),
    ) {
        tokio_test::block_on(async {
            let store = common::test_store().await;
            let app = store.create(NewApplication::new("J1", "U1")).await.unwrap();
            store.transition(app.id, terminal).await.unwrap();

            for target in attempts {
                let is_invalid = matches!(
                    store.transition(app.id, target).await,
                    Err(DomainError::InvalidTransition { .. })
                );
                prop_assert!(is_invalid);
            }

            prop_assert_eq!(store.get(app.id).await.unwrap().status, terminal);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
