//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::LAST_USER_MESSAGE;
use super::transition::{GREETING, MAIN_MENU};
use super::*;
use crate::trend::{ReadingHistory, HISTORY_CAPACITY};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        Just(Step::Greeting),
        Just(Step::AwaitingSelection),
        Just(Step::AwaitingReading),
        Just(Step::AwaitingReminderTime),
        Just(Step::AwaitingQuestion),
        Just(Step::Conversation),
        Just(Step::Unrecognized),
    ]
}

fn arb_context() -> impl Strategy<Value = ContextTag> {
    prop_oneof![
        Just(ContextTag::General),
        Just(ContextTag::Nutrition),
        Just(ContextTag::Exercise),
        Just(ContextTag::EmotionalSupport),
        Just(ContextTag::LoggedReading),
        Just(ContextTag::ClarificationNeeded),
        Just(ContextTag::Question),
        Just(ContextTag::Reminder),
    ]
}

fn arb_state() -> impl Strategy<Value = ConversationState> {
    (arb_step(), arb_context(), any::<bool>()).prop_map(|(step, context, last_urgent)| {
        ConversationState {
            step,
            context,
            last_urgent,
            ..ConversationState::default()
        }
    })
}

fn arb_message() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{0,30}",
        (0u32..1000).prop_map(|v| v.to_string()),
        (0u32..1000).prop_map(|v| format!("my blood sugar is {v}")),
        Just("Log blood sugar reading".to_string()),
        Just("Ask a question".to_string()),
        Just("Set a reminder".to_string()),
        Just("Nothing else".to_string()),
        Just("I feel so stressed about my diabetes".to_string()),
        Just("what should I eat for breakfast".to_string()),
    ]
}

// ============================================================================
// Invariants
// ============================================================================

proptest! {
    /// Transitions never land in the unrecognized step
    #[test]
    fn prop_next_step_is_known(state in arb_state(), message in arb_message()) {
        let mut history = ReadingHistory::new();
        let result = transition(&state, &message, &mut history);
        prop_assert_ne!(result.new_state.step, Step::Unrecognized);
    }

    /// Greeting always answers with the fixed greeting
    #[test]
    fn prop_greeting_is_fixed(message in arb_message()) {
        let mut history = ReadingHistory::new();
        let result = transition(&ConversationState::new(), &message, &mut history);
        prop_assert_eq!(result.new_state.step, Step::AwaitingSelection);
        prop_assert_eq!(result.decision, Decision::scripted_with_options(GREETING, MAIN_MENU));
        prop_assert!(history.is_empty());
    }

    /// Generation is only ever requested from the steady state
    #[test]
    fn prop_generation_lands_in_conversation(state in arb_state(), message in arb_message()) {
        let mut history = ReadingHistory::new();
        let result = transition(&state, &message, &mut history);
        if result.decision.is_generation() {
            prop_assert_eq!(result.new_state.step, Step::Conversation);
        }
    }

    /// Rejected readings leave the step where it was
    #[test]
    fn prop_rejected_reading_keeps_step(message in arb_message()) {
        let state = ConversationState { step: Step::AwaitingReading, ..ConversationState::default() };
        let mut history = ReadingHistory::new();
        let result = transition(&state, &message, &mut history);
        if history.is_empty() {
            prop_assert_eq!(result.new_state.step, Step::AwaitingReading);
            prop_assert_eq!(result.new_state.context, ContextTag::ClarificationNeeded);
        } else {
            prop_assert_eq!(result.new_state.step, Step::Conversation);
        }
    }

    /// History stays bounded over arbitrary dialogues
    #[test]
    fn prop_history_bounded_over_dialogue(messages in proptest::collection::vec(arb_message(), 0..120)) {
        let mut state = ConversationState { step: Step::AwaitingReading, ..ConversationState::default() };
        let mut history = ReadingHistory::new();
        for message in &messages {
            let result = transition(&state, message, &mut history);
            prop_assert!(history.len() <= HISTORY_CAPACITY);
            prop_assert_eq!(
                result.new_state.data.get(LAST_USER_MESSAGE).map(String::as_str),
                Some(message.as_str())
            );
            state = result.new_state;
        }
    }

    /// The urgent flag only changes when a reading is logged
    #[test]
    fn prop_urgent_flag_changes_only_with_reading(state in arb_state(), message in arb_message()) {
        let mut history = ReadingHistory::new();
        let result = transition(&state, &message, &mut history);
        if history.is_empty() {
            prop_assert_eq!(result.new_state.last_urgent, state.last_urgent);
        } else {
            let logged = history.iter().last().map(|r| r.urgent);
            prop_assert_eq!(Some(result.new_state.last_urgent), logged);
        }
    }
}
