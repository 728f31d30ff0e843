//! Conversation transition function
//!
//! Given the same state, message and history it always produces the same
//! decision and next state. Valid readings are appended to the history
//! handed in; nothing else is touched.

use super::state::{LAST_READING, LAST_USER_MESSAGE, REMINDER_TIME};
use super::{ContextTag, ConversationState, Decision, Step};
use crate::glucose::{self, ReadingOutcome};
use crate::intent::{self, Intent};
use crate::trend::ReadingHistory;

pub const GREETING: &str =
    "👋 Hello! I'm DiaFriend, here to help you manage diabetes. What would you like to do today?";
pub const SELECTION_REPROMPT: &str = "I didn't quite catch that. Please choose one of the options below:";
pub const READY: &str = "I'm ready for your next request!";
pub const ASK_READING: &str = "Sure, please enter your blood sugar reading in mg/dL.";
pub const ASK_QUESTION: &str = "Of course! What's your question about diabetes?";
pub const ASK_REMINDER_TIME: &str = "Okay! What time would you like me to remind you? (e.g., 8:00 AM)";
pub const SIGN_OFF: &str = "Okay! I'm here whenever you need me. Take care!";

/// Offered on greeting and whenever a selection is expected
pub const MAIN_MENU: &[&str] = &[
    "Log blood sugar reading",
    "Ask a diabetes question",
    "Set a reminder",
];

/// Offered after a reading has been logged
pub const AFTER_READING: &[&str] = &[
    "Log another reading",
    "Ask a question",
    "Set a reminder",
    "Nothing else",
];

/// Offered after a reminder has been set
pub const AFTER_REMINDER: &[&str] = &["Log a reading", "Ask a question", "Nothing else"];

/// Result of a state transition
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    pub new_state: ConversationState,
    pub decision: Decision,
}

impl TransitionResult {
    fn new(new_state: ConversationState, decision: Decision) -> Self {
        Self {
            new_state,
            decision,
        }
    }
}

/// Advance the conversation by one user message.
pub fn transition(
    state: &ConversationState,
    message: &str,
    readings: &mut ReadingHistory,
) -> TransitionResult {
    let mut result = match state.step {
        Step::Greeting => TransitionResult::new(
            moved(state, Step::AwaitingSelection, ContextTag::General),
            Decision::scripted_with_options(GREETING, MAIN_MENU),
        ),

        // A message that is clearly a reading is logged without a prior "log" selection
        Step::AwaitingSelection => {
            if intent::classify(message, state) == Intent::LogReading {
                log_reading(state, message, readings)
            } else {
                select(state, message)
            }
        }

        Step::AwaitingReading => log_reading(state, message, readings),

        Step::AwaitingReminderTime => {
            let time = message.trim();
            let mut next = moved(state, Step::Conversation, ContextTag::Reminder);
            next.data.insert(REMINDER_TIME.to_string(), time.to_string());
            TransitionResult::new(
                next,
                Decision::scripted_with_options(
                    format!("Reminder set for {time}. Is there anything else you'd like help with?"),
                    AFTER_REMINDER,
                ),
            )
        }

        Step::AwaitingQuestion => TransitionResult::new(
            moved(state, Step::Conversation, ContextTag::Question),
            Decision::needs_generation(ContextTag::Question, message.trim()),
        ),

        Step::Conversation => {
            if is_quick_action(message) {
                select(state, message)
            } else {
                match intent::classify(message, state) {
                    Intent::LogReading => log_reading(state, message, readings),
                    topic => {
                        let context = ContextTag::from(topic);
                        TransitionResult::new(
                            moved(state, Step::Conversation, context),
                            Decision::needs_generation(context, message.trim()),
                        )
                    }
                }
            }
        }

        Step::Unrecognized => {
            tracing::warn!("Unrecognized conversation step, falling back to ready prompt");
            TransitionResult::new(
                moved(state, Step::AwaitingSelection, ContextTag::General),
                Decision::scripted_with_options(READY, MAIN_MENU),
            )
        }
    };

    result
        .new_state
        .data
        .insert(LAST_USER_MESSAGE.to_string(), message.to_string());
    result
}

fn moved(state: &ConversationState, step: Step, context: ContextTag) -> ConversationState {
    ConversationState {
        step,
        context,
        ..state.clone()
    }
}

/// Branch on the menu keyword in the message
fn select(state: &ConversationState, message: &str) -> TransitionResult {
    let selection = message.to_lowercase();

    if selection.contains("log") {
        TransitionResult::new(
            moved(state, Step::AwaitingReading, ContextTag::LoggedReading),
            Decision::scripted(ASK_READING),
        )
    } else if selection.contains("question") {
        TransitionResult::new(
            moved(state, Step::AwaitingQuestion, ContextTag::Question),
            Decision::scripted(ASK_QUESTION),
        )
    } else if selection.contains("reminder") {
        TransitionResult::new(
            moved(state, Step::AwaitingReminderTime, ContextTag::Reminder),
            Decision::scripted(ASK_REMINDER_TIME),
        )
    } else if selection.contains("nothing") {
        TransitionResult::new(
            moved(state, Step::Conversation, ContextTag::General),
            Decision::scripted(SIGN_OFF),
        )
    } else {
        TransitionResult::new(
            moved(state, Step::AwaitingSelection, state.context),
            Decision::scripted_with_options(SELECTION_REPROMPT, MAIN_MENU),
        )
    }
}

fn log_reading(
    state: &ConversationState,
    message: &str,
    readings: &mut ReadingHistory,
) -> TransitionResult {
    match glucose::validate(message) {
        ReadingOutcome::Valid(reading) => {
            let feedback = reading.feedback();
            let value = reading.value;
            let urgent = reading.urgent;
            tracing::info!(
                value,
                band = %reading.band,
                urgent,
                "Reading recorded"
            );
            let summary = readings.record(reading);

            let mut next = moved(state, Step::Conversation, ContextTag::LoggedReading);
            next.last_urgent = urgent;
            next.data.insert(LAST_READING.to_string(), value.to_string());

            TransitionResult::new(
                next,
                Decision::scripted_with_options(format!("{feedback}\n\n{summary}"), AFTER_READING),
            )
        }
        outcome => {
            tracing::debug!(?outcome, "Reading rejected");
            let text = outcome.reprompt().unwrap_or_else(|| ASK_READING.to_string());
            TransitionResult::new(
                moved(state, state.step, ContextTag::ClarificationNeeded),
                Decision::scripted(text),
            )
        }
    }
}

/// Exact (case-insensitive) match against any offered option
fn is_quick_action(message: &str) -> bool {
    let trimmed = message.trim();
    MAIN_MENU
        .iter()
        .chain(AFTER_READING)
        .chain(AFTER_REMINDER)
        .any(|option| option.eq_ignore_ascii_case(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_step(step: Step) -> ConversationState {
        ConversationState {
            step,
            ..ConversationState::default()
        }
    }

    fn run(step: Step, message: &str) -> (TransitionResult, ReadingHistory) {
        let mut history = ReadingHistory::new();
        let result = transition(&in_step(step), message, &mut history);
        (result, history)
    }

    fn scripted_text(decision: &Decision) -> &str {
        match decision {
            Decision::Scripted { text, .. } => text,
            Decision::NeedsGeneration { .. } => panic!("expected scripted, got {decision:?}"),
        }
    }

    #[test]
    fn test_greeting_ignores_content() {
        for message in ["hi", "my sugar is 150", "I need help with my diet"] {
            let (result, history) = run(Step::Greeting, message);
            assert_eq!(result.new_state.step, Step::AwaitingSelection);
            assert_eq!(
                result.decision,
                Decision::scripted_with_options(GREETING, MAIN_MENU)
            );
            assert!(history.is_empty());
        }
    }

    #[test]
    fn test_selection_branches() {
        let (result, _) = run(Step::AwaitingSelection, "Log blood sugar reading");
        assert_eq!(result.new_state.step, Step::AwaitingReading);
        assert_eq!(scripted_text(&result.decision), ASK_READING);

        let (result, _) = run(Step::AwaitingSelection, "Ask a diabetes question");
        assert_eq!(result.new_state.step, Step::AwaitingQuestion);

        let (result, _) = run(Step::AwaitingSelection, "Set a reminder");
        assert_eq!(result.new_state.step, Step::AwaitingReminderTime);
        assert_eq!(scripted_text(&result.decision), ASK_REMINDER_TIME);
    }

    #[test]
    fn test_unmatched_selection_reprompts() {
        let (result, _) = run(Step::AwaitingSelection, "hmm, not sure");
        assert_eq!(result.new_state.step, Step::AwaitingSelection);
        assert_eq!(
            result.decision,
            Decision::scripted_with_options(SELECTION_REPROMPT, MAIN_MENU)
        );
    }

    #[test]
    fn test_bare_number_during_selection_reprompts() {
        let (result, history) = run(Step::AwaitingSelection, "150");
        assert_eq!(result.new_state.step, Step::AwaitingSelection);
        assert_eq!(scripted_text(&result.decision), SELECTION_REPROMPT);
        assert!(history.is_empty());
    }

    #[test]
    fn test_reading_with_keyword_during_selection_logs() {
        let (result, history) = run(Step::AwaitingSelection, "my sugar is 150");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(result.new_state.context, ContextTag::LoggedReading);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_valid_reading_combines_feedback_and_trend() {
        let (result, history) = run(Step::AwaitingReading, "132");
        assert_eq!(history.len(), 1);
        assert_eq!(result.new_state.step, Step::Conversation);
        assert!(!result.new_state.last_urgent);
        assert_eq!(result.new_state.data.get(LAST_READING).unwrap(), "132");
        match &result.decision {
            Decision::Scripted { text, options } => {
                assert!(text.contains("132 mg/dL is within your target range"));
                assert!(text.contains("first logged reading"));
                assert_eq!(options.len(), AFTER_READING.len());
            }
            other => panic!("expected scripted, got {other:?}"),
        }
    }

    #[test]
    fn test_urgent_reading_sets_flag() {
        let (result, _) = run(Step::AwaitingReading, "45");
        assert!(result.new_state.last_urgent);
        assert!(scripted_text(&result.decision).contains("healthcare provider"));

        // A later in-range reading clears it
        let mut history = ReadingHistory::new();
        let urgent = ConversationState {
            step: Step::AwaitingReading,
            last_urgent: true,
            ..ConversationState::default()
        };
        let result = transition(&urgent, "110", &mut history);
        assert!(!result.new_state.last_urgent);
    }

    #[test]
    fn test_invalid_reading_keeps_step() {
        let (result, history) = run(Step::AwaitingReading, "no idea");
        assert_eq!(result.new_state.step, Step::AwaitingReading);
        assert_eq!(result.new_state.context, ContextTag::ClarificationNeeded);
        assert!(history.is_empty());

        let (result, history) = run(Step::AwaitingReading, "900");
        assert_eq!(result.new_state.step, Step::AwaitingReading);
        assert!(scripted_text(&result.decision).contains("outside the range"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_reminder_echoes_time() {
        let (result, _) = run(Step::AwaitingReminderTime, " 8:00 AM ");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(result.new_state.data.get(REMINDER_TIME).unwrap(), "8:00 AM");
        match &result.decision {
            Decision::Scripted { text, options } => {
                assert!(text.starts_with("Reminder set for 8:00 AM."));
                assert_eq!(options.len(), AFTER_REMINDER.len());
            }
            other => panic!("expected scripted, got {other:?}"),
        }
    }

    #[test]
    fn test_question_requests_generation_with_current_text() {
        let (result, _) = run(Step::AwaitingQuestion, "Can I eat rice?");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(
            result.decision,
            Decision::needs_generation(ContextTag::Question, "Can I eat rice?")
        );
    }

    #[test]
    fn test_conversation_emotional_support_generation() {
        let (result, _) = run(Step::Conversation, "I feel so stressed about my diabetes");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(result.new_state.context, ContextTag::EmotionalSupport);
        match result.decision {
            Decision::NeedsGeneration {
                context,
                payload,
                acknowledgment,
            } => {
                assert_eq!(context, ContextTag::EmotionalSupport);
                assert_eq!(payload, "I feel so stressed about my diabetes");
                assert!(!acknowledgment.is_empty());
            }
            other @ Decision::Scripted { .. } => panic!("expected generation, got {other:?}"),
        }
    }

    #[test]
    fn test_conversation_logs_reading() {
        let (result, history) = run(Step::Conversation, "blood sugar 260 this morning");
        assert_eq!(history.len(), 1);
        assert!(result.new_state.last_urgent);
        assert!(!result.decision.is_generation());
    }

    #[test]
    fn test_conversation_out_of_range_reading_stays_in_conversation() {
        let (result, history) = run(Step::Conversation, "my glucose read 700");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(result.new_state.context, ContextTag::ClarificationNeeded);
        assert!(history.is_empty());
    }

    #[test]
    fn test_conversation_quick_action_routes_to_selection() {
        let (result, _) = run(Step::Conversation, "log another reading");
        assert_eq!(result.new_state.step, Step::AwaitingReading);

        let (result, _) = run(Step::Conversation, "Nothing else");
        assert_eq!(result.new_state.step, Step::Conversation);
        assert_eq!(scripted_text(&result.decision), SIGN_OFF);
    }

    // Deliberate defensive default: unknown steps answer "ready" instead of erroring
    #[test]
    fn test_unrecognized_step_falls_back_to_ready() {
        let (result, history) = run(Step::Unrecognized, "anything at all");
        assert_eq!(result.new_state.step, Step::AwaitingSelection);
        assert_eq!(scripted_text(&result.decision), READY);
        assert!(history.is_empty());
    }

    #[test]
    fn test_last_user_message_carried_forward() {
        let (result, _) = run(Step::Greeting, "hello there");
        assert_eq!(result.new_state.last_user_message(), Some("hello there"));
    }
}
