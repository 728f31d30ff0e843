//! Fixed assistant persona and per-turn generation prompts

use crate::state_machine::ContextTag;

/// First message of every session
pub const SYSTEM_PROMPT: &str = r"You are DiaFriend, a professional, warm, and supportive diabetes management assistant.

Your role:
- Help patients manage diabetes day to day.
- Answer questions about diet, medication, glucose monitoring, and exercise.
- Log daily blood sugar readings.
- Provide reminders and encouragement.

Core principles:
- Use clear, compassionate language.
- Never provide medical advice beyond general guidance.
- Recommend contacting a healthcare provider for emergencies.
- Keep responses short and supportive.
- Ask only one question at a time.
- Acknowledge the patient's feelings.

Always maintain a caring tone and build trust.";

/// Fixed reply when the generation collaborator fails
pub const GENERATION_FALLBACK: &str = "I'm sorry, I'm having trouble answering right now. \
    Please try again in a moment. If this is urgent, please contact your healthcare provider.";

fn topic_guidance(context: ContextTag) -> &'static str {
    match context {
        ContextTag::Nutrition => {
            "Focus on practical, diabetes-friendly food choices, portion sizes and carbohydrate awareness."
        }
        ContextTag::Exercise => {
            "Focus on safe, approachable physical activity and checking blood sugar around exercise."
        }
        ContextTag::EmotionalSupport => {
            "Respond with empathy first. Validate the feelings, offer one small coping idea, \
             and mention that talking to a care team or counselor can help."
        }
        ContextTag::Question => "Answer the question directly before adding anything else.",
        ContextTag::General
        | ContextTag::LoggedReading
        | ContextTag::ClarificationNeeded
        | ContextTag::Reminder => "Keep the answer focused on everyday diabetes self-care.",
    }
}

/// Extra instruction appended after the session history for one generated reply.
pub fn generation_prompt(context: ContextTag, payload: &str, last_urgent: bool) -> String {
    let mut prompt = format!(
        "Please provide a friendly, clear, and non-judgmental answer to this diabetes-related message:\n\n\"{payload}\"\n\n"
    );
    prompt.push_str(topic_guidance(context));
    prompt.push_str(
        "\n\nRemember:\n\
         - Do not give medical advice beyond general information.\n\
         - Encourage contacting a healthcare provider for urgent concerns.\n\
         - Keep the answer short and supportive.",
    );
    if last_urgent {
        prompt.push_str(
            "\n- The user's last logged reading was outside the safe range; gently remind them to follow up on it.",
        );
    }
    prompt
}
