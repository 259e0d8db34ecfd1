pub mod answer;
pub mod entities;
pub mod handlers;
pub mod intent;
pub mod similarity;

pub use answer::{Answer, FailureKind, SourceMeta};
pub use handlers::HandlerInput;
pub use intent::{route, Intent, UNKNOWN_INTENT_MESSAGE};

/// Answer a question with the handler for its intent
pub fn dispatch(intent: Intent, input: &HandlerInput<'_>) -> Answer {
    match intent {
        Intent::Rainfall => handlers::rainfall::answer(input),
        Intent::Msp => handlers::msp::answer(input),
        Intent::CropProduction => handlers::crop::answer(input),
        Intent::Unknown => Answer::failure(FailureKind::InputValidation, UNKNOWN_INTENT_MESSAGE),
    }
}
