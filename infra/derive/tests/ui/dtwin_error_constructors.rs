use dtwin_derive::dtwin_error;
use std::borrow::Cow;

#[dtwin_error]
pub enum LookupError {
    #[error("Model {model_id} registered twice{}", format_context(.context))]
    DuplicateModelId { model_id: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Cannot convert value{}: {message}", format_context(.context))]
    Coercion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {
    let err = LookupError::duplicate_model_id("dtmi:a:B;1");
    assert_eq!(err.to_string(), "Model dtmi:a:B;1 registered twice");

    let err: Result<(), LookupError> = Err(LookupError::coercion(format!("{} out of range", 300)));
    let err = err.context("quantity").err().map(|e| e.to_string()).unwrap_or_default();
    assert_eq!(err, "Cannot convert value (quantity): 300 out of range");
}
