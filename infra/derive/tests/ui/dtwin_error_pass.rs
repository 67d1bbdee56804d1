use dtwin_derive::dtwin_error;
use std::borrow::Cow;

#[dtwin_error]
pub enum ParseError {
    #[error("IO error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read() -> Result<(), ParseError> {
    Err(std::io::Error::other("disk")).context("reading model file")
}

fn main() {
    let err = read().err().map(|e| e.to_string()).unwrap_or_default();
    assert_eq!(err, "IO error (reading model file): disk");

    let err: ParseError = "boom".into();
    assert_eq!(err.to_string(), "Internal error: boom");
}
