pub mod attrs;
pub mod enums;
pub mod error;
pub mod object;
pub mod twin;
