//! Wire codecs: positional arguments and completion messages.

pub mod args;
pub mod completion;

pub use args::{decode_arguments, decode_arguments_bounded};
pub use completion::{decode_completion, encode_failure, encode_success, CompletionMessage};
