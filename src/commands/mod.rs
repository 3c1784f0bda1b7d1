mod blank_line;
mod comment;
mod pause;
mod shell_line;
mod sleep;
mod typing_interval;

pub use blank_line::BlankLine;
pub use comment::Comment;
pub use pause::Pause;
pub use shell_line::ShellLine;
pub use sleep::Sleep;
pub use typing_interval::TypingInterval;
