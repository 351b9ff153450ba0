pub mod duration;
pub mod error;
pub mod message;
pub mod title;
pub mod traits;
pub mod users;

pub use duration::{format_duration, parse_duration, DurationParseError, SignedDuration};
pub use error::MonkError;
pub use message::{ChatMessage, OutgoingMessage};
pub use title::sanitize_title;
pub use traits::{Archive, Outbound, TopicLink};
pub use users::UserDirectory;
