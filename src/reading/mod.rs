pub mod error;
pub mod range;
pub mod service;
pub mod submission;

pub use crate::storage::repository::Reading;
pub use error::{ErrorKind, ErrorPayload, ReadingError};
pub use service::{
    CreatedReading, ReadingService, ServiceSettings, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT,
};
pub use submission::{CategoryField, Submission};
