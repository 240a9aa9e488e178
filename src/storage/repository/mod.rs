pub mod reading_repo;

pub use reading_repo::{Reading, ReadingRepository, StoreStats};
