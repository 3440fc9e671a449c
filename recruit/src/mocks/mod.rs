//! In-memory provider implementations for tests and the demo binary.
//!
//! Each one keeps its data behind an `Arc<Mutex<..>>` and performs the whole
//! read-modify-write under a single lock, so they honor the same atomicity
//! contracts as the `PostgreSQL` stores.

pub mod directory;
pub mod notification;
pub mod recruit_store;
pub mod sequence;

pub use directory::InMemoryDirectory;
pub use notification::RecordingDispatcher;
pub use recruit_store::InMemoryRecruitStore;
pub use sequence::InMemorySequenceGenerator;
