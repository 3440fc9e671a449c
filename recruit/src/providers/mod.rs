//! Provider traits for recruit board dependencies.
//!
//! Every collaborator the workflows touch sits behind one of these traits and
//! is injected through [`RecruitEnvironment`](crate::environment::RecruitEnvironment).

pub mod console;
pub mod directory;
pub mod notification;
pub mod recruit_store;
pub mod sequence;
pub mod smtp;

pub use console::ConsoleNotificationDispatcher;
pub use directory::Directory;
pub use notification::{MailInfo, NotificationDispatcher};
pub use recruit_store::{RecruitStore, create_recruit};
pub use sequence::SequenceGenerator;
pub use smtp::SmtpNotificationDispatcher;
