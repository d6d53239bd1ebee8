pub mod auth;
pub mod database;
pub mod email;
pub mod ordering;
pub mod sessions;

pub use auth::{AuthCodeStore, AuthService, MemoryCodeStore};
pub use database::{Database, RankedCollection};
pub use email::{EmailProvider, LogEmailService, MockEmailService, SmtpEmailService};
pub use sessions::SessionRegistry;
