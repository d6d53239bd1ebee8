pub mod auth_code;
pub mod contact_request;
pub mod creation;
pub mod service;
pub mod setting;
pub mod social_link;

pub use auth_code::AuthCode;
pub use contact_request::ContactRequest;
pub use creation::{Creation, CreationImage};
pub use service::Service;
pub use setting::SiteSetting;
pub use social_link::SocialLink;
