pub mod auth;
pub mod contact;
pub mod creations;
pub mod services;
pub mod settings;
pub mod social_links;
pub mod upload;
