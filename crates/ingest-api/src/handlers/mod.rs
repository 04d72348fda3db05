pub mod health;
pub mod profile;
pub mod prompt;
pub mod upload_token;
