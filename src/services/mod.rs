pub mod auth;
pub mod email;
pub mod token;

pub use auth::AuthService;
pub use email::{EmailService, OutgoingEmail};
pub use token::PasswordResetTokenGenerator;
