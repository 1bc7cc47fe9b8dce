pub mod auth;
pub mod messages;
pub mod reset;

pub use auth::{CurrentUser, SessionAuth};
pub use messages::{FlashMessage, Level};
pub use reset::SessionResetToken;
