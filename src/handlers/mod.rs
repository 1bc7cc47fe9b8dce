pub mod health;
pub mod home;
pub mod logout;
pub mod password_change;
pub mod password_reset;
pub mod signin;
pub mod signup;

pub use health::health_check;
pub use home::home;
pub use logout::logout;
pub use password_change::{password_change, password_change_page};
pub use password_reset::{
    password_reset, password_reset_confirm, password_reset_confirm_page, password_reset_page,
};
pub use signin::{signin, signin_page};
pub use signup::{signup, signup_page};
