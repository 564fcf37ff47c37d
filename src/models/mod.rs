pub mod login;
pub mod user;

pub use login::{LoginOutcome, LoginResponse};
pub use user::UserRecord;
