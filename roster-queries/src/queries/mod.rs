pub mod create_user;
pub mod get_user_by_id;
pub mod get_users;

pub use create_user::CreateUser;
pub use get_user_by_id::GetUserById;
pub use get_users::GetUsers;
