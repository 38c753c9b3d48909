pub mod favorite;
pub mod movie;
pub mod user;

pub use favorite::*;
pub use movie::*;
pub use user::*;
