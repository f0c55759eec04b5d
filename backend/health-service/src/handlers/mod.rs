pub mod auth;
pub mod community;
pub mod feed_ws;
pub mod health;
pub mod health_data;
pub mod users;

pub use auth::*;
pub use community::*;
pub use feed_ws::*;
pub use health::*;
pub use health_data::*;
pub use users::*;
