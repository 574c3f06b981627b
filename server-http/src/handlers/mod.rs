pub mod health;
pub mod paste;

pub use health::health_check;
pub use paste::{create_paste, delete_paste, get_paste};
