mod health;
mod url;

pub use health::health_handler;
pub use url::{add_url_handler, index_handler, list_all_handler, redirect_handler};
