mod store;

pub use store::{write_json_pretty, JsonStore, AOS_DIR};
