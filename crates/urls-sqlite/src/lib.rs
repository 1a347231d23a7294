mod open;
mod models;
mod insert;
mod query;
mod schema;
mod store;

pub use open::Db;
pub use models::*;
pub use store::Store;
