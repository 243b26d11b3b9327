//! Items: data model, connection factory and persistence.

pub mod connection;
pub mod mock;
pub mod store;
pub mod types;

pub use connection::ConnectionFactory;
pub use mock::{MockItemStore, MockStoreConfig};
pub use store::{ItemStore, PgItemStore};
pub use types::{CreateItemRequest, Item, NewItem};
