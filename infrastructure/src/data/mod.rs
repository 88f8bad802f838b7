//! Data service
//!
//! CRUD over a [`DocumentStore`](kowalski_application::DocumentStore) with
//! uniform result envelopes. [`DataToolProvider`] exposes it as the
//! `get_databases`, `get_collections`, `get_fields_for_collection`,
//! `add_record`, `update_record` and `read_records` tools.
//!
//! Two stores are available: [`MemoryDocumentStore`] and, behind the
//! `mongo` feature, `MongoDocumentStore`.

mod filter;
mod memory;
#[cfg(feature = "mongo")]
mod mongo;
mod provider;
mod service;

pub use memory::MemoryDocumentStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoDocumentStore;
pub use provider::DataToolProvider;
pub use service::DataService;
