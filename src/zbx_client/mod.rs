pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;
pub(crate) mod rpc;

pub use client::ZbxClient;
pub use models::{Host, Item, NewHost, NewItem, NewTrigger, Trigger};
