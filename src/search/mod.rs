pub mod linkup;

pub use linkup::LinkupClient;
