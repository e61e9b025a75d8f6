mod in_memory;
mod reqwest_transport;

pub use in_memory::InMemoryTransport;
pub use reqwest_transport::ReqwestTransport;
