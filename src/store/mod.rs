mod params;
mod pool;

pub use params::{StoreParams, CONNECT_TIMEOUT};
pub use pool::{connect, create_pool};
