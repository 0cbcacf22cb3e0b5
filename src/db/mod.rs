pub mod pool;
pub mod reports;

pub use pool::create_pool;
