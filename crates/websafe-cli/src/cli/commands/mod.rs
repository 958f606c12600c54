pub mod dispatch;
pub mod health;
pub mod scan;
pub mod serve;

pub use dispatch::dispatch;
