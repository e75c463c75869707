pub mod errors;
pub mod filters;
pub mod models;
pub mod repo;
pub mod scheduler;
pub mod service;
pub mod session;
pub mod stats;
pub mod view;

pub use errors::*;
pub use filters::*;
pub use models::*;
pub use repo::*;
pub use scheduler::*;
pub use service::*;
pub use session::*;
pub use stats::*;
pub use view::*;
