pub mod header;
pub mod ids;
pub mod request;
pub mod response;

pub use header::*;
pub use ids::*;
pub use request::*;
pub use response::*;
