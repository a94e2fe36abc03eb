pub mod router;
pub mod routes;

pub use router::{AnsweredModel, RelayState, relay_router};
