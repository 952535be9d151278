pub mod bootcamp;
pub mod common;
pub mod course;
pub mod envelope;
pub mod filter;
pub mod location;
pub mod query;
pub mod resource;
pub mod review;
pub mod user;

pub use bootcamp::*;
pub use common::*;
pub use course::*;
pub use envelope::*;
pub use filter::*;
pub use location::*;
pub use query::*;
pub use resource::{Cascade, Parent, Resource, Rollup};
pub use review::*;
pub use user::*;
