mod adapter;
mod entity;
mod error;
mod filter;
mod processor;
mod query;
mod row;
mod statement;
mod util;
mod value;

pub use ::anyhow::Context;
pub use adapter::*;
pub use entity::*;
pub use error::*;
pub use filter::*;
pub use processor::*;
pub use query::*;
pub use row::*;
pub use statement::*;
pub use util::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
