pub mod parser;
pub mod pipeline;
pub mod sync;

pub use crate::domain::model::{CfList, CfPolicy, RawList, SyncPlan};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
