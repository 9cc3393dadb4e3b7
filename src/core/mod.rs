pub mod group;
pub mod members;
pub mod normalize;
pub mod reconcile;

pub use crate::domain::model::{DeviceRow, RunReport, SyscodeBucket, WorkItem};
pub use crate::domain::ports::{AssetApi, ConfigProvider};
pub use crate::utils::error::Result;
