pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::csv_source::read_device_rows;
pub use adapters::http::HttpAssetApi;
pub use config::CliConfig;
pub use core::reconcile::Reconciler;
pub use domain::model::{BucketStatus, DeviceRow, RunReport};
pub use domain::ports::{AssetApi, ConfigProvider};
pub use utils::error::{Result, SyncError};
pub use utils::retry::RetryPolicy;
