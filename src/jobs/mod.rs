pub mod kline_sync_job;

pub use kline_sync_job::KlineSyncJob;
