pub mod loader;
pub mod preview;
pub mod profiles;
pub mod run;
pub mod s3;
pub mod transfer;

pub use loader::Loader;
pub use profiles::ProfileSource;
pub use run::run_app;
pub use s3::{S3SessionFactory, SessionFactory, StorageGateway};
