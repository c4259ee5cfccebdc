pub mod config;
pub mod domain;
pub mod list;
pub mod sort;
pub mod status;

pub use config::{Preferences, PreferencesStore};
pub use domain::{Bucket, DownloadReport, ObjectEntry, ObjectPreview, Profile};
pub use list::{ListAction, ListEntry, ListModel};
pub use sort::SortCriteria;
pub use status::{MessageLevel, StatusMessage, StatusReporter};
