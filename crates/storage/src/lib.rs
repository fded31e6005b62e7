//! On-disk state of the grader: the dataset being labeled and the settings file.

mod atomic;
pub mod dataset;
pub mod settings;

pub use dataset::{Dataset, DatasetError, TableFormat};
pub use settings::{
    load_settings, load_settings_or_default, save_settings, Settings, SettingsStore,
};
