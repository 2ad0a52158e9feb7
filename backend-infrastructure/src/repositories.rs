pub mod config_files;
pub mod preference_files;

pub use config_files::ConfigFileRepository;
pub use preference_files::PreferenceFileRepository;
