//! Reading `config.toml`, and writing the commented template on first run.

mod loader;
mod template;

#[cfg(test)]
mod tests;

pub use loader::{create_default_config, load_default, load_from_path};
