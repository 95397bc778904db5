//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the backup and config layers.

pub mod backup;
pub mod config;
pub mod keys;

pub use backup::{
    handle_read_command, handle_restore_command, handle_save_command, ReadArgs, RestoreArgs,
    SaveArgs,
};
pub use config::{handle_config_command, ConfigCommands};
pub use keys::{handle_gen_keys_command, GenKeysArgs};
