pub mod config_command;
pub mod roll_command;
