/*!
Configuration, command handling and output for the admin tool
*/

pub mod commands;
pub mod config;
pub mod render;
