pub(crate) mod aws;
pub(crate) mod clipboard;
pub(crate) mod config;
pub(crate) mod tui;
