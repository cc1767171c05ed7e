pub(crate) mod app;
pub(crate) mod components;
pub(crate) mod edit_workflow;
pub(crate) mod event;
pub(crate) mod logging;
pub(crate) mod palette;
pub(crate) mod status;
pub(crate) mod text_utils;
pub(crate) mod ui;
pub(crate) mod views;
pub(crate) mod worker;
