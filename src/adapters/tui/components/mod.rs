pub(crate) mod filter_bar;
pub(crate) mod popup;
pub(crate) mod record_form;
pub(crate) mod resource_table;
