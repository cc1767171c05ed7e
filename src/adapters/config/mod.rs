pub(crate) mod file_store;
