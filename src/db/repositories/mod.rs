pub(crate) mod backup;
mod clients;
mod goals;
mod sessions;
pub(crate) mod settings;
