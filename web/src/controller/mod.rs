pub(crate) mod diagnostics_controller;
pub(crate) mod health_check_controller;
