pub mod flow;
pub mod form;
pub mod store;
pub mod validation;
