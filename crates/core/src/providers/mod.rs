pub mod registry;
pub mod traits;

// Quote source implementations
pub mod bigpara;
pub mod tefas;
pub mod truncgil;
