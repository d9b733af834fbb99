pub mod registrar;

pub use registrar::OrderRegistrar;
