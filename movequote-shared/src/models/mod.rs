pub mod codes;
pub mod customer;
pub mod order;
