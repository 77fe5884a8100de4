pub mod aggregate;
pub mod attribution;
pub mod buckets;
pub mod csv;
pub mod filter;
