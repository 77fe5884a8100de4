pub mod record;
pub mod registry;
pub mod report;
