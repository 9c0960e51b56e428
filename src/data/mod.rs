pub mod extract;
pub mod ingest;
pub mod loot_tables;
pub mod records;
