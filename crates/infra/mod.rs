pub mod db;
pub mod view_cache;
