pub mod date_range;
pub mod db_utils;
