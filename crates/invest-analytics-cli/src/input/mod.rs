pub mod csv_history;
pub mod dates;
pub mod file;
pub mod stdin;
