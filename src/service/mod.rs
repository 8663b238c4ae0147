pub mod date_parser;
pub mod natural_date;
