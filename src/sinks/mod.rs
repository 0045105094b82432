//! Output sinks consuming finished report tables

mod csv;

pub use csv::CsvSink;
