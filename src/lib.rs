pub mod config;
pub mod datatable;
pub mod dataset;
pub mod earnings;
pub mod fetch;
pub mod format;
pub mod infra;
pub mod multimap;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod services;
pub mod shape;
pub mod source;
pub mod stats;
pub mod subject;
pub mod theme;
