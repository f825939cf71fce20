pub mod batch;
pub mod export;
pub mod generate;
