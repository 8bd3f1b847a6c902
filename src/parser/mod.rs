pub mod tdr;
