pub mod backend;
pub mod conf;
pub mod core;
pub mod fixture;
pub mod measure;
pub mod operation;
pub mod report;
pub mod run;

#[cfg(feature = "testutil")]
pub mod testutil;
