#![allow(clippy::doc_markdown)]
#![doc = include_str!("../README.md")]

pub mod balance;
pub mod billing;
pub mod prelude;
pub mod revenue;
pub mod series;
pub mod statistics;
pub mod tables;
pub mod tariff;
