#![allow(async_fn_in_trait)]
pub mod config;
pub mod dataset;
pub mod mapbox;
pub mod pipeline;
