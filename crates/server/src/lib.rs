pub mod config;

pub mod elastic;

pub mod filters;

pub mod taxonomy;

pub mod query;

pub mod stats;

pub mod selected;

pub mod error_convert;

pub mod state;

pub mod rest;

pub mod health;

pub mod openapi;

pub mod telemetry;
