//! Actual-vs-predicted energy dashboard: a CSV time-series pipeline
//! (`data`) and the egui front end that renders it.

pub mod app;
pub mod color;
pub mod data;
pub mod state;
pub mod ui;
