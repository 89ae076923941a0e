pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod kanban_board;
pub mod logging;
pub mod render;
pub mod store;
pub mod task;
pub mod transition;
pub mod ui;
pub mod view;
