pub mod app;
pub mod controller;
pub mod draw;
pub mod edit;
pub mod fields;
pub mod hit;
pub mod keymap;
pub mod list;
pub mod view;
