pub mod app;
pub mod camera;
pub mod color;
pub mod config;
pub mod galaxy;
pub mod keyframes;
pub mod logging;
pub mod panel;
pub mod params_file;
pub mod raster;
pub mod render;
pub mod scene;
pub mod scroll;
pub mod terminal;
pub mod visual;
