pub mod config;
pub mod post_tool;
pub mod pre_tool;
pub mod root;
pub mod run;
