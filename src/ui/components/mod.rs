pub mod dashboard;
pub mod file_tree;
pub mod import_form;
pub mod progress_bar;
pub mod stats_sidebar;
pub mod typing_area;
