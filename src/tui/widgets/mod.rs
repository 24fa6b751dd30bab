pub mod color;
pub mod editor;
pub mod focus;
pub mod form;
pub mod help;
pub mod history;
pub mod review;
pub mod schedule_list;
pub mod status_bar;
