pub mod answer_box;
pub mod history_view;
pub mod loading;
pub mod menu;
pub mod proficiency;
pub mod progress_bar;
pub mod sentence_view;
pub mod validation_panel;
