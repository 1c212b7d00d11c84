pub mod context;
pub mod explainer;
pub mod rating_model;
pub mod recommender;
pub mod scoring;
pub mod selector;
