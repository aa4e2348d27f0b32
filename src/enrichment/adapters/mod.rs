pub mod linkedin;
pub mod web_search;
pub mod website;
pub mod wikipedia;
