pub mod capture;
pub mod chat;
mod effects;
pub mod observe;
mod terminal;
mod ui;
