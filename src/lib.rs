use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod about;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod enzymes;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod item;
pub mod mcp_server;
pub mod mixture;
pub mod order;
pub mod reaction;
pub mod restriction_enzyme;

lazy_static! {
    // Enzyme name to recognition sequence
    pub static ref ENZYMES: Enzymes = Enzymes::builtin();
}
