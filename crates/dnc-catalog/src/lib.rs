//! LinkedIn Learning catalog client.
//!
//! Authenticates with the OAuth client-credentials grant, searches the
//! `learningAssets` finder page by page and looks single assets up by URN.

mod client;
mod token;
mod wire;

pub mod error;

pub use client::{LinkedInClient, LinkedInConfig};
pub use error::{Error, Result};
