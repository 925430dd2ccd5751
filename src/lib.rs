//! Market Analyst - tool-calling agents for market analysis
//!
//! Agents answer questions by looping over a reasoning backend and the tools
//! in their registry. A coordinator reaches specialists through synthetic
//! tools, so a trading advisor can delegate to fundamental, technical,
//! sentiment and risk analysts and merge what they report.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
