//! Health Saathi - healthcare support chat backend
//!
//! A first-line assistant answers appointment and lab-package questions,
//! keyword classifiers decide when to hand the chat to a senior agent, and a
//! paced orchestrator plays the hand-off, closure and rating scripts.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
