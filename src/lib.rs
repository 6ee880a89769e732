//! Battlefield - attrition combat simulation between squad-based armies

pub mod battle;
pub mod core;
pub mod report;
