//! Rule priorities. Lower values run first.

use crate::parser::StatementKind;

pub const HIGHEST: i32 = 1;
pub const HIGH: i32 = 5;
pub const MEDIUM: i32 = 10;
pub const LOW: i32 = 20;
pub const LOWEST: i32 = 50;

/// Priority of rules that do not choose one.
pub const DEFAULT: i32 = 100;

pub const SELECT_DEFAULT: i32 = 10;
pub const INSERT_DEFAULT: i32 = 20;
pub const UPDATE_DEFAULT: i32 = 30;
pub const DELETE_DEFAULT: i32 = 40;

const KIND_DEFAULTS: [(StatementKind, i32); 4] = [
    (StatementKind::Select, SELECT_DEFAULT),
    (StatementKind::Insert, INSERT_DEFAULT),
    (StatementKind::Update, UPDATE_DEFAULT),
    (StatementKind::Delete, DELETE_DEFAULT),
];

/// Default priority of a typed rule targeting `kind`.
pub fn default_for(kind: StatementKind) -> i32 {
    KIND_DEFAULTS
        .iter()
        .find(|(candidate, _)| *candidate == kind)
        .map(|(_, priority)| *priority)
        .unwrap_or(DEFAULT)
}
