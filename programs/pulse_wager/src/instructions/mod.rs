pub mod admin;
pub mod commit;
pub mod escrow;
pub mod lifecycle;
pub mod oracle;
pub mod oracle_set;
pub mod reveal;
pub mod reward;
