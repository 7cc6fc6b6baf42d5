pub mod issue;
pub mod row;
