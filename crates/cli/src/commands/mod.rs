pub mod lint;
pub mod test;
