pub mod marriage;
