pub mod memo;
