pub mod monsters;
