pub mod backend;
pub mod cases;
pub mod credential;
pub mod error;
pub mod records;
pub mod repository;
pub mod search;
pub mod statistics;
pub mod vocabulary;

#[cfg(test)]
mod testing;
