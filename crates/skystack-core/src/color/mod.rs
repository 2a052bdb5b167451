pub mod cfa;
