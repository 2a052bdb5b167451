pub mod entropy;

pub use entropy::{square_entropies, EntropyGrid};
