pub mod csc;
pub mod entropy;
pub mod lfsr;
pub mod model;
pub mod stats;
