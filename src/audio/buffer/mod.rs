pub mod ring;

pub use ring::SampleRing;
