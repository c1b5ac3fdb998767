//! Post-processing stages: region decoding, rectification, and sequence
//! decoding.

pub mod ctc;
pub mod geometry;
pub mod link_decode;
pub mod rectify;

pub use ctc::{Alphabet, CtcGreedyDecoder, DecodedText, PAD_SYMBOL};
pub use geometry::{OrientedRect, Point};
pub use link_decode::RegionDecoder;
pub use rectify::RegionRectifier;
