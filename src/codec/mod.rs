//! SBC subband codec
//!
//! Polyphase analysis and synthesis filter banks, the bitslice allocator, the uniform
//! quantizer and the per-frame encoder/decoder built on top of them.

pub mod bitalloc;
pub mod decoder;
pub mod encoder;
pub mod filterbank;
pub mod quantizer;
pub mod tables;

// Re-export main types
pub use bitalloc::{allocate, bitneed, select_joint_subbands};
pub use decoder::{dequantize_frame, Decoder};
pub use encoder::Encoder;
pub use filterbank::{AnalysisFilterBank, SynthesisFilterBank};
pub use quantizer::{dequantize, quantize, scale_factor, scale_factor_of};
