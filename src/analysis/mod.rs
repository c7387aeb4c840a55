//! Signal analysis: loading, framed transforms and descriptors.

pub mod audio;
pub mod descriptors;
pub(crate) mod fft;
pub mod stft;
