//! Spectrum

mod rgb_spectrum;

// Re-export
pub use rgb_spectrum::*;

/// Light is carried as linear RGB triples.
pub type Spectrum = RGBSpectrum;
