use serde::Serialize;

/// One-sided power spectrum of the full signal, before slicing. Frequencies
/// and power run in parallel: `power[j]` is the energy at `frequencies[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    pub frequencies: Vec<f32>,
    pub power: Vec<f32>,
}

impl PowerSpectrum {
    pub fn len(&self) -> usize {
        self.power.len()
    }
}

/// One refresh tick's worth of display data: a contiguous sub-range of the
/// spectrum, frequency and power axes sharing boundaries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpectrumSlice {
    pub frequencies: Vec<f32>,
    pub power: Vec<f32>,
}

/// The full spectrum partitioned into contiguous, ordered, non-overlapping
/// slices, one per refresh interval of playback. Computed once per loaded
/// file and read-only for the rest of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SliceSet {
    slices: Vec<SpectrumSlice>,
    refresh_interval_ms: u32,
}

impl SliceSet {
    pub(crate) fn new(slices: Vec<SpectrumSlice>, refresh_interval_ms: u32) -> Self {
        Self {
            slices,
            refresh_interval_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn get(&self, index: usize) -> Option<&SpectrumSlice> {
        self.slices.get(index)
    }

    pub fn slices(&self) -> &[SpectrumSlice] {
        &self.slices
    }

    pub fn refresh_interval_ms(&self) -> u32 {
        self.refresh_interval_ms
    }

    /// Rebuilds the unsliced spectrum for the full-range plot.
    pub fn concat(&self) -> SpectrumSlice {
        let total: usize = self.slices().iter().map(|s| s.power.len()).sum();
        let mut frequencies = Vec::with_capacity(total);
        let mut power = Vec::with_capacity(total);
        for slice in self.slices() {
            frequencies.extend_from_slice(&slice.frequencies);
            power.extend_from_slice(&slice.power);
        }
        SpectrumSlice { frequencies, power }
    }
}
