use rustfft::{num_complex::Complex, FftPlanner};

use super::decode::SignalData;
use super::spectrum::{PowerSpectrum, SliceSet, SpectrumSlice};

/// Analyzes the full signal into time slices of the power spectrum, one per
/// `refresh_interval_ms` of playback. Pure: identical input yields an
/// identical `SliceSet`, so it runs once per loaded file and is reused.
pub fn analyze(signal: &SignalData, refresh_interval_ms: u32) -> SliceSet {
    let spectrum = power_spectrum(signal);
    let count = slice_count(signal.duration_seconds(), refresh_interval_ms);

    log::info!(
        "Analyzed {} bins into {} slices ({}ms each)",
        spectrum.len(),
        count,
        refresh_interval_ms
    );

    partition(spectrum, count, refresh_interval_ms)
}

/// One-sided power spectrum of the whole signal.
///
/// Magnitudes are normalized by the sample count before squaring, and the
/// discarded negative-frequency energy is folded back by doubling every bin
/// except DC and, for even-length signals, the mirror-less Nyquist bin.
pub fn power_spectrum(signal: &SignalData) -> PowerSpectrum {
    let n = signal.samples.len();

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);

    let mut buffer: Vec<Complex<f32>> = signal
        .samples
        .iter()
        .map(|&s| Complex::new(s, 0.0))
        .collect();
    fft.process(&mut buffer);

    // Non-negative frequency half: ceil((n + 1) / 2) bins.
    let kept = n / 2 + 1;
    let scale = 1.0 / n as f32;
    let mut power: Vec<f32> = buffer[..kept]
        .iter()
        .map(|c| {
            let magnitude = c.norm() * scale;
            magnitude * magnitude
        })
        .collect();

    let fold_end = if n % 2 == 0 { kept - 1 } else { kept };
    for value in &mut power[1..fold_end] {
        *value *= 2.0;
    }

    let bin_hz = signal.sample_rate as f32 / n as f32;
    let frequencies: Vec<f32> = (0..kept).map(|j| j as f32 * bin_hz).collect();

    PowerSpectrum { frequencies, power }
}

fn slice_count(duration_seconds: f64, refresh_interval_ms: u32) -> usize {
    (duration_seconds * 1000.0 / refresh_interval_ms as f64).ceil() as usize
}

fn partition(spectrum: PowerSpectrum, count: usize, refresh_interval_ms: u32) -> SliceSet {
    let sizes = partition_sizes(spectrum.len(), count);

    let mut slices = Vec::with_capacity(count);
    let mut offset = 0;
    for size in sizes {
        slices.push(SpectrumSlice {
            frequencies: spectrum.frequencies[offset..offset + size].to_vec(),
            power: spectrum.power[offset..offset + size].to_vec(),
        });
        offset += size;
    }

    SliceSet::new(slices, refresh_interval_ms)
}

/// Near-equal split of `total` elements into `parts` groups: sizes differ by
/// at most one, with leading groups taking the extra element.
fn partition_sizes(total: usize, parts: usize) -> Vec<usize> {
    let base = total / parts;
    let extra = total % parts;
    (0..parts)
        .map(|i| if i < extra { base + 1 } else { base })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn signal(samples: Vec<f32>, sample_rate: u32) -> SignalData {
        SignalData {
            samples,
            sample_rate,
        }
    }

    fn sine(freq_hz: f32, sample_rate: u32, len: usize) -> SignalData {
        let samples = (0..len)
            .map(|i| (TAU * freq_hz * i as f32 / sample_rate as f32).sin())
            .collect();
        signal(samples, sample_rate)
    }

    #[test]
    fn keeps_one_sided_bin_count() {
        // ceil((n + 1) / 2) for even and odd n.
        for (n, expected) in [(4usize, 3usize), (5, 3), (44100, 22051), (1, 1), (2, 2)] {
            let spectrum = power_spectrum(&signal(vec![0.1; n], 8000));
            assert_eq!(spectrum.len(), expected, "n = {n}");
            assert_eq!(spectrum.frequencies.len(), spectrum.power.len());
        }
    }

    #[test]
    fn frequency_axis_starts_at_zero_with_uniform_spacing() {
        let n = 1000;
        let sample_rate = 8000;
        let spectrum = power_spectrum(&signal(vec![0.5; n], sample_rate));

        assert_eq!(spectrum.frequencies[0], 0.0);
        let step = sample_rate as f32 / n as f32;
        for pair in spectrum.frequencies.windows(2) {
            let delta = pair[1] - pair[0];
            assert!((delta - step).abs() < 1e-3);
            assert!(delta > 0.0);
        }
    }

    #[test]
    fn power_is_non_negative() {
        let spectrum = power_spectrum(&sine(440.0, 8000, 4001));
        assert!(spectrum.power.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn silence_yields_zero_power_and_two_half_slices() {
        let set = analyze(&signal(vec![0.0; 44100], 44100), 500);

        assert_eq!(set.len(), 2);
        let sizes: Vec<usize> = set.slices().iter().map(|s| s.power.len()).collect();
        assert_eq!(sizes.iter().sum::<usize>(), 22051);
        assert!(sizes[0].abs_diff(sizes[1]) <= 1);
        for slice in set.slices() {
            assert!(slice.power.iter().all(|&p| p == 0.0));
        }
    }

    #[test]
    fn sine_peak_lands_within_one_bin_of_its_frequency() {
        let sample_rate = 44100;
        let set_signal = sine(1000.0, sample_rate, 44100);
        let spectrum = power_spectrum(&set_signal);

        let (peak_idx, _) = spectrum
            .power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        let bin_hz = sample_rate as f32 / 44100.0;
        assert!((spectrum.frequencies[peak_idx] - 1000.0).abs() <= bin_hz);
    }

    #[test]
    fn concatenated_slices_reproduce_the_spectrum() {
        let source = sine(523.25, 22050, 22050 * 3 + 7);
        let spectrum = power_spectrum(&source);
        let set = analyze(&source, 500);

        let full = set.concat();
        assert_eq!(full.frequencies, spectrum.frequencies);
        assert_eq!(full.power, spectrum.power);
    }

    #[test]
    fn analyze_is_deterministic() {
        let source = sine(880.0, 8000, 12000);
        let first = analyze(&source, 250);
        let second = analyze(&source, 250);
        assert_eq!(first, second);
    }

    #[test]
    fn slice_count_rounds_up() {
        assert_eq!(slice_count(1.0, 500), 2);
        assert_eq!(slice_count(1.2, 500), 3);
        assert_eq!(slice_count(0.001, 500), 1);
        assert_eq!(slice_count(105.0, 500), 210);
    }

    #[test]
    fn partition_sizes_are_near_equal_with_leading_extras() {
        assert_eq!(partition_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(partition_sizes(9, 3), vec![3, 3, 3]);
        assert_eq!(partition_sizes(2, 5), vec![1, 1, 0, 0, 0]);

        let sizes = partition_sizes(22051, 210);
        assert_eq!(sizes.iter().sum::<usize>(), 22051);
        let max = sizes.iter().max().unwrap();
        let min = sizes.iter().min().unwrap();
        assert!(max - min <= 1);
    }

    #[test]
    fn odd_length_doubles_every_non_dc_bin() {
        // A constant signal concentrates all energy at DC, which must never
        // be doubled: power[0] = (sum / n)^2 = amplitude^2.
        let spectrum = power_spectrum(&signal(vec![0.25; 5], 1000));
        assert!((spectrum.power[0] - 0.0625).abs() < 1e-6);
    }

    #[test]
    fn parseval_energy_is_consistent_for_even_and_odd_lengths() {
        // With amplitude-by-n scaling and folding, a full-scale sine with an
        // integer cycle count puts ~0.5 of power into its single bin.
        for len in [8000usize, 8001] {
            let spectrum = power_spectrum(&sine(1000.0, 8000, len));
            let total: f32 = spectrum.power.iter().sum();
            assert!((total - 0.5).abs() < 1e-2, "len = {len}, total = {total}");
        }
    }
}
