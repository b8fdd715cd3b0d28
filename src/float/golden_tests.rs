use super::*;
use core::f64::consts::PI;
use num_complex::Complex64;

const EPSILON: f64 = 1e-9;

fn assert_cplx_eq(a: Complex64, b: Complex64) {
    assert!((a - b).norm() < EPSILON, "Complex mismatch: {} vs {}", a, b);
}

fn dft(values: &[Complex64]) -> Vec<Complex64> {
    let n = values.len();
    (0..n)
        .map(|k| {
            values
                .iter()
                .enumerate()
                .map(|(m, &x)| {
                    let angle = -2.0 * PI * ((k * m) % n) as f64 / n as f64;
                    x * Complex64::new(angle.cos(), angle.sin())
                })
                .sum()
        })
        .collect()
}

#[test]
fn test_precompute_bitrev_8() {
    let n = 8;
    let mut bitrev = vec![0; n];
    precompute_bitrev(&mut bitrev, n);
    assert_eq!(bitrev, vec![0, 4, 2, 6, 1, 5, 3, 7]);
}

#[test]
fn test_reverse_bits_examples() {
    assert_eq!(reverse_bits(3, 3), 6);
    assert_eq!(reverse_bits(5, 3), 5);
}

#[test]
fn test_bit_reverse_permutation() {
    let values: Vec<usize> = (0..8).collect();
    let reordered = bit_reverse_permutation(&values).unwrap();
    for (address, &value) in values.iter().enumerate() {
        assert_eq!(reordered[reverse_bits(address, 3)], value);
    }
    assert!(bit_reverse_permutation(&[1, 2, 3]).is_err());
}

#[test]
fn test_butterfly() {
    let (c, d) = butterfly(
        Complex64::new(1.0, 2.0),
        Complex64::new(3.0, -1.0),
        Complex64::new(0.0, -1.0),
    );
    // b*t = (3 - i)(-i) = -1 - 3i
    assert_cplx_eq(c, Complex64::new(0.0, -1.0));
    assert_cplx_eq(d, Complex64::new(2.0, 5.0));
}

#[test]
fn test_fft_1010() {
    let input: Vec<Complex64> = [1.0, 0.0, 1.0, 0.0]
        .iter()
        .map(|&re| Complex64::new(re, 0.0))
        .collect();
    let output = fft(&input).unwrap();
    let expected = [2.0, 0.0, 2.0, 0.0];
    for (o, &e) in output.iter().zip(expected.iter()) {
        assert_cplx_eq(*o, Complex64::new(e, 0.0));
    }
}

#[test]
fn test_fft_impulse() {
    // Impulse at 0 -> flat spectrum
    let mut input = vec![Complex64::new(0.0, 0.0); 16];
    input[0] = Complex64::new(1.0, 0.0);
    for v in fft(&input).unwrap() {
        assert_cplx_eq(v, Complex64::new(1.0, 0.0));
    }
}

#[test]
fn test_fft_matches_dft() {
    for n in [2usize, 4, 8, 32, 128] {
        let input: Vec<Complex64> = (0..n)
            .map(|i| Complex64::new(((i * 7) % 11) as f64 / 11.0 - 0.5, ((i * 3) % 5) as f64 / 5.0))
            .collect();
        let expected = dft(&input);
        let received = fft(&input).unwrap();
        for (r, e) in received.iter().zip(expected.iter()) {
            assert!((r - e).norm() < 1e-9 * n as f64, "n={n}: {r} vs {e}");
        }
    }
}

#[test]
fn test_last_stage_combines_halves() {
    // The final stage pairs element i with element i + N/2 using twiddle(i, N)
    let n = 8;
    let input: Vec<Complex64> = (0..n).map(|i| Complex64::new(i as f64, -(i as f64))).collect();
    let mut buffer = input.clone();
    apply_stage(2, &mut buffer);
    for i in 0..n / 2 {
        let (c, d) = butterfly(input[i], input[i + n / 2], twiddle(i, n));
        assert_cplx_eq(buffer[i], c);
        assert_cplx_eq(buffer[i + n / 2], d);
    }
}

#[test]
fn test_fft_rejects_bad_lengths() {
    assert!(fft(&[]).is_err());
    assert!(fft(&[Complex64::new(0.0, 0.0); 6]).is_err());
}
