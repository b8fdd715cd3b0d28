use super::*;
use crate::common::ErrorKind;
use crate::fixed::codec::resolution;
use crate::test_util::{random_samples, seeded, to_complex};
use crate::twiddle::twiddle;
use num_complex::Complex64;
use std::vec;

fn stage(n: usize, spcc: usize, input_width: u32) -> Stage {
    Stage::new(
        n,
        spcc,
        input_width,
        input_width,
        ButterflyPipeline::default(),
        StagePipeline::default(),
    )
    .unwrap()
}

#[test]
fn test_chunks_round_trip() {
    let block: Vec<usize> = (0..16).collect();
    let chunks = to_chunks(&block, 4).unwrap();
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0], Chunk::new(vec![0, 1], vec![8, 9]));
    assert_eq!(chunks[3], Chunk::new(vec![6, 7], vec![14, 15]));
    assert_eq!(from_chunks(&chunks), block);

    // the unrolled network's single beat
    let beat = to_chunks(&block[..4], 4).unwrap();
    assert_eq!(beat, vec![Chunk::new(vec![0, 1], vec![2, 3])]);

    assert!(to_chunks(&block[..6], 8).is_err());
}

#[test]
fn test_new_checks() {
    let pipeline = ButterflyPipeline::default();
    let registers = StagePipeline::default();
    assert_eq!(
        Stage::new(8, 8, 16, 16, pipeline, registers),
        Err(HtfftError::TooSmall { name: "stage size", value: 8, min: 16 })
    );
    assert_eq!(
        Stage::new(24, 4, 16, 16, pipeline, registers).unwrap_err().kind(),
        ErrorKind::Configuration
    );
    assert_eq!(Stage::new(32, 4, 15, 16, pipeline, registers), Err(HtfftError::OddWidth(15)));
}

#[test]
fn test_batch_twiddles() {
    let s = stage(32, 8, 16);
    assert_eq!(s.batches.len(), 4);
    let positions: Vec<usize> = s.batches[2].twiddles.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![8, 9, 10, 11]);
}

#[test]
fn test_latency_and_width() {
    let s = stage(32, 4, 18);
    assert_eq!(s.buffer_latency(), 4);
    assert_eq!(s.latency(), 4 + 2 + 7);
    assert_eq!(s.output_width(), 20);

    let bare = Stage::new(
        32,
        4,
        18,
        16,
        ButterflyPipeline::default(),
        StagePipeline {
            register_read: false,
            register_operands: false,
        },
    )
    .unwrap();
    assert_eq!(bare.latency(), 4 + 7);
}

#[test]
fn test_apply_batch_identity() {
    let s = stage(8, 4, 8);
    let one = ComplexFixed::from_complex(Complex64::new(1.0, 0.0), 8).unwrap();
    let zero = ComplexFixed::zero(8);
    let out = s.apply_batch(0, &[one, zero], &[zero, zero]).unwrap();
    assert_eq!(out.a[0].to_complex(), Complex64::new(0.5, 0.0));
    assert_eq!(out.b[0].to_complex(), Complex64::new(0.5, 0.0));
    assert_eq!(out.a[0].width(), 10);

    assert_eq!(
        s.apply_batch(0, &[one], &[zero]),
        Err(HtfftError::LaneCountMismatch { expected: 2, got: 1 })
    );
    let wide = ComplexFixed::zero(10);
    assert!(matches!(
        s.apply_batch(0, &[wide, wide], &[wide, wide]),
        Err(HtfftError::WidthMismatch { .. })
    ));
}

#[test]
fn test_apply_batch_checks_twiddle_table() {
    let one = ComplexFixed::from_complex(Complex64::new(1.0, 0.0), 8).unwrap();
    let lanes = [one, one];

    let mut empty = stage(8, 4, 8);
    empty.batches.clear();
    assert_eq!(
        empty.apply_batch(3, &lanes, &lanes),
        Err(HtfftError::LaneCountMismatch { expected: 2, got: 0 })
    );

    let mut short = stage(8, 4, 8);
    short.batches[1].twiddles.pop();
    assert_eq!(
        short.apply_batch(1, &lanes, &lanes),
        Err(HtfftError::LaneCountMismatch { expected: 2, got: 1 })
    );
    assert!(short.apply_batch(0, &lanes, &lanes).is_ok());
}

#[test]
fn test_operand_schedule() {
    for (n, spcc) in [(8, 4), (16, 4), (64, 8), (32, 2)] {
        let s = stage(n, spcc, 16);
        let x: Vec<usize> = (0..n).collect();
        // two half-blocks in the format of the previous stage
        let mut beats = to_chunks(&x[..n / 2], spcc).unwrap();
        beats.extend(to_chunks(&x[n / 2..], spcc).unwrap());

        let operands = s.operand_schedule(&beats).unwrap();
        assert_eq!(operands.len(), n / spcc);
        for (b, pair) in operands.iter().enumerate() {
            let start = b * spcc / 2;
            assert_eq!(pair.a, x[start..start + spcc / 2].to_vec());
            assert_eq!(pair.b, x[n / 2 + start..n / 2 + start + spcc / 2].to_vec());
        }
    }
}

#[test]
fn test_schedule_output_matches_final_order() {
    // what a stage emits, collected a-then-b, is the block in natural order
    let s = stage(16, 4, 16);
    let x: Vec<usize> = (0..16).collect();
    let mut beats = to_chunks(&x[..8], 4).unwrap();
    beats.extend(to_chunks(&x[8..], 4).unwrap());
    let operands = s.operand_schedule(&beats).unwrap();
    let firsts: Vec<usize> = operands.iter().flat_map(|c| c.a.clone()).collect();
    assert_eq!(firsts, (0..8).collect::<Vec<_>>());
}

#[test]
fn test_process_block_combines_halves() {
    let mut rng = seeded(23);
    for (n, spcc, width) in [(8, 4, 16), (32, 4, 20), (64, 8, 18)] {
        let s = stage(n, spcc, width);
        let y = random_samples(&mut rng, n / 2, width);
        let z = random_samples(&mut rng, n / 2, width);
        let mut beats = to_chunks(&y, spcc).unwrap();
        beats.extend(to_chunks(&z, spcc).unwrap());

        let out = from_chunks(&s.process_block(&beats).unwrap());
        assert_eq!(out.len(), n);
        assert!(out.iter().all(|v| v.width() == width + 2));

        let (y, z) = (to_complex(&y), to_complex(&z));
        let out = to_complex(&out);
        let allowed = 2.0 * resolution(width);
        for k in 0..n / 2 {
            let t = twiddle(k, n);
            let c = (y[k] + z[k] * t) / 2.0;
            let d = (y[k] - z[k] * t) / 2.0;
            assert!((out[k] - c).norm() < allowed, "n={n} k={k}");
            assert!((out[k + n / 2] - d).norm() < allowed, "n={n} k={k}");
        }
    }
}

#[test]
fn test_process_block_checks_beats() {
    let s = stage(16, 4, 16);
    let beats = to_chunks(&random_samples(&mut seeded(2), 8, 16), 4).unwrap();
    assert_eq!(
        s.process_block(&beats),
        Err(HtfftError::LaneCountMismatch { expected: 4, got: 2 })
    );
}
