use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use eeg_psd::config::ExtractionConfig;
use eeg_psd::normalization::DatasetNormalizer;
use eeg_psd::processing::filters::{ChebyshevType2, ZeroPhaseFilter};
use eeg_psd::processing::{ChannelPsdPipeline, HemisphereSummarizer, Recording};
use eeg_psd::table::{Column, FeatureTable};
use eeg_psd::ScalerKind;
use rand::{Rng, SeedableRng};

const SAMPLE_RATE: f64 = 256.0;
const CHANNEL_COUNTS: &[usize] = &[1, 8, 32, 62];
const DURATIONS_S: &[usize] = &[4, 16, 60];

fn synthetic_recording(channels: usize, samples: usize) -> Recording {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let rows = (0..channels)
        .map(|ch| {
            (0..samples)
                .map(|n| {
                    let t = n as f64 / SAMPLE_RATE;
                    let alpha = (2.0 * std::f64::consts::PI * (9.0 + ch as f64 * 0.05) * t).sin();
                    alpha + 0.2 * rng.gen_range(-1.0..1.0)
                })
                .collect()
        })
        .collect();
    match Recording::from_rows("bench.csv", rows) {
        Ok(recording) => recording,
        Err(e) => panic!("synthetic recording rejected: {}", e),
    }
}

fn benchmark_zero_phase_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("zero_phase_filter");
    let coefficients = ChebyshevType2::bandpass(2, 40.0, 8.0 / 128.0, 12.0 / 128.0).unwrap();
    let filter = ZeroPhaseFilter::new(coefficients).unwrap();

    for &window in &[128usize, 256, 1024] {
        let frame: Vec<f64> = (0..window).map(|n| (n as f64 * 0.25).sin()).collect();
        group.throughput(Throughput::Elements(window as u64));
        group.bench_with_input(BenchmarkId::new("alpha", window), &frame, |b, frame| {
            b.iter(|| filter.apply(black_box(frame)).unwrap());
        });
    }
    group.finish();
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel_psd_pipeline");
    group.sample_size(20);

    for &channels in CHANNEL_COUNTS {
        for &seconds in DURATIONS_S {
            let recording = synthetic_recording(channels, seconds * SAMPLE_RATE as usize);
            group.throughput(Throughput::Elements((channels * recording.num_samples()) as u64));

            for parallel in [false, true] {
                let config = ExtractionConfig {
                    parallel_channels: parallel,
                    ..ExtractionConfig::default()
                };
                let pipeline = ChannelPsdPipeline::new(&config).unwrap();
                let label = if parallel { "parallel" } else { "sequential" };
                group.bench_with_input(
                    BenchmarkId::new(label, format!("{}ch_{}s", channels, seconds)),
                    &recording,
                    |b, recording| {
                        b.iter(|| pipeline.process(black_box(recording)).unwrap());
                    },
                );
            }
        }
    }
    group.finish();
}

fn benchmark_summary_and_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");
    let recording = synthetic_recording(62, 60 * SAMPLE_RATE as usize);
    let psd = ChannelPsdPipeline::new(&ExtractionConfig::default())
        .unwrap()
        .process(&recording)
        .unwrap();
    let summarizer = HemisphereSummarizer::default();

    group.bench_function("hemisphere_62ch_60s", |b| {
        b.iter(|| summarizer.summarize(black_box(&psd), None).unwrap());
    });

    let mut rng = rand::rngs::StdRng::seed_from_u64(11);
    let rows = 10_000;
    let table = FeatureTable::new(
        ["ALPHA_L", "ALPHA_R", "BETA_L", "BETA_R", "DELTA_L", "DELTA_R", "THETA_L", "THETA_R"]
            .iter()
            .map(|name| Column::numeric(*name, (0..rows).map(|_| rng.gen_range(0.0..1e4)).collect()))
            .collect(),
    )
    .unwrap();

    for kind in [ScalerKind::Standard, ScalerKind::MinMax] {
        group.bench_with_input(
            BenchmarkId::new("fit_transform", format!("{:?}", kind)),
            &table,
            |b, table| {
                b.iter(|| DatasetNormalizer::fit_transform(black_box(table), kind).unwrap());
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_zero_phase_filter,
    benchmark_pipeline,
    benchmark_summary_and_scaling
);
criterion_main!(benches);
