//! Chanlist Benchmarks
//!
//! Measures the per-stream setup cost of building, validating, and
//! exporting chanlists.
//!
//! # Running
//!
//! ```bash
//! cargo bench -p daq-chanlist
//! ```
//!
//! # Benchmark Scenarios
//!
//! - Building lists with a trigger prefix
//! - Validation against a full-featured analog input
//! - Text save/load
//! - Transport exports

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use daq_chanlist::capabilities::sdf;
use daq_chanlist::{
    AnalogReference, CapabilityDescriptor, CapabilityValidator, ChannelList, ChanspecFlags,
    Direction, RangeTable, SubdeviceClass,
};

const SIZES: [u32; 4] = [1, 16, 64, 256];

fn build_list(n_channels: u32) -> ChannelList {
    let mut list = ChannelList::new();
    list.add_channel(
        0,
        0,
        AnalogReference::Ground,
        ChanspecFlags::empty(),
        Direction::StartTrigger,
    )
    .unwrap();
    list.add_channel(
        1,
        0,
        AnalogReference::Ground,
        ChanspecFlags::empty(),
        Direction::ConvertTrigger,
    )
    .unwrap();

    for channel in 0..n_channels {
        list.add_channel(
            channel,
            channel % 16,
            AnalogReference::Differential,
            ChanspecFlags::empty(),
            Direction::Input,
        )
        .unwrap();
    }
    list
}

fn caps() -> CapabilityDescriptor {
    CapabilityDescriptor::from_subdevice_flags(
        SubdeviceClass::AnalogInput,
        256,
        RangeTable::Uniform(16),
        sdf::SDF_CMD | sdf::SDF_GROUND | sdf::SDF_DIFF | sdf::SDF_DITHER,
    )
}

/// Benchmark list construction including special inserts
fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("chanlist_build");

    for n in SIZES {
        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_list(n)))
        });
    }

    group.finish();
}

/// Benchmark validation
fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("chanlist_validate");
    let caps = caps();

    for n in SIZES {
        let list = build_list(n);
        // Time the accepting path, which visits every entry
        assert_eq!(CapabilityValidator::validate(&list, &caps), Ok(()));

        group.throughput(Throughput::Elements(u64::from(n)));
        group.bench_with_input(BenchmarkId::from_parameter(n), &list, |b, list| {
            b.iter(|| CapabilityValidator::validate(black_box(list), &caps))
        });
    }

    group.finish();
}

/// Benchmark the persisted text form
fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("chanlist_text");

    for n in SIZES {
        let list = build_list(n);
        let text = list.to_text();

        group.bench_with_input(BenchmarkId::new("to_text", n), &list, |b, list| {
            b.iter(|| black_box(list.to_text()))
        });
        group.bench_with_input(BenchmarkId::new("from_text", n), &text, |b, text| {
            b.iter(|| ChannelList::from_text(black_box(text)).unwrap())
        });
    }

    group.finish();
}

/// Benchmark transport exports
fn bench_exports(c: &mut Criterion) {
    let list = build_list(64);

    c.bench_function("export_channel_numbers", |b| {
        b.iter(|| black_box(list.to_channel_numbers()))
    });
    c.bench_function("export_chanspecs", |b| {
        b.iter(|| black_box(list.to_chanspecs()))
    });
    c.bench_function("export_vendor_string", |b| {
        b.iter(|| list.to_vendor_channel_string(black_box("Dev1")).unwrap())
    });
}

criterion_group!(
    benches,
    bench_build,
    bench_validate,
    bench_text,
    bench_exports
);
criterion_main!(benches);
