use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mp3meta::{Id3v1Tag, TAG_LEN};

fn sample_buf() -> [u8; TAG_LEN] {
    let mut tag = Id3v1Tag::new();
    tag.set_title("Benchmark Title");
    tag.set_artist("Benchmark Artist");
    tag.set_album("Benchmark Album");
    tag.set_year(2020).unwrap();
    tag.set_comment("a fairly typical comment");
    tag.set_track(7);
    tag.set_genre(17);
    tag.render()
}

fn bench_parse(c: &mut Criterion) {
    let buf = sample_buf();
    c.bench_function("parse", |b| {
        b.iter(|| Id3v1Tag::parse(black_box(&buf)).unwrap())
    });
}

fn bench_render(c: &mut Criterion) {
    let tag = Id3v1Tag::parse(&sample_buf()).unwrap();
    c.bench_function("render", |b| b.iter(|| black_box(&tag).render()));
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
