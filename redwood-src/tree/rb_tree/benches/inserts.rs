use criterion::{
    black_box, criterion_group, criterion_main, Criterion,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rb_tree::RbTree;

fn bench_inserts(c: &mut Criterion) {
    let mut group = c.benchmark_group("rb_tree");
    let n = 10_000_u32;

    let mut rng = ChaCha20Rng::from_seed([
        0x3B, 0x91, 0x04, 0xC7, 0x5E, 0x22, 0xA8, 0xD1, 0x0F, 0x66, 0xB3,
        0x7A, 0x49, 0xE5, 0x10, 0x8C, 0xD4, 0x2B, 0x97, 0x60, 0x1C, 0xF8,
        0x35, 0xAE, 0x72, 0x0B, 0xC9, 0x56, 0xE1, 0x8F, 0x24, 0x6D,
    ]);
    let shuffled = {
        let mut v: Vec<_> = (0..n).collect();
        v.shuffle(&mut rng);
        v
    };

    group.bench_function("insert_ascending", |b| {
        b.iter(|| {
            let mut tree = RbTree::new();
            for i in 0..n {
                tree.insert(black_box(i));
            }
            tree
        })
    });

    group.bench_function("insert_shuffled", |b| {
        b.iter(|| {
            let mut tree = RbTree::new();
            for &i in &shuffled {
                tree.insert(black_box(i));
            }
            tree
        })
    });

    let mut tree: RbTree<u32> = shuffled.iter().copied().collect();
    tree.set_iter_min(Some(n / 4));
    tree.set_iter_max(Some(3 * n / 4));
    group.bench_function("bounded_iter", |b| {
        b.iter(|| black_box(&tree).iter().count())
    });

    group.finish();
}

criterion_group!(benches, bench_inserts);
criterion_main!(benches);
