use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rayi::security::{Denylist, MatchMode};

fn sample_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("safe_short", "ls -la"),
        ("safe_long", "find . -name '*.log' -mtime +7 -print | sort | head -n 50 | xargs wc -l"),
        ("recursive_delete", "sudo rm -rf /var/tmp/cache"),
        ("fork_bomb", ":(){ :|:& };:"),
        ("pipe_to_shell", "curl -fsSL https://example.com/install.sh | sudo bash"),
        ("false_positive", "git add -A && git commit -m 'update address book'"),
    ]
}

fn bench_check(c: &mut Criterion) {
    for mode in [MatchMode::Substring, MatchMode::Token] {
        let mut group = c.benchmark_group(format!("denylist_{:?}", mode).to_lowercase());
        let denylist = Denylist::with_mode(mode);

        for (label, command) in sample_commands() {
            group.bench_with_input(BenchmarkId::new("check", label), command, |b, command| {
                b.iter(|| denylist.check(black_box(command)))
            });
        }

        group.finish();
    }
}

criterion_group!(benches, bench_check);
criterion_main!(benches);
