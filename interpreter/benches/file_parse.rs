use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

use perun_interpreter::command::Vocabulary;
use perun_interpreter::tokens::Tokens;
use perun_interpreter::{tokenize, Context};

const SCRIPT: &str = "
// tidy up a downloads folder
threshold = 100mb;
old = now - 30 days;
total = 0;
files where extension in 'tmp', 'log' and modification < old {
    print name + ' (' + string(size) + ' bytes)';
    total += size;
    delete
}
'*.jpg' order by creation desc limit 20 {
    stack copy to 'thumbnails' as 'img' + string(index)
}
directories where empty {
    if name like 'backup%' {
        print 'keeping ' + this
    } else {
        delete
    }
}
if total > threshold print 'freed ' + string(total / 1mb) + ' mb';
n = 0;
while n < 10 { n++; if n % 3 = 0 continue; print n }
";

fn tokenize_benchmark(c: &mut Criterion) {
    c.bench_function("tokenize sample script", |b| {
        b.iter(|| tokenize(Cursor::new(SCRIPT)).unwrap())
    });
}

fn parse_benchmark(c: &mut Criterion) {
    let tokens = tokenize(Cursor::new(SCRIPT)).unwrap();
    let vocabulary = Vocabulary::standard();
    c.bench_function("parse sample script", |b| {
        b.iter(|| {
            let mut ctx = Context::new("/");
            vocabulary
                .build_block(Tokens::whole(&tokens), &mut ctx)
                .unwrap()
        })
    });
}

criterion_group!(parse_benches, tokenize_benchmark, parse_benchmark);
criterion_main!(parse_benches);
