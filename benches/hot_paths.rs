use criterion::{black_box, criterion_group, criterion_main, Criterion};

use gas_dash::braille::ColorCanvas;
use gas_dash::chart::ranking::Ranking;
use gas_dash::data::{CountryShape, CumulativeTable, ProductionTable};
use gas_dash::map::color::production_colormap;
use gas_dash::map::{Choropleth, Viewport};

/// Synthetic world: a grid of square regions with ragged polygon edges
fn synthetic_map(regions: usize) -> Choropleth {
    let mut csv = String::from("Country,Cumulative production\n");
    for i in 0..regions / 2 {
        csv.push_str(&format!("Region {i},{}\n", (i * 13 % 1500) as f64));
    }
    let table = CumulativeTable::from_reader(csv.as_bytes()).unwrap();

    let shapes: Vec<CountryShape> = (0..regions)
        .map(|i| {
            let lon0 = -170.0 + (i % 24) as f64 * 14.0;
            let lat0 = -70.0 + (i / 24) as f64 * 16.0;
            let mut ring = Vec::with_capacity(64);
            for step in 0..64 {
                let t = step as f64 / 64.0 * std::f64::consts::TAU;
                let wobble = 1.0 + 0.2 * (t * 5.0).sin();
                ring.push((lon0 + 6.0 * wobble * t.cos(), lat0 + 6.0 * wobble * t.sin()));
            }
            CountryShape {
                name: format!("Region {i}"),
                rings: vec![ring],
            }
        })
        .collect();

    Choropleth::build(shapes, &table)
}

fn synthetic_wide_table(countries: usize) -> ProductionTable {
    let names: Vec<String> = (0..countries).map(|i| format!("Country {i}")).collect();
    let mut csv = format!("Year,{}\n", names.join(","));
    for year in 1900..=2022 {
        csv.push_str(&year.to_string());
        for i in 0..countries {
            csv.push_str(&format!(",{}", (year - 1900 + i as i32) as f64 * 0.1));
        }
        csv.push('\n');
    }
    ProductionTable::from_reader(csv.as_bytes()).unwrap()
}

fn bench_colormap(c: &mut Criterion) {
    let cm = production_colormap();
    c.bench_function("colormap_lookup", |b| {
        b.iter(|| {
            let mut acc = 0usize;
            for i in 0..2000 {
                acc += cm.bucket(black_box(i as f64 * 0.8));
            }
            acc
        })
    });
}

fn bench_projection(c: &mut Criterion) {
    let vp = Viewport::world(360, 160);
    c.bench_function("project_world_grid", |b| {
        b.iter(|| {
            let mut acc = 0i64;
            for lon in -180..180 {
                for lat in -80..80 {
                    let (x, y) = vp.project(black_box(lon as f64), black_box(lat as f64));
                    acc += (x + y) as i64;
                }
            }
            acc
        })
    });
}

fn bench_choropleth_render(c: &mut Criterion) {
    let map = synthetic_map(200);
    let viewport = Viewport::world(360, 160);
    c.bench_function("choropleth_render_200_regions", |b| {
        b.iter(|| {
            let mut fill = ColorCanvas::new(180, 40);
            let mut borders = ColorCanvas::new(180, 40);
            map.render(&viewport, &mut fill, &mut borders, &[]);
            fill.cells().count() + borders.cells().count()
        })
    });
}

fn bench_ranking(c: &mut Criterion) {
    let table = synthetic_wide_table(100);
    let selected: Vec<String> = (0..100).map(|i| format!("Country {i}")).collect();
    c.bench_function("ranking_build_100_countries", |b| {
        b.iter(|| Ranking::build(black_box(&table), black_box(&selected), 2000))
    });
}

criterion_group!(
    benches,
    bench_colormap,
    bench_projection,
    bench_choropleth_render,
    bench_ranking
);
criterion_main!(benches);
