use canopy::config::{RouteTable, TableFormat};
use canopy::request::RouteRequest;
use canopy::router::RouterTree;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use std::hint::black_box;

fn example_table() -> &'static str {
    r#"
cors:
  Access-Control-Allow-Origin: "*"
routes:
  - pattern: /
    handler: root_handler
    methods: [GET]
  - pattern: /zoo/health
    handler: health_check
    methods: [HEAD]
routers:
  - name: zoo
    path_prefix: /zoo
    routes:
      - pattern: /animals
        handler: get_animals
        methods: [GET]
      - pattern: /animals
        handler: create_animal
        methods: [POST]
      - pattern: /animals/{id:int}
        handler: get_animal
        methods: [GET, PUT, PATCH, DELETE]
      - pattern: /animals/{id:int}/toys/{toy_id}
        handler: animal_toy
        methods: [GET]
      - pattern: /{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}
        handler: habitat_section
        methods: [GET]
  - name: inventory
    host: .example.com
    routes:
      - pattern: /inventory/{warehouse_id}/feeds/{feed_id}/items/{item_id}/batches/{batch_id}
        handler: post_item_batch
        methods: [POST]
      - pattern: /inventory/{code:[A-Z]{3}}/{report}
        handler: report
        methods: [GET]
  - name: files
    path_prefix: /files
    routes:
      - pattern: /{rest*}
        handler: files
        methods: [GET]
  - name: complex
    routes:
      - pattern: /complex/{a}/{b}/{c}/{d}/{e}/{f}/{g}/{h}/{i}
        handler: complex_many_params
        methods: [GET]
"#
}

fn build_tree(yaml: &str) -> RouterTree<String> {
    RouteTable::parse(yaml, TableFormat::Yaml)
        .expect("failed to parse route table")
        .build()
        .expect("failed to build route tree")
}

fn bench_route_throughput(c: &mut Criterion) {
    let tree = build_tree(example_table());
    let requests = [
        RouteRequest::new(Method::GET, "/zoo/animals/123"),
        RouteRequest::new(Method::GET, "/zoo/animals/123/toys/456"),
        RouteRequest::new(Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        RouteRequest::new(Method::POST, "/inventory/1/feeds/2/items/3/batches/4")
            .with_host("shop.example.com"),
        RouteRequest::new(Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
    ];
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for req in requests.iter() {
                let res = tree.resolve(req);
                black_box(&res);
            }
        })
    });
}

fn bench_fallbacks(c: &mut Criterion) {
    let tree = build_tree(example_table());
    let requests = [
        RouteRequest::new(Method::GET, "/files/a/b/c/d.txt"),
        RouteRequest::new(Method::GET, "/inventory/ABC/report.pdf").with_host("x.example.com"),
        RouteRequest::new(Method::GET, "/does/not/exist"),
    ];
    c.bench_function("route_fallbacks", |b| {
        b.iter(|| {
            for req in requests.iter() {
                black_box(tree.resolve(req).is_some());
            }
        })
    });
}

fn bench_negotiation(c: &mut Criterion) {
    let tree = build_tree(example_table());
    let req = RouteRequest::new(Method::OPTIONS, "/zoo/animals/9").with_header(
        http::header::ORIGIN,
        http::HeaderValue::from_static("https://app.example.com"),
    );
    c.bench_function("options_negotiation", |b| {
        b.iter(|| {
            if let Some(resolved) = tree.resolve(&req) {
                black_box(tree.handle_headers(&resolved, &req));
            }
        })
    });
}

criterion_group!(benches, bench_route_throughput, bench_fallbacks, bench_negotiation);
criterion_main!(benches);
