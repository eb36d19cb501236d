use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use jsonode_core::{JsonNode, JsonType, SerializerOptions, from_slice, to_vec};
use std::hint::black_box;

#[derive(Clone, Default, JsonType)]
struct Record {
	id: u64,
	name: String,
	score: f64,
	tags: Vec<String>,
	parent: Option<u64>,
}

fn records(count: u64) -> Vec<Record> {
	(0..count)
		.map(|id| Record {
			id,
			name: format!("record number {id}"),
			score: id as f64 / 7.0,
			tags: vec!["alpha".into(), "beta".into()],
			parent: id.checked_sub(1),
		})
		.collect()
}

// Serializer: typed values to bytes and back
fn bench_serializer(c: &mut Criterion) {
	let options = SerializerOptions::default();
	let data = records(1000);
	let bytes = to_vec(&data, &options).unwrap();

	let mut group = c.benchmark_group("serializer");
	group.throughput(Throughput::Bytes(bytes.len() as u64));
	group.bench_function("to_vec", |b| b.iter(|| black_box(to_vec(&data, &options).unwrap())));
	group.bench_function("from_slice", |b| {
		b.iter(|| black_box(from_slice::<Vec<Record>>(&bytes, &options).unwrap()))
	});
	group.finish();
}

// Document model: parse, materialize every node, write
fn bench_nodes(c: &mut Criterion) {
	let options = SerializerOptions::default();
	let text = String::from_utf8(to_vec(&records(1000), &options).unwrap()).unwrap();

	let mut group = c.benchmark_group("nodes");
	group.throughput(Throughput::Bytes(text.len() as u64));
	group.bench_function("parse", |b| b.iter(|| black_box(JsonNode::parse_str(&text).unwrap())));
	group.bench_function("parse_and_touch", |b| {
		b.iter(|| {
			let root = JsonNode::parse_str(&text).unwrap().unwrap();
			for item in root.as_array().unwrap().items().unwrap().into_iter().flatten() {
				black_box(item.get("name").unwrap());
			}
		})
	});
	group.bench_function("write", |b| {
		let root = JsonNode::parse_str(&text).unwrap().unwrap();
		root.as_array().unwrap().items().unwrap();
		b.iter(|| black_box(root.to_json_string().unwrap()))
	});
	group.finish();
}

criterion_group!(benches, bench_serializer, bench_nodes);
criterion_main!(benches);
