use criterion::{black_box, criterion_group, criterion_main, Criterion};
use graphdoc::{
    parse, printer, Config, DocValue, GraphSerializer, Instance, StructConverter, TypeRegistry,
};
use std::any::TypeId;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Default)]
struct Node {
    name: String,
    next: Option<Rc<RefCell<Node>>>,
}

fn node_serializer() -> GraphSerializer {
    let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
    ser.add_converter_for::<Node>(Arc::new(
        StructConverter::new(Node::default)
            .with_cycles()
            .field(
                "name",
                |n: &Node| DocValue::from(n.name.clone()),
                |n, v| Ok(n.name = v.try_str()?.to_string()),
            )
            .field_with(
                "next",
                |n: &Node, ser| match &n.next {
                    Some(next) => ser.serialize_handle(next),
                    None => Ok(DocValue::Null),
                },
                |n, v, ser| {
                    n.next = if v.is_null() {
                        None
                    } else {
                        Some(ser.deserialize_handle(v)?)
                    };
                    Ok(())
                },
            ),
    ));
    ser
}

fn chain(len: usize) -> Rc<RefCell<Node>> {
    let mut head = Rc::new(RefCell::new(Node {
        name: format!("node-{len}"),
        next: None,
    }));
    for i in (0..len.saturating_sub(1)).rev() {
        head = Rc::new(RefCell::new(Node {
            name: format!("node-{i}"),
            next: Some(head),
        }));
    }
    head
}

fn sample_document() -> DocValue {
    let ser = node_serializer();
    ser.serialize(TypeId::of::<Node>(), &Instance::from_handle(chain(64)))
        .assert_clean()
}

fn bench_graph_serialize(c: &mut Criterion) {
    let ser = node_serializer();
    let head = chain(64);

    c.bench_function("serialize_chain_64", |b| {
        b.iter(|| {
            let doc = ser
                .serialize(
                    TypeId::of::<Node>(),
                    &Instance::from_handle(black_box(head.clone())),
                )
                .assert_success();
            black_box(doc)
        })
    });
}

fn bench_graph_deserialize(c: &mut Criterion) {
    let ser = node_serializer();
    let doc = sample_document();

    c.bench_function("deserialize_chain_64", |b| {
        b.iter(|| {
            let node = ser
                .deserialize(black_box(&doc), TypeId::of::<Node>())
                .assert_success();
            black_box(node)
        })
    });
}

fn bench_print_parse(c: &mut Criterion) {
    let doc = sample_document();
    let compact = printer::to_string(&doc);

    c.bench_function("print_compact", |b| {
        b.iter(|| black_box(printer::to_string(black_box(&doc))))
    });
    c.bench_function("print_pretty", |b| {
        b.iter(|| black_box(printer::to_string_pretty(black_box(&doc))))
    });
    c.bench_function("parse", |b| {
        b.iter(|| black_box(parse(black_box(&compact)).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_graph_serialize,
    bench_graph_deserialize,
    bench_print_parse
);
criterion_main!(benches);
