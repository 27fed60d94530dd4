//! Serialize a mutually-referential pair and reconstruct its topology.
//!
//! Run with: `cargo run --example cycles`

use graphdoc::{
    printer, Config, DocValue, GraphSerializer, Instance, StructConverter, TypeRegistry,
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

fn main() {
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

    // A.next = B; B.next = A
    let a = Rc::new(RefCell::new(Node {
        name: "a".into(),
        next: None,
    }));
    let b = Rc::new(RefCell::new(Node {
        name: "b".into(),
        next: Some(a.clone()),
    }));
    a.borrow_mut().next = Some(b);

    let doc = ser
        .serialize(TypeId::of::<Node>(), &Instance::from_handle(a.clone()))
        .assert_clean();

    println!("serialized pair:");
    println!("{}", printer::to_string_pretty(&doc));

    let restored = ser.deserialize_handle::<Node>(&doc).unwrap();
    let next = restored.borrow().next.clone().unwrap();
    let next_next = next.borrow().next.clone().unwrap();

    println!();
    println!("restored.name            = {}", restored.borrow().name);
    println!("restored.next.name       = {}", next.borrow().name);
    println!(
        "restored.next.next is restored: {}",
        Rc::ptr_eq(&restored, &next_next)
    );
}
