//! # graphdoc
//!
//! An object-graph serialization engine over a JSON-like document model.
//!
//! `graphdoc` converts arbitrary in-memory object graphs — including shared
//! and cyclic ones — to and from a [`DocValue`] document, and renders that
//! document as text. Beyond plain field extraction it handles the three
//! problems that make graph serialization hard:
//!
//! - **Reference cycles.** Shared instances serialize once; every further
//!   occurrence becomes a `{"$ref": id}` marker, and only instances that are
//!   actually referenced back carry an `$id` definition. Deserialization
//!   reconstructs the exact reference topology.
//! - **Base/derived resolution.** When a field's declared type and an
//!   instance's runtime type differ, a `$type` tag records the runtime type;
//!   reading accepts it only when it is assignable to the declared type and
//!   degrades gracefully (with a diagnostic) otherwise.
//! - **Schema evolution.** Types registered with a version string tag their
//!   output with `$version`; reading an older document walks a registered
//!   migration path, transforming step by step up to the current schema.
//!
//! ## Key Features
//!
//! - **Closed document model**: seven kinds behind one enum, exhaustively
//!   matched everywhere — no cast-or-throw
//! - **Explicit registration**: converters, processors and type metadata are
//!   registered up front; no ambient reflection
//! - **Graceful degradation**: data-quality problems become diagnostics on an
//!   [`Outcome`], not aborts; one corrupt sub-object cannot fail a document
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```rust
//! use graphdoc::{
//!     printer, Config, DocValue, GraphSerializer, Instance, StructConverter, TypeRegistry,
//! };
//! use std::any::TypeId;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct User {
//!     name: String,
//!     active: bool,
//! }
//!
//! let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
//! ser.add_converter_for::<User>(Arc::new(
//!     StructConverter::new(User::default)
//!         .field(
//!             "name",
//!             |u: &User| DocValue::from(u.name.clone()),
//!             |u, v| Ok(u.name = v.try_str()?.to_string()),
//!         )
//!         .field(
//!             "active",
//!             |u: &User| DocValue::from(u.active),
//!             |u, v| Ok(u.active = v.try_bool()?),
//!         ),
//! ));
//!
//! let user = Instance::new(User { name: "Alice".into(), active: true });
//! let doc = ser.serialize(TypeId::of::<User>(), &user).assert_clean();
//! assert_eq!(printer::to_string(&doc), r#"{"name":"Alice","active":true}"#);
//!
//! let back = ser.deserialize(&doc, TypeId::of::<User>()).assert_clean();
//! assert_eq!(back.with(|u: &User| u.name.clone()), Some("Alice".to_string()));
//! ```
//!
//! ## Shared and cyclic graphs
//!
//! Objects live in `Rc<RefCell<T>>` cells; the engine tracks them by pointer
//! identity. A mutually-referential pair round-trips to the same topology:
//!
//! ```rust
//! # use graphdoc::{Config, DocValue, GraphSerializer, Instance, StructConverter, TypeRegistry};
//! # use std::any::TypeId;
//! # use std::cell::RefCell;
//! # use std::rc::Rc;
//! # use std::sync::Arc;
//! #[derive(Default)]
//! struct Node {
//!     name: String,
//!     next: Option<Rc<RefCell<Node>>>,
//! }
//!
//! let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
//! ser.add_converter_for::<Node>(Arc::new(
//!     StructConverter::new(Node::default)
//!         .with_cycles()
//!         .field(
//!             "name",
//!             |n: &Node| DocValue::from(n.name.clone()),
//!             |n, v| Ok(n.name = v.try_str()?.to_string()),
//!         )
//!         .field_with(
//!             "next",
//!             |n: &Node, ser| match &n.next {
//!                 Some(next) => ser.serialize_handle(next),
//!                 None => Ok(DocValue::Null),
//!             },
//!             |n, v, ser| {
//!                 n.next = if v.is_null() { None } else { Some(ser.deserialize_handle(v)?) };
//!                 Ok(())
//!             },
//!         ),
//! ));
//!
//! let a = Rc::new(RefCell::new(Node { name: "a".into(), next: None }));
//! let b = Rc::new(RefCell::new(Node { name: "b".into(), next: Some(a.clone()) }));
//! a.borrow_mut().next = Some(b.clone());
//!
//! let doc = ser
//!     .serialize(TypeId::of::<Node>(), &Instance::from_handle(a.clone()))
//!     .assert_clean();
//! let restored = ser.deserialize_handle::<Node>(&doc).unwrap();
//!
//! // a.next.next is a again
//! let next = restored.borrow().next.clone().unwrap();
//! let next_next = next.borrow().next.clone().unwrap();
//! assert!(Rc::ptr_eq(&restored, &next_next));
//! ```
//!
//! ## Document text
//!
//! [`printer::to_string`] / [`printer::to_string_pretty`] render a document;
//! [`parse`] reads it back. Integers and floats stay distinguishable: a float
//! always prints with a decimal point.
//!
//! ```rust
//! use graphdoc::{parse, printer, DocValue};
//!
//! let doc = parse(r#"{"n": 7, "x": 7.0}"#).unwrap();
//! assert!(doc.member("n").is_int());
//! assert!(doc.member("x").is_float());
//! assert_eq!(printer::to_string(&doc), r#"{"n":7,"x":7.0}"#);
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod instance;
pub mod legacy;
pub mod macros;
pub mod map;
pub mod meta;
pub mod parser;
pub mod printer;
pub mod processor;
pub mod registry;
pub mod serializer;
pub mod tracker;
pub mod value;

pub use config::{Config, TypeTagMode};
pub use convert::{Converter, LeafConverter, StructConverter};
pub use error::{Error, Outcome, Result};
pub use instance::Instance;
pub use map::DocMap;
pub use parser::parse;
pub use printer::{to_string, to_string_pretty, to_writer};
pub use processor::ObjectProcessor;
pub use registry::{
    strip_assembly_qualifier, MigrationFn, TypeDesc, TypeInfo, TypeRegistry, VersionInfo,
};
pub use serializer::GraphSerializer;
pub use tracker::{DefinitionWriter, ReferenceTracker};
pub use value::{DocKind, DocValue};
