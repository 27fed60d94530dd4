use graphdoc::{
    parse, printer, Config, Converter, DocValue, Error, GraphSerializer, Instance, LeafConverter,
    ObjectProcessor, StructConverter, TypeDesc, TypeRegistry, TypeTagMode,
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

fn node_converter() -> Arc<dyn Converter> {
    Arc::new(
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
    )
}

fn node_serializer(config: Config) -> GraphSerializer {
    let mut ser = GraphSerializer::new(config, TypeRegistry::new());
    ser.add_converter_for::<Node>(node_converter());
    ser
}

fn node(name: &str) -> Rc<RefCell<Node>> {
    Rc::new(RefCell::new(Node {
        name: name.to_string(),
        next: None,
    }))
}

#[test]
fn acyclic_graph_round_trips() {
    let ser = node_serializer(Config::new());
    let tail = node("tail");
    let head = node("head");
    head.borrow_mut().next = Some(tail);

    let doc = ser
        .serialize(TypeId::of::<Node>(), &Instance::from_handle(head))
        .assert_clean();
    let restored = ser.deserialize_handle::<Node>(&doc).unwrap();

    assert_eq!(restored.borrow().name, "head");
    assert_eq!(restored.borrow().next.as_ref().unwrap().borrow().name, "tail");
}

#[test]
fn unshared_instances_carry_no_id() {
    let ser = node_serializer(Config::new());
    let tail = node("tail");
    let head = node("head");
    head.borrow_mut().next = Some(tail);

    let doc = ser
        .serialize(TypeId::of::<Node>(), &Instance::from_handle(head))
        .assert_clean();
    let text = printer::to_string(&doc);
    assert!(!text.contains("$id"));
    assert!(!text.contains("$ref"));
}

#[test]
fn mutual_pair_serializes_with_one_id_and_one_ref() {
    let ser = node_serializer(Config::new());
    let a = node("a");
    let b = node("b");
    a.borrow_mut().next = Some(b.clone());
    b.borrow_mut().next = Some(a.clone());

    let doc = ser
        .serialize(TypeId::of::<Node>(), &Instance::from_handle(a.clone()))
        .assert_clean();
    let text = printer::to_string(&doc);

    // the first-visited node carries the definition, the back edge the reference
    assert_eq!(text.matches("\"$id\"").count(), 1);
    assert_eq!(text.matches("\"$ref\"").count(), 1);
    assert_eq!(doc.member("$id").as_str(), Some("0"));
    assert_eq!(
        doc.member("next").member("next").member("$ref").as_str(),
        Some("0")
    );

    let restored = ser.deserialize_handle::<Node>(&doc).unwrap();
    let next = restored.borrow().next.clone().unwrap();
    let next_next = next.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&restored, &next_next));
    assert_eq!(next.borrow().name, "b");
}

#[test]
fn self_loop_terminates_and_round_trips() {
    let ser = node_serializer(Config::new());
    let a = node("a");
    a.borrow_mut().next = Some(a.clone());

    let doc = ser
        .serialize(TypeId::of::<Node>(), &Instance::from_handle(a))
        .assert_clean();
    assert_eq!(doc.member("next").member("$ref").as_str(), Some("0"));
    assert_eq!(doc.member("$id").as_str(), Some("0"));

    let restored = ser.deserialize_handle::<Node>(&doc).unwrap();
    let next = restored.borrow().next.clone().unwrap();
    assert!(Rc::ptr_eq(&restored, &next));
}

#[derive(Default)]
struct Pair {
    left: Option<Rc<RefCell<Node>>>,
    right: Option<Rc<RefCell<Node>>>,
}

fn edge_to_doc(
    edge: &Option<Rc<RefCell<Node>>>,
    ser: &GraphSerializer,
) -> graphdoc::Result<DocValue> {
    match edge {
        Some(node) => ser.serialize_handle(node),
        None => Ok(DocValue::Null),
    }
}

fn edge_from_doc(
    value: &DocValue,
    ser: &GraphSerializer,
) -> graphdoc::Result<Option<Rc<RefCell<Node>>>> {
    if value.is_null() {
        Ok(None)
    } else {
        Ok(Some(ser.deserialize_handle(value)?))
    }
}

#[test]
fn diamond_sharing_without_cycle_keeps_identity() {
    let mut ser = node_serializer(Config::new());
    ser.add_converter_for::<Pair>(Arc::new(
        StructConverter::new(Pair::default)
            .with_cycles()
            .field_with(
                "left",
                |p: &Pair, ser| edge_to_doc(&p.left, ser),
                |p, v, ser| {
                    p.left = edge_from_doc(v, ser)?;
                    Ok(())
                },
            )
            .field_with(
                "right",
                |p: &Pair, ser| edge_to_doc(&p.right, ser),
                |p, v, ser| {
                    p.right = edge_from_doc(v, ser)?;
                    Ok(())
                },
            ),
    ));

    let shared = node("shared");
    let pair = Instance::new(Pair {
        left: Some(shared.clone()),
        right: Some(shared),
    });

    let doc = ser.serialize(TypeId::of::<Pair>(), &pair).assert_clean();
    let text = printer::to_string(&doc);
    // one definition on the first occurrence, one reference on the second,
    // and no marker on the pair itself
    assert_eq!(text.matches("\"$id\"").count(), 1);
    assert_eq!(doc.member("left").member("$id").as_str(), Some("1"));
    assert_eq!(doc.member("right").member("$ref").as_str(), Some("1"));
    assert!(!doc.has_key("$id"));

    let restored = ser.deserialize(&doc, TypeId::of::<Pair>()).assert_clean();
    let (left, right) = restored
        .with(|p: &Pair| (p.left.clone().unwrap(), p.right.clone().unwrap()))
        .unwrap();
    assert!(Rc::ptr_eq(&left, &right));
}

#[test]
fn numeric_kinds_survive_engine_and_text() {
    #[derive(Default)]
    struct Numbers {
        count: i64,
        ratio: f64,
    }

    let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
    ser.add_converter_for::<Numbers>(Arc::new(
        StructConverter::new(Numbers::default)
            .field(
                "count",
                |n: &Numbers| DocValue::from(n.count),
                |n, v| Ok(n.count = v.try_i64()?),
            )
            .field(
                "ratio",
                |n: &Numbers| DocValue::from(n.ratio),
                |n, v| Ok(n.ratio = v.try_f64()?),
            ),
    ));

    let doc = ser
        .serialize(
            TypeId::of::<Numbers>(),
            &Instance::new(Numbers { count: 7, ratio: 7.0 }),
        )
        .assert_clean();
    let reparsed = parse(&printer::to_string(&doc)).unwrap();

    assert_eq!(reparsed.member("count"), &DocValue::Int(7));
    assert_eq!(reparsed.member("ratio"), &DocValue::Float(7.0));

    let back = ser.deserialize(&reparsed, TypeId::of::<Numbers>()).assert_clean();
    assert_eq!(back.with(|n: &Numbers| (n.count, n.ratio)), Some((7, 7.0)));
}

#[derive(Default, Debug, PartialEq, Clone)]
struct Score(i64);

fn score_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.add(TypeDesc::of::<Score>("demo.Score").versioned("1"));
    registry
}

#[test]
fn version_tag_wraps_non_object_payloads() {
    let mut ser = GraphSerializer::new(Config::new(), score_registry());
    ser.add_converter_for::<Score>(Arc::new(LeafConverter::new(
        Score::default,
        |s: &Score| DocValue::from(s.0),
        |v| Ok(Score(v.try_i64()?)),
    )));

    let doc = ser
        .serialize(TypeId::of::<Score>(), &Instance::new(Score(99)))
        .assert_clean();
    assert_eq!(doc.member("$content").as_i64(), Some(99));
    assert_eq!(doc.member("$version").as_str(), Some("1"));

    let back = ser.deserialize(&doc, TypeId::of::<Score>()).assert_clean();
    assert_eq!(back.with(|s: &Score| s.clone()), Some(Score(99)));
}

// --- inheritance ---------------------------------------------------------

trait Shape {}

#[derive(Default)]
struct Circle {
    radius: f64,
}
impl Shape for Circle {}

#[derive(Default)]
struct Square {
    side: f64,
}
impl Shape for Square {}

#[derive(Default)]
struct Canvas {
    shape: Instance,
}

fn shape_serializer(config: Config) -> GraphSerializer {
    let mut registry = TypeRegistry::new();
    registry.add(TypeDesc::of::<dyn Shape>("demo.Shape"));
    registry.add(TypeDesc::of::<Circle>("demo.Circle").base::<dyn Shape>());
    registry.add(TypeDesc::of::<Square>("demo.Square").base::<dyn Shape>());

    let mut ser = GraphSerializer::new(config, registry);
    ser.add_converter_for::<Circle>(Arc::new(StructConverter::new(Circle::default).field(
        "radius",
        |c: &Circle| DocValue::from(c.radius),
        |c, v| Ok(c.radius = v.try_f64()?),
    )));
    ser.add_converter_for::<Square>(Arc::new(StructConverter::new(Square::default).field(
        "side",
        |s: &Square| DocValue::from(s.side),
        |s, v| Ok(s.side = v.try_f64()?),
    )));
    ser.add_converter_for::<Canvas>(Arc::new(StructConverter::new(Canvas::default).field_with(
        "shape",
        |c: &Canvas, ser| ser.serialize_instance(TypeId::of::<dyn Shape>(), &c.shape),
        |c, v, ser| {
            c.shape = ser.deserialize_instance(v, TypeId::of::<dyn Shape>(), None)?;
            Ok(())
        },
    )));
    ser
}

#[test]
fn runtime_type_is_tagged_and_resolved_when_needed() {
    let ser = shape_serializer(Config::new());
    let canvas = Instance::new(Canvas {
        shape: Instance::new(Circle { radius: 2.0 }),
    });

    let doc = ser.serialize(TypeId::of::<Canvas>(), &canvas).assert_clean();
    assert_eq!(doc.member("shape").member("$type").as_str(), Some("demo.Circle"));

    let restored = ser.deserialize(&doc, TypeId::of::<Canvas>()).assert_clean();
    let shape = restored.with(|c: &Canvas| c.shape.clone()).unwrap();
    let radius = shape.with(|c: &Circle| c.radius);
    assert_eq!(radius, Some(2.0));
}

#[test]
fn tag_modes_always_and_never() {
    let ser = shape_serializer(Config::new().with_type_tag_mode(TypeTagMode::Always));
    let circle = Instance::new(Circle { radius: 1.0 });
    let doc = ser.serialize(TypeId::of::<Circle>(), &circle).assert_clean();
    assert_eq!(doc.member("$type").as_str(), Some("demo.Circle"));

    let ser = shape_serializer(Config::new().with_type_tag_mode(TypeTagMode::Never));
    let canvas = Instance::new(Canvas {
        shape: Instance::new(Circle { radius: 1.0 }),
    });
    let doc = ser.serialize(TypeId::of::<Canvas>(), &canvas).assert_clean();
    assert!(!doc.member("shape").has_key("$type"));
}

#[test]
fn assembly_qualified_type_names_are_accepted() {
    let ser = shape_serializer(Config::new());
    let doc = parse(
        r#"{"radius": 3.0, "$type": "demo.Circle, Demo.Assembly, Version=1.0.0.0"}"#,
    )
    .unwrap();
    let shape = ser
        .deserialize(&doc, TypeId::of::<dyn Shape>())
        .assert_clean();
    assert_eq!(shape.with(|c: &Circle| c.radius), Some(3.0));
}

#[test]
fn unresolvable_type_name_degrades_to_declared() {
    let ser = shape_serializer(Config::new());
    let doc = parse(r#"{"radius": 3.0, "$type": "demo.Vanished"}"#).unwrap();
    let outcome = ser.deserialize(&doc, TypeId::of::<Circle>());
    assert!(outcome.succeeded());
    assert!(outcome
        .notes()
        .iter()
        .any(|n| n.contains("unresolvable type name")));
    let circle = outcome.assert_success();
    assert_eq!(circle.with(|c: &Circle| c.radius), Some(3.0));
}

#[test]
fn non_assignable_type_tag_degrades_to_declared() {
    let ser = shape_serializer(Config::new());
    // Square is registered, but it is not assignable to Circle
    let doc = parse(r#"{"radius": 3.0, "$type": "demo.Square"}"#).unwrap();
    let outcome = ser.deserialize(&doc, TypeId::of::<Circle>());
    assert!(outcome.succeeded());
    assert!(outcome.notes().iter().any(|n| n.contains("not assignable")));
    let circle = outcome.assert_success();
    assert!(circle.handle::<Circle>().is_some());
}

// --- versioning ----------------------------------------------------------

#[derive(Default)]
struct PersonV1 {
    name: String,
}

#[derive(Default)]
struct PersonV2 {
    first: String,
    last: String,
}

#[derive(Default, Debug, PartialEq, Clone)]
struct Person {
    first: String,
    last: String,
    active: bool,
}

fn person_serializer() -> GraphSerializer {
    let mut registry = TypeRegistry::new();
    registry.add(TypeDesc::of::<PersonV1>("demo.PersonV1").versioned("1"));
    registry.add(
        TypeDesc::of::<PersonV2>("demo.PersonV2")
            .versioned("2")
            .ancestor::<PersonV1>()
            .migrates_with(|old| {
                let v1 = old
                    .handle::<PersonV1>()
                    .ok_or_else(|| Error::custom("expected a PersonV1 instance"))?;
                let name = v1.borrow().name.clone();
                let (first, last) = name.split_once(' ').unwrap_or((name.as_str(), ""));
                Ok(Instance::new(PersonV2 {
                    first: first.to_string(),
                    last: last.to_string(),
                }))
            }),
    );
    registry.add(
        TypeDesc::of::<Person>("demo.Person")
            .versioned("3")
            .ancestor::<PersonV2>()
            .migrates_with(|old| {
                let v2 = old
                    .handle::<PersonV2>()
                    .ok_or_else(|| Error::custom("expected a PersonV2 instance"))?;
                let v2 = v2.borrow();
                Ok(Instance::new(Person {
                    first: v2.first.clone(),
                    last: v2.last.clone(),
                    active: true,
                }))
            }),
    );

    let mut ser = GraphSerializer::new(Config::new(), registry);
    ser.add_converter_for::<PersonV1>(Arc::new(StructConverter::new(PersonV1::default).field(
        "name",
        |p: &PersonV1| DocValue::from(p.name.clone()),
        |p, v| Ok(p.name = v.try_str()?.to_string()),
    )));
    ser.add_converter_for::<PersonV2>(Arc::new(
        StructConverter::new(PersonV2::default)
            .field(
                "first",
                |p: &PersonV2| DocValue::from(p.first.clone()),
                |p, v| Ok(p.first = v.try_str()?.to_string()),
            )
            .field(
                "last",
                |p: &PersonV2| DocValue::from(p.last.clone()),
                |p, v| Ok(p.last = v.try_str()?.to_string()),
            ),
    ));
    ser.add_converter_for::<Person>(Arc::new(
        StructConverter::new(Person::default)
            .field(
                "first",
                |p: &Person| DocValue::from(p.first.clone()),
                |p, v| Ok(p.first = v.try_str()?.to_string()),
            )
            .field(
                "last",
                |p: &Person| DocValue::from(p.last.clone()),
                |p, v| Ok(p.last = v.try_str()?.to_string()),
            )
            .field(
                "active",
                |p: &Person| DocValue::from(p.active),
                |p, v| Ok(p.active = v.try_bool()?),
            ),
    ));
    ser
}

#[test]
fn current_schema_is_version_tagged() {
    let ser = person_serializer();
    let person = Instance::new(Person {
        first: "Ada".into(),
        last: "Lovelace".into(),
        active: true,
    });
    let doc = ser.serialize(TypeId::of::<Person>(), &person).assert_clean();
    assert_eq!(doc.member("$version").as_str(), Some("3"));
}

#[test]
fn two_step_migration_matches_directly_built_instance() {
    let ser = person_serializer();
    let old = parse(r#"{"$version": "1", "name": "Ada Lovelace"}"#).unwrap();

    let migrated = ser.deserialize(&old, TypeId::of::<Person>()).assert_clean();
    let expected = Person {
        first: "Ada".into(),
        last: "Lovelace".into(),
        active: true,
    };
    assert_eq!(migrated.with(|p: &Person| p.clone()), Some(expected));
}

#[test]
fn unknown_stored_version_degrades_to_declared_type() {
    let ser = person_serializer();
    let doc = parse(r#"{"$version": "0.9", "first": "Ada", "last": "L", "active": true}"#).unwrap();

    let outcome = ser.deserialize(&doc, TypeId::of::<Person>());
    assert!(outcome.succeeded());
    assert!(outcome
        .notes()
        .iter()
        .any(|n| n.contains("no migration path")));
    let person = outcome.assert_success();
    assert_eq!(person.with(|p: &Person| p.first.clone()), Some("Ada".into()));
}

// --- config --------------------------------------------------------------

#[derive(Default)]
struct User {
    name: String,
    secret: String,
}

fn user_serializer(config: Config) -> GraphSerializer {
    let mut ser = GraphSerializer::new(config, TypeRegistry::new());
    ser.add_converter_for::<User>(Arc::new(
        StructConverter::new(User::default)
            .field(
                "name",
                |u: &User| DocValue::from(u.name.clone()),
                |u, v| Ok(u.name = v.try_str()?.to_string()),
            )
            .field(
                "secret",
                |u: &User| DocValue::from(u.secret.clone()),
                |u, v| Ok(u.secret = v.try_str()?.to_string()),
            ),
    ));
    ser
}

#[test]
fn case_insensitive_config_folds_member_lookup() {
    let doc = parse(r#"{"Name": "Alice"}"#).unwrap();

    let sensitive = user_serializer(Config::new());
    let user = sensitive.deserialize(&doc, TypeId::of::<User>()).assert_clean();
    assert_eq!(user.with(|u: &User| u.name.clone()), Some(String::new()));

    let insensitive = user_serializer(Config::new().with_case_insensitive_keys(true));
    let user = insensitive
        .deserialize(&doc, TypeId::of::<User>())
        .assert_clean();
    assert_eq!(user.with(|u: &User| u.name.clone()), Some("Alice".into()));
}

#[test]
fn hidden_members_are_neither_written_nor_read() {
    let ser = user_serializer(Config::new().hide_member("secret"));
    let user = Instance::new(User {
        name: "Alice".into(),
        secret: "hunter2".into(),
    });

    let doc = ser.serialize(TypeId::of::<User>(), &user).assert_clean();
    assert!(!doc.has_key("secret"));

    let doc = parse(r#"{"name": "Bo", "secret": "leak"}"#).unwrap();
    let restored = ser.deserialize(&doc, TypeId::of::<User>()).assert_clean();
    assert_eq!(restored.with(|u: &User| u.secret.clone()), Some(String::new()));
}

// --- processors ----------------------------------------------------------

struct Recorder {
    label: &'static str,
    log: Rc<RefCell<Vec<String>>>,
}

impl ObjectProcessor for Recorder {
    fn name(&self) -> &str {
        self.label
    }

    fn before_serialize(&self, _ty: TypeId, _instance: &Instance) -> graphdoc::Result<()> {
        self.log.borrow_mut().push(format!("{}:before", self.label));
        Ok(())
    }

    fn after_serialize(
        &self,
        _ty: TypeId,
        _instance: &Instance,
        _data: &mut DocValue,
    ) -> graphdoc::Result<()> {
        self.log.borrow_mut().push(format!("{}:after", self.label));
        Ok(())
    }
}

#[test]
fn after_hooks_run_in_reverse_registration_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut ser = user_serializer(Config::new());
    ser.add_processor(Arc::new(Recorder {
        label: "first",
        log: log.clone(),
    }));
    ser.add_processor(Arc::new(Recorder {
        label: "second",
        log: log.clone(),
    }));

    let user = Instance::new(User::default());
    let _ = ser.serialize(TypeId::of::<User>(), &user).assert_clean();

    assert_eq!(
        *log.borrow(),
        vec!["first:before", "second:before", "second:after", "first:after"]
    );
}

#[test]
fn registry_processor_override_replaces_the_list() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = TypeRegistry::new();
    registry.add(TypeDesc::of::<User>("demo.User").with_processor(Arc::new(Recorder {
        label: "forced",
        log: log.clone(),
    })));

    let mut ser = GraphSerializer::new(Config::new(), registry);
    ser.add_converter_for::<User>(Arc::new(StructConverter::new(User::default).field(
        "name",
        |u: &User| DocValue::from(u.name.clone()),
        |u, v| Ok(u.name = v.try_str()?.to_string()),
    )));
    ser.add_processor(Arc::new(Recorder {
        label: "ignored",
        log: log.clone(),
    }));

    let user = Instance::new(User::default());
    let _ = ser.serialize(TypeId::of::<User>(), &user).assert_clean();

    assert_eq!(*log.borrow(), vec!["forced:before", "forced:after"]);
}

struct FaultyHook;

impl ObjectProcessor for FaultyHook {
    fn name(&self) -> &str {
        "faulty"
    }

    fn before_serialize(&self, _ty: TypeId, _instance: &Instance) -> graphdoc::Result<()> {
        Err(Error::custom("hook exploded"))
    }
}

#[test]
fn hook_failures_become_notes_not_errors() {
    let mut ser = user_serializer(Config::new());
    ser.add_processor(Arc::new(FaultyHook));

    let user = Instance::new(User {
        name: "Alice".into(),
        secret: String::new(),
    });
    let outcome = ser.serialize(TypeId::of::<User>(), &user);
    assert!(outcome.succeeded());
    assert!(outcome
        .notes()
        .iter()
        .any(|n| n.contains("faulty before-serialize hook failed")));
}

// --- error containment ---------------------------------------------------

#[derive(Default)]
struct Fragile;

struct ExplodingConverter;

impl Converter for ExplodingConverter {
    fn can_convert(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<Fragile>()
    }

    fn to_document(
        &self,
        _ser: &GraphSerializer,
        _instance: &Instance,
        _ty: TypeId,
    ) -> graphdoc::Result<DocValue> {
        Ok(DocValue::new_object())
    }

    fn create_instance(&self, _data: &DocValue, _ty: TypeId) -> graphdoc::Result<Instance> {
        Err(Error::custom("constructor exploded"))
    }

    fn populate(
        &self,
        _ser: &GraphSerializer,
        _data: &DocValue,
        _instance: &Instance,
        _ty: TypeId,
    ) -> graphdoc::Result<()> {
        Ok(())
    }
}

#[derive(Default)]
struct Holder {
    label: String,
    child: Option<Rc<RefCell<Fragile>>>,
}

#[test]
fn construction_failure_is_contained_to_the_sub_object() {
    let mut ser = GraphSerializer::new(Config::new(), TypeRegistry::new());
    ser.add_converter_for::<Fragile>(Arc::new(ExplodingConverter));
    ser.add_converter_for::<Holder>(Arc::new(
        StructConverter::new(Holder::default)
            .field(
                "label",
                |h: &Holder| DocValue::from(h.label.clone()),
                |h, v| Ok(h.label = v.try_str()?.to_string()),
            )
            .field_with(
                "child",
                |h: &Holder, ser| match &h.child {
                    Some(child) => ser.serialize_handle(child),
                    None => Ok(DocValue::Null),
                },
                |h, v, ser| {
                    let instance = ser.deserialize_instance(v, TypeId::of::<Fragile>(), None)?;
                    h.child = instance.handle::<Fragile>();
                    Ok(())
                },
            ),
    ));

    let doc = parse(r#"{"label": "kept", "child": {}}"#).unwrap();
    let outcome = ser.deserialize(&doc, TypeId::of::<Holder>());

    // the rest of the document still deserializes
    assert!(outcome.succeeded());
    assert!(outcome
        .notes()
        .iter()
        .any(|n| n.contains("instance construction failed")));
    let holder = outcome.assert_success();
    assert_eq!(holder.with(|h: &Holder| h.label.clone()), Some("kept".into()));
    assert_eq!(holder.with(|h: &Holder| h.child.is_none()), Some(true));
}

#[test]
fn unresolved_reference_is_fatal() {
    let ser = node_serializer(Config::new());
    let doc = parse(r#"{"$ref": "5"}"#).unwrap();
    let result = ser.deserialize(&doc, TypeId::of::<Node>()).into_result();
    assert!(matches!(result, Err(Error::UnresolvedReference(5))));
}

#[test]
fn deserialize_into_reuses_the_given_instance() {
    let ser = user_serializer(Config::new());
    let existing = Instance::new(User {
        name: "old".into(),
        secret: "keep".into(),
    });

    let doc = parse(r#"{"name": "new"}"#).unwrap();
    let result = ser
        .deserialize_into(&doc, TypeId::of::<User>(), existing.clone())
        .assert_clean();

    assert_eq!(result.address(), existing.address());
    assert_eq!(result.with(|u: &User| u.name.clone()), Some("new".into()));
    // members absent from the document are left untouched
    assert_eq!(result.with(|u: &User| u.secret.clone()), Some("keep".into()));
}
