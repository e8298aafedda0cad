use super::*;
use crate::{error::ErrorKind, value::WireType};

const fn prop(name: &'static str, wire: WireType) -> PropertyModel {
    PropertyModel {
        name,
        remote: None,
        cast: None,
        ty: LogicalType::Scalar(wire),
        access: Access::ReadOnly,
    }
}

static ROOT: EntityModel = EntityModel {
    path: "tests::Root",
    class: "root\\test:Root",
    parent: None,
    properties: &[prop("name", WireType::String), prop("size", WireType::Uint32)],
    methods: &[],
};

static CHILD: EntityModel = EntityModel {
    path: "tests::Child",
    class: "root\\test:Child",
    parent: Some(EntityRef(|| &ROOT)),
    properties: &[prop("size", WireType::Uint64), prop("label", WireType::String)],
    methods: &[],
};

static LOOP_A: EntityModel = EntityModel {
    path: "tests::LoopA",
    class: "root\\test:LoopA",
    parent: Some(EntityRef(|| &LOOP_B)),
    properties: &[],
    methods: &[],
};

static LOOP_B: EntityModel = EntityModel {
    path: "tests::LoopB",
    class: "root\\test:LoopB",
    parent: Some(EntityRef(|| &LOOP_A)),
    properties: &[],
    methods: &[],
};

#[test]
fn class_paths_split_at_the_last_colon() {
    let path = ClassPath::parse("\\\\.\\ROOT\\Microsoft\\Windows\\Storage:MSFT_Disk")
        .expect("combined class path");

    assert_eq!(path.namespace, "\\\\.\\ROOT\\Microsoft\\Windows\\Storage");
    assert_eq!(path.class_name, "MSFT_Disk");
    assert_eq!(ClassPath::parse("MSFT_Disk"), None);
    assert_eq!(ClassPath::parse("root:"), None);
}

#[test]
fn effective_members_flatten_with_child_overrides() {
    let props: Vec<_> = CHILD
        .effective_properties()
        .into_iter()
        .map(|p| (p.name, p.ty.natural_wire()))
        .collect();

    assert_eq!(
        props,
        [
            ("name", WireType::String),
            ("size", WireType::Uint64),
            ("label", WireType::String),
        ]
    );
}

#[test]
fn locally_built_models_flatten_their_lineage() {
    static PROPS: &[PropertyModel] = &[prop("name", WireType::Char16)];

    let local = EntityModel {
        path: "tests::Local",
        class: "root\\test:Local",
        parent: Some(EntityRef(|| &CHILD)),
        properties: PROPS,
        methods: &[],
    };

    let props: Vec<_> = local.effective_properties().iter().map(|p| p.name).collect();
    assert_eq!(props, ["name", "size", "label"]);
    assert_eq!(
        local.effective_properties()[0].ty.natural_wire(),
        WireType::Char16
    );
}

#[test]
fn extends_follows_parent_links() {
    assert!(CHILD.extends(&ROOT));
    assert!(CHILD.extends(&CHILD));
    assert!(!ROOT.extends(&CHILD));
}

#[test]
fn valid_declarations_pass() {
    validate(&ROOT).expect("root is valid");
    validate(&CHILD).expect("child is valid");
}

#[test]
fn cyclic_parents_are_rejected() {
    let err = validate(&LOOP_A).expect_err("cycle must be rejected");

    assert_eq!(err.kind, ErrorKind::Declaration);
    assert!(err.message.contains("cyclic"));
}

#[test]
fn duplicate_members_are_rejected() {
    static DUP: EntityModel = EntityModel {
        path: "tests::Dup",
        class: "root\\test:Dup",
        parent: None,
        properties: &[prop("size", WireType::Uint32), prop("size", WireType::Uint64)],
        methods: &[],
    };

    let err = validate(&DUP).expect_err("duplicate property");
    assert!(err.message.contains("'size' more than once"));
}

#[test]
fn duplicate_remote_parameter_names_are_rejected() {
    static PARAMS: &[ParamModel] = &[
        ParamModel {
            name: "is_read_only",
            remote: None,
            cast: None,
            ty: LogicalType::Scalar(WireType::Boolean),
            direction: Direction::In,
        },
        ParamModel {
            name: "read_only",
            remote: Some("ISREADONLY"),
            cast: None,
            ty: LogicalType::Scalar(WireType::Boolean),
            direction: Direction::In,
        },
    ];
    static BAD: EntityModel = EntityModel {
        path: "tests::Bad",
        class: "root\\test:Bad",
        parent: None,
        properties: &[],
        methods: &[MethodModel {
            name: "set_attributes",
            remote: None,
            params: PARAMS,
            returns: None,
        }],
    };

    let err = validate(&BAD).expect_err("remote names collide case-insensitively");
    assert_eq!(err.origin, ErrorOrigin::Declaration);
}

#[test]
fn malformed_class_is_rejected() {
    static NO_NS: EntityModel = EntityModel {
        path: "tests::NoNs",
        class: "Orphan",
        parent: None,
        properties: &[],
        methods: &[],
    };

    assert!(validate(&NO_NS).is_err());
}

#[test]
fn factory_keys_must_be_inputs() {
    static FACTORY: FactoryModel = FactoryModel {
        path: "tests::ChildFactory",
        entity: EntityRef(|| &CHILD),
        constructors: &[ConstructorModel {
            name: "with_label",
            keys: &[ParamModel {
                name: "label",
                remote: None,
                cast: None,
                ty: LogicalType::Scalar(WireType::String),
                direction: Direction::Out,
            }],
        }],
    };

    let err = validate_factory(&FACTORY).expect_err("out key");
    assert!(err.message.contains("must be an input"));
}
