use crate::{
    entity,
    error::Error,
    factory,
    model::{MethodModel, ParamModel},
    store::{ClassSchema, MethodSchema, PropertySet, RETURN_VALUE, memory::MemoryStore},
    value::{Value, WireType, WireValue},
    wire_enum,
};
use chrono::{DateTime, FixedOffset};

pub(crate) const NAMESPACE: &str = "ROOT\\Test";
pub(crate) const SERVER: &str = "TESTSRV";

pub(crate) const WIDGET_PATH: &str = "\\\\TESTSRV\\ROOT\\Test:Test_Widget.Id=\"w1\"";
pub(crate) const GADGET_PATH: &str = "\\\\TESTSRV\\ROOT\\Test:Test_Gadget.Id=\"g1\"";
pub(crate) const SPROCKET_PATH: &str = "\\\\TESTSRV\\ROOT\\Test:Test_Sprocket.Id=\"s1\"";
pub(crate) const OTHER_PATH: &str = "\\\\TESTSRV\\ROOT\\Test:Test_Other.Id=\"o1\"";

wire_enum! {
    ///
    /// Style
    ///
    pub enum Style: Uint8 {
        Plain = 0,
        Striped = 1,
        Dotted = 2,
    }
}

wire_enum! {
    ///
    /// Mood
    /// Has no variant for discriminant 0.
    ///
    pub enum Mood: Uint8 {
        Calm = 1,
        Loud = 2,
    }
}

entity! {
    ///
    /// Element
    ///
    pub struct Element = "ROOT\\Test:Test_Element" {
        id / set_id: String;
        caption / set_caption: Option<String>;
    }
}

entity! {
    ///
    /// Widget
    ///
    pub struct Widget: Element = "ROOT\\Test:Test_Widget" {
        size / set_size: u64;
        weight: u16 as Uint32;
        style / set_style: Style as Uint16;
        created / set_created: DateTime<FixedOffset>;
        tags / set_tags: Vec<String>;
        owner / set_owner: Option<Gadget>;
        label: DateTime<FixedOffset>;
        foo_bar: u32;
        twin / set_twin: Option<Gadget>;
        rival / set_rival: Option<Gadget>;
        notes / set_notes: Vec<String>;
        mood / set_mood: Mood;
    }
    methods = WIDGET_METHODS;
}

const WIDGET_METHODS: &[MethodModel] = &[
    MethodModel::new(
        "resize",
        &[
            ParamModel::input::<u64>("size"),
            ParamModel::input::<u32>("ghost"),
            ParamModel::output::<u64>("new_size"),
        ],
    ),
    MethodModel::new("explode", &[]).returning::<u32>(RETURN_VALUE),
    MethodModel::new("measure", &[]).returning::<u64>("Length"),
    MethodModel::new("vanish", &[ParamModel::output::<String>("token")]),
    MethodModel::new("polish", &[]),
    MethodModel::new("garble", &[]),
    MethodModel::new("mute", &[]),
];

impl Widget {
    pub(crate) fn resize(&self, size: u64) -> Result<u64, Error> {
        self.proxy
            .invoke("resize", vec![size.into(), Value::Uint(0)])?
            .output("new_size")
    }

    pub(crate) fn explode(&self) -> Result<u32, Error> {
        self.proxy.invoke("explode", Vec::new())?.returned()
    }

    pub(crate) fn measure(&self) -> Result<u64, Error> {
        self.proxy.invoke("measure", Vec::new())?.returned()
    }

    pub(crate) fn garble(&self) -> Result<(), Error> {
        self.proxy.invoke("garble", Vec::new()).map(|_| ())
    }

    pub(crate) fn mute(&self) -> Result<(), Error> {
        self.proxy.invoke("mute", Vec::new()).map(|_| ())
    }
}

factory! {
    ///
    /// WidgetFactory
    ///
    pub struct WidgetFactory for Widget {
        new with_id(id: String);
    }
}

factory! {
    ///
    /// SerialWidgetFactory
    /// Keys on a property the remote class does not have.
    ///
    pub struct SerialWidgetFactory for Widget {
        new with_serial(serial_no: String);
    }
}

entity! {
    ///
    /// Gadget
    ///
    pub struct Gadget: Element = "ROOT\\Test:Test_Gadget" {
        serial: u32;
        widget / set_widget: Option<Widget>;
    }
}

entity! {
    ///
    /// Sprocket
    ///
    pub struct Sprocket: Widget = "ROOT\\Test:Test_Sprocket" {
        teeth: u8;
    }
}

entity! {
    ///
    /// Other
    ///
    pub struct Other = "ROOT\\Test:Test_Other" {
        id: String;
    }
}

entity! {
    ///
    /// Impostor
    /// Claims `Element` as parent over a class that does not derive from it.
    ///
    pub struct Impostor: Element = "ROOT\\Test:Test_Other" {}
}

entity! {
    ///
    /// Phantom
    /// Maps to a class the store does not define.
    ///
    pub struct Phantom = "ROOT\\Test:Test_Phantom" {
        id: String;
    }
}

fn text(s: &str) -> WireValue {
    WireValue::String(s.to_string())
}

/// Store with the test classes defined and one instance of each.
pub(crate) fn store() -> MemoryStore {
    let store = MemoryStore::new(SERVER);

    store.define(
        ClassSchema::new(NAMESPACE, "Test_Element")
            .with_key("Id", WireType::String)
            .with_property("Caption", WireType::String),
    );
    store.define(
        ClassSchema::new(NAMESPACE, "Test_Widget")
            .with_parent("Test_Element")
            .with_property("Size", WireType::Uint64)
            .with_property("Weight", WireType::Uint32)
            .with_property("Style", WireType::Uint16)
            .with_property("Created", WireType::DateTime)
            .with_array("Tags", WireType::String)
            .with_property("Owner", WireType::Reference)
            .with_property("Label", WireType::Sint32)
            .with_property("Twin", WireType::String)
            .with_property("Rival", WireType::Uint32)
            .with_property("Notes", WireType::String)
            .with_property("Mood", WireType::Uint8)
            .with_method(
                MethodSchema::new("Resize")
                    .input("Size", WireType::Uint64)
                    .output(RETURN_VALUE, WireType::Uint32)
                    .output("NewSize", WireType::Uint64),
            )
            .with_method(MethodSchema::new("Explode").output(RETURN_VALUE, WireType::Uint32))
            .with_method(
                MethodSchema::new("Measure")
                    .output(RETURN_VALUE, WireType::Uint32)
                    .output("Length", WireType::Uint64),
            )
            .with_method(
                MethodSchema::new("Vanish")
                    .output(RETURN_VALUE, WireType::Uint32)
                    .output("Token", WireType::String),
            )
            .with_method(MethodSchema::new("Garble").output(RETURN_VALUE, WireType::Uint32))
            .with_method(MethodSchema::new("Mute").output(RETURN_VALUE, WireType::Uint32)),
    );
    store.define(
        ClassSchema::new(NAMESPACE, "Test_Gadget")
            .with_parent("Test_Element")
            .with_property("Serial", WireType::Uint32)
            .with_property("Widget", WireType::Reference),
    );
    store.define(
        ClassSchema::new(NAMESPACE, "Test_Sprocket")
            .with_parent("Test_Widget")
            .with_property("Teeth", WireType::Uint8),
    );
    store.define(ClassSchema::new(NAMESPACE, "Test_Other").with_key("Id", WireType::String));

    store.on_invoke("ROOT\\Test:Test_Widget", "Resize", |props, inputs| {
        let size = inputs.get("Size").cloned().unwrap_or(WireValue::Null);
        props.insert("Size", size.clone());

        Ok(PropertySet::new()
            .with(RETURN_VALUE, WireValue::Uint32(0))
            .with("NewSize", size))
    });
    store.on_invoke("ROOT\\Test:Test_Widget", "Explode", |_, _| {
        Ok(PropertySet::new().with(RETURN_VALUE, WireValue::Uint32(41001)))
    });
    store.on_invoke("ROOT\\Test:Test_Widget", "Garble", |_, _| {
        Ok(PropertySet::new().with(RETURN_VALUE, text("0")))
    });
    store.on_invoke("ROOT\\Test:Test_Widget", "Mute", |_, _| Ok(PropertySet::new()));
    store.on_invoke("ROOT\\Test:Test_Widget", "Measure", |props, _| {
        let size = props.get("Size").cloned().unwrap_or(WireValue::Null);

        Ok(PropertySet::new()
            .with(RETURN_VALUE, WireValue::Uint32(0))
            .with("Length", size))
    });

    let inserted = [
        store.insert(
            "ROOT\\Test:Test_Gadget",
            [
                ("Id", text("g1")),
                ("Serial", WireValue::Uint32(7)),
                ("Widget", WireValue::Reference(WIDGET_PATH.to_string())),
            ],
        ),
        store.insert(
            "ROOT\\Test:Test_Widget",
            [
                ("Id", text("w1")),
                ("Caption", text("first widget")),
                ("Size", WireValue::Uint64(1_073_741_824)),
                ("Weight", WireValue::Uint32(70)),
                ("Style", WireValue::Uint16(2)),
                ("Created", WireValue::DateTime("20240315103045.000000+000".to_string())),
                ("Tags", WireValue::Array(vec![text("a"), text("b")])),
                ("Owner", WireValue::Reference(GADGET_PATH.to_string())),
                ("Label", WireValue::Sint32(5)),
                ("Twin", text("g1")),
                ("Rival", WireValue::Uint32(7)),
                ("Notes", text("scalar")),
            ],
        ),
        store.insert(
            "ROOT\\Test:Test_Sprocket",
            [
                ("Id", text("s1")),
                ("Size", WireValue::Uint64(5)),
                ("Teeth", WireValue::Uint8(12)),
            ],
        ),
        store.insert("ROOT\\Test:Test_Other", [("Id", text("o1"))]),
    ];
    for path in inserted {
        path.expect("fixture record inserts");
    }

    store.associate(WIDGET_PATH, GADGET_PATH);
    store.associate(WIDGET_PATH, SPROCKET_PATH);

    store
}
